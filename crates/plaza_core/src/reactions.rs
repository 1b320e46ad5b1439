/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use tracing::debug;

use crate::context::CoreContext;
use crate::error::{CoreError, CoreResult};
use crate::model::{ReactionState, ReactionTarget, Scope};

pub const DEFAULT_REACTION: &str = "like";

#[derive(Clone)]
pub struct ReactionService {
    ctx: CoreContext,
}

impl ReactionService {
    pub fn new(ctx: CoreContext) -> Self {
        Self { ctx }
    }

    /// Adds the caller's reaction if absent, removes it otherwise.
    pub async fn toggle_reaction(
        &self,
        scope: Scope,
        target: ReactionTarget,
        target_id: u64,
        reaction_type: &str,
    ) -> CoreResult<ReactionState> {
        if target_id == 0 {
            return Err(CoreError::InvalidArgument("target_id is required".to_string()));
        }
        let reaction_type = match reaction_type.trim() {
            "" => DEFAULT_REACTION.to_string(),
            t => t.to_string(),
        };
        let state = self
            .ctx
            .store("toggle_reaction", move |db| {
                db.toggle_reaction(scope.tenant_id, scope.user_id, target, target_id, &reaction_type)
            })
            .await?
            .ok_or_else(|| CoreError::NotFound(target.as_str().to_string()))?;
        debug!(
            tenant_id = scope.tenant_id,
            target = target.as_str(),
            target_id,
            active = state.active,
            "reaction toggled"
        );
        Ok(state)
    }
}
