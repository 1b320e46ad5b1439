/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::{
    Comment, Conversation, Message, Post, ReactionState, ReactionTarget, Tenant, TenantMembership, User,
};
use crate::pagination::{Keyset, Page};

#[derive(Clone)]
pub struct SocialDb {
    path: PathBuf,
    busy_timeout: Duration,
}

/// Outcome of a DM find-or-create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmResolution {
    pub conversation_id: u64,
    /// This call inserted the conversation row.
    pub created: bool,
    /// The insert hit the pair-key unique index and the existing row was
    /// returned. The find and insert share one write lock, so this stays false
    /// unless that locking is weakened; the index remains the backstop.
    pub recovered_conflict: bool,
}

impl SocialDb {
    pub fn open(db_path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let db = Self {
            path: db_path.as_ref().to_path_buf(),
            busy_timeout,
        };
        let conn = db.conn()?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            CREATE TABLE IF NOT EXISTS tenants (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              slug TEXT NOT NULL UNIQUE,
              created_at_ns INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tenant_domains (
              domain TEXT PRIMARY KEY,
              tenant_id INTEGER NOT NULL REFERENCES tenants(id)
            );
            CREATE TABLE IF NOT EXISTS users (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              auth_sub TEXT NOT NULL UNIQUE,
              display_name TEXT NOT NULL,
              created_at_ns INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tenant_memberships (
              tenant_id INTEGER NOT NULL REFERENCES tenants(id),
              user_id INTEGER NOT NULL REFERENCES users(id),
              role TEXT NOT NULL,
              created_at_ns INTEGER NOT NULL,
              PRIMARY KEY (tenant_id, user_id)
            );
            CREATE TABLE IF NOT EXISTS posts (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              tenant_id INTEGER NOT NULL REFERENCES tenants(id),
              author_user_id INTEGER NOT NULL REFERENCES users(id),
              body TEXT NOT NULL,
              created_at_ns INTEGER NOT NULL,
              deleted_at_ns INTEGER NULL
            );
            CREATE INDEX IF NOT EXISTS idx_posts_feed ON posts(tenant_id, created_at_ns, id);
            CREATE TABLE IF NOT EXISTS comments (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              tenant_id INTEGER NOT NULL REFERENCES tenants(id),
              post_id INTEGER NOT NULL REFERENCES posts(id),
              author_user_id INTEGER NOT NULL REFERENCES users(id),
              body TEXT NOT NULL,
              created_at_ns INTEGER NOT NULL,
              deleted_at_ns INTEGER NULL
            );
            CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id, created_at_ns, id);
            CREATE TABLE IF NOT EXISTS reactions (
              tenant_id INTEGER NOT NULL,
              user_id INTEGER NOT NULL,
              target_type TEXT NOT NULL,
              target_id INTEGER NOT NULL,
              type TEXT NOT NULL,
              created_at_ns INTEGER NOT NULL,
              PRIMARY KEY (tenant_id, target_type, target_id, user_id, type)
            );
            CREATE TABLE IF NOT EXISTS conversations (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              tenant_id INTEGER NOT NULL REFERENCES tenants(id),
              kind TEXT NOT NULL,
              dm_pair_key TEXT NULL,
              created_at_ns INTEGER NOT NULL
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_conversations_dm_pair ON conversations(tenant_id, dm_pair_key);
            CREATE INDEX IF NOT EXISTS idx_conversations_created ON conversations(tenant_id, created_at_ns, id);
            CREATE TABLE IF NOT EXISTS conversation_members (
              conversation_id INTEGER NOT NULL REFERENCES conversations(id),
              user_id INTEGER NOT NULL REFERENCES users(id),
              joined_at_ns INTEGER NOT NULL,
              PRIMARY KEY (conversation_id, user_id)
            );
            CREATE INDEX IF NOT EXISTS idx_conversation_members_user ON conversation_members(user_id);
            CREATE TABLE IF NOT EXISTS messages (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              tenant_id INTEGER NOT NULL REFERENCES tenants(id),
              conversation_id INTEGER NOT NULL REFERENCES conversations(id),
              sender_user_id INTEGER NOT NULL REFERENCES users(id),
              body TEXT NOT NULL,
              created_at_ns INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages(conversation_id, created_at_ns, id);
            "#,
        )
        .with_context(|| format!("init schema: {}", db.path.display()))?;
        Ok(db)
    }

    fn conn(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path).with_context(|| format!("open db: {}", self.path.display()))?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }

    pub fn health_check(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    // --- tenancy ---

    /// Registers a tenant (and optionally one of its domains). Idempotent.
    pub fn ensure_tenant(&self, slug: &str, domain: Option<&str>) -> Result<Tenant> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO tenants(slug, created_at_ns) VALUES (?1, ?2) ON CONFLICT(slug) DO NOTHING",
            params![slug, now_ns()],
        )?;
        let id: i64 = tx.query_row("SELECT id FROM tenants WHERE slug=?1", params![slug], |r| r.get(0))?;
        if let Some(domain) = domain.map(str::trim).filter(|d| !d.is_empty()) {
            tx.execute(
                r#"
                INSERT INTO tenant_domains(domain, tenant_id) VALUES (?1, ?2)
                ON CONFLICT(domain) DO UPDATE SET tenant_id=excluded.tenant_id
                "#,
                params![domain.to_ascii_lowercase(), id],
            )?;
        }
        tx.commit()?;
        Ok(Tenant {
            id: id as u64,
            slug: slug.to_string(),
        })
    }

    pub fn tenant_by_slug(&self, slug: &str) -> Result<Option<Tenant>> {
        let conn = self.conn()?;
        let tenant = conn
            .query_row("SELECT id, slug FROM tenants WHERE slug=?1", params![slug], |r| {
                Ok(Tenant {
                    id: r.get::<_, i64>(0)? as u64,
                    slug: r.get(1)?,
                })
            })
            .optional()?;
        Ok(tenant)
    }

    pub fn tenant_by_domain(&self, domain: &str) -> Result<Option<Tenant>> {
        let conn = self.conn()?;
        let tenant = conn
            .query_row(
                r#"
                SELECT t.id, t.slug FROM tenant_domains d
                JOIN tenants t ON t.id = d.tenant_id
                WHERE d.domain=?1
                "#,
                params![domain.to_ascii_lowercase()],
                |r| {
                    Ok(Tenant {
                        id: r.get::<_, i64>(0)? as u64,
                        slug: r.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(tenant)
    }

    /// Finds the user for an identity-provider subject, creating it on first sight.
    pub fn ensure_user(&self, auth_sub: &str, display_name: &str) -> Result<u64> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO users(auth_sub, display_name, created_at_ns) VALUES (?1, ?2, ?3) ON CONFLICT(auth_sub) DO NOTHING",
            params![auth_sub, display_name, now_ns()],
        )?;
        let id: i64 = tx.query_row("SELECT id FROM users WHERE auth_sub=?1", params![auth_sub], |r| r.get(0))?;
        tx.commit()?;
        Ok(id as u64)
    }

    pub fn ensure_membership(&self, tenant_id: u64, user_id: u64, role: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO tenant_memberships(tenant_id, user_id, role, created_at_ns)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(tenant_id, user_id) DO NOTHING
            "#,
            params![tenant_id as i64, user_id as i64, role, now_ns()],
        )?;
        Ok(())
    }

    pub fn is_tenant_member(&self, tenant_id: u64, user_id: u64) -> Result<bool> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM tenant_memberships WHERE tenant_id=?1 AND user_id=?2",
                params![tenant_id as i64, user_id as i64],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn get_user(&self, user_id: u64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let display_name: Option<String> = conn
            .query_row(
                "SELECT display_name FROM users WHERE id=?1",
                params![user_id as i64],
                |r| r.get(0),
            )
            .optional()?;
        let Some(display_name) = display_name else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            r#"
            SELECT m.tenant_id, t.slug, m.role
            FROM tenant_memberships m
            JOIN tenants t ON t.id = m.tenant_id
            WHERE m.user_id=?1
            ORDER BY m.tenant_id ASC
            "#,
        )?;
        let memberships = stmt
            .query_map(params![user_id as i64], |r| {
                Ok(TenantMembership {
                    tenant_id: r.get::<_, i64>(0)? as u64,
                    tenant_slug: r.get(1)?,
                    role: r.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(User {
            id: user_id,
            display_name,
            memberships,
        }))
    }

    // --- timeline ---

    pub fn create_post_at(&self, tenant_id: u64, author_user_id: u64, body: &str, at_ns: i64) -> Result<Post> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO posts(tenant_id, author_user_id, body, created_at_ns) VALUES (?1, ?2, ?3, ?4)",
            params![tenant_id as i64, author_user_id as i64, body, at_ns],
        )?;
        Ok(Post {
            id: conn.last_insert_rowid() as u64,
            author_user_id,
            body: body.to_string(),
            created_at: ns_to_time(at_ns),
            liked_by_me: false,
            like_count: 0,
            comment_count: 0,
        })
    }

    pub fn post_exists(&self, tenant_id: u64, post_id: u64) -> Result<bool> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM posts WHERE id=?1 AND tenant_id=?2 AND deleted_at_ns IS NULL",
                params![post_id as i64, tenant_id as i64],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Tenant feed as seen by `viewer_user_id`, newest first, soft-deleted posts hidden.
    pub fn list_feed(&self, tenant_id: u64, viewer_user_id: u64, page: &Keyset) -> Result<Page<Post>> {
        let conn = self.conn()?;
        let mut sql = String::from(
            r#"
            SELECT p.id, p.author_user_id, p.body, p.created_at_ns,
              (SELECT COUNT(*) FROM reactions r
                 WHERE r.tenant_id = p.tenant_id AND r.target_type = 'post' AND r.target_id = p.id AND r.type = 'like'),
              (SELECT COUNT(*) FROM comments c
                 WHERE c.post_id = p.id AND c.deleted_at_ns IS NULL),
              EXISTS(SELECT 1 FROM reactions r
                 WHERE r.tenant_id = p.tenant_id AND r.target_type = 'post' AND r.target_id = p.id
                   AND r.type = 'like' AND r.user_id = ?)
            FROM posts p
            WHERE p.tenant_id = ? AND p.deleted_at_ns IS NULL
            "#,
        );
        let mut params_vec: Vec<rusqlite::types::Value> = vec![(viewer_user_id as i64).into(), (tenant_id as i64).into()];
        push_keyset(&mut sql, &mut params_vec, page, "p.created_at_ns", "p.id");

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(rusqlite::params_from_iter(params_vec), |r| {
                Ok(Post {
                    id: r.get::<_, i64>(0)? as u64,
                    author_user_id: r.get::<_, i64>(1)? as u64,
                    body: r.get(2)?,
                    created_at: ns_to_time(r.get(3)?),
                    like_count: r.get::<_, i64>(4)? as u32,
                    comment_count: r.get::<_, i64>(5)? as u32,
                    liked_by_me: r.get::<_, i64>(6)? != 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(page.finish(items, |p| (p.created_at, p.id)))
    }

    pub fn create_comment_at(
        &self,
        tenant_id: u64,
        post_id: u64,
        author_user_id: u64,
        body: &str,
        at_ns: i64,
    ) -> Result<Comment> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO comments(tenant_id, post_id, author_user_id, body, created_at_ns) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![tenant_id as i64, post_id as i64, author_user_id as i64, body, at_ns],
        )?;
        Ok(Comment {
            id: conn.last_insert_rowid() as u64,
            post_id,
            author_user_id,
            body: body.to_string(),
            created_at: ns_to_time(at_ns),
        })
    }

    pub fn list_comments(&self, tenant_id: u64, post_id: u64, page: &Keyset) -> Result<Page<Comment>> {
        let conn = self.conn()?;
        let mut sql = String::from(
            r#"
            SELECT id, author_user_id, body, created_at_ns
            FROM comments
            WHERE tenant_id = ? AND post_id = ? AND deleted_at_ns IS NULL
            "#,
        );
        let mut params_vec: Vec<rusqlite::types::Value> = vec![(tenant_id as i64).into(), (post_id as i64).into()];
        push_keyset(&mut sql, &mut params_vec, page, "created_at_ns", "id");

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(rusqlite::params_from_iter(params_vec), |r| {
                Ok(Comment {
                    id: r.get::<_, i64>(0)? as u64,
                    post_id,
                    author_user_id: r.get::<_, i64>(1)? as u64,
                    body: r.get(2)?,
                    created_at: ns_to_time(r.get(3)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(page.finish(items, |c| (c.created_at, c.id)))
    }

    // --- reactions ---

    /// Flips the user's reaction on a target. `None` when the target does not
    /// exist in the tenant.
    pub fn toggle_reaction(
        &self,
        tenant_id: u64,
        user_id: u64,
        target: ReactionTarget,
        target_id: u64,
        reaction_type: &str,
    ) -> Result<Option<ReactionState>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists_sql = match target {
            ReactionTarget::Post => "SELECT 1 FROM posts WHERE id=?1 AND tenant_id=?2 AND deleted_at_ns IS NULL",
            ReactionTarget::Comment => "SELECT 1 FROM comments WHERE id=?1 AND tenant_id=?2 AND deleted_at_ns IS NULL",
        };
        let exists = tx
            .query_row(exists_sql, params![target_id as i64, tenant_id as i64], |_| Ok(()))
            .optional()?;
        if exists.is_none() {
            return Ok(None);
        }

        let removed = tx.execute(
            r#"
            DELETE FROM reactions
            WHERE tenant_id=?1 AND target_type=?2 AND target_id=?3 AND user_id=?4 AND type=?5
            "#,
            params![tenant_id as i64, target.as_str(), target_id as i64, user_id as i64, reaction_type],
        )?;
        let active = if removed == 0 {
            tx.execute(
                r#"
                INSERT INTO reactions(tenant_id, user_id, target_type, target_id, type, created_at_ns)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![tenant_id as i64, user_id as i64, target.as_str(), target_id as i64, reaction_type, now_ns()],
            )?;
            true
        } else {
            false
        };

        let total: i64 = tx.query_row(
            "SELECT COUNT(*) FROM reactions WHERE tenant_id=?1 AND target_type=?2 AND target_id=?3 AND type=?4",
            params![tenant_id as i64, target.as_str(), target_id as i64, reaction_type],
            |r| r.get(0),
        )?;
        tx.commit()?;
        Ok(Some(ReactionState {
            active,
            total: total as u32,
        }))
    }

    // --- direct messages ---

    /// Returns the DM conversation for the unordered pair, creating it when absent.
    ///
    /// The lookup and the insert share one IMMEDIATE transaction, and the
    /// `(tenant_id, dm_pair_key)` unique index backs the invariant regardless of
    /// isolation: an insert that hits the index re-reads and returns the winner.
    /// Under the IMMEDIATE lock that re-read path is a safety net only.
    pub fn get_or_create_dm_at(&self, tenant_id: u64, user_a: u64, user_b: u64, at_ns: i64) -> Result<DmResolution> {
        let pair_key = dm_pair_key(user_a, user_b);
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let find = |tx: &rusqlite::Transaction<'_>| -> rusqlite::Result<Option<i64>> {
            tx.query_row(
                "SELECT id FROM conversations WHERE tenant_id=?1 AND kind='dm' AND dm_pair_key=?2",
                params![tenant_id as i64, pair_key],
                |r| r.get(0),
            )
            .optional()
        };

        if let Some(id) = find(&tx)? {
            tx.commit()?;
            return Ok(DmResolution {
                conversation_id: id as u64,
                created: false,
                recovered_conflict: false,
            });
        }

        let inserted = tx.execute(
            r#"
            INSERT INTO conversations(tenant_id, kind, dm_pair_key, created_at_ns)
            VALUES (?1, 'dm', ?2, ?3)
            ON CONFLICT(tenant_id, dm_pair_key) DO NOTHING
            "#,
            params![tenant_id as i64, pair_key, at_ns],
        )?;
        if inserted == 0 {
            let id = find(&tx)?.context("dm pair conflict but no conversation row")?;
            tx.commit()?;
            return Ok(DmResolution {
                conversation_id: id as u64,
                created: false,
                recovered_conflict: true,
            });
        }

        let id = tx.last_insert_rowid();
        for user_id in [user_a, user_b] {
            tx.execute(
                "INSERT OR IGNORE INTO conversation_members(conversation_id, user_id, joined_at_ns) VALUES (?1, ?2, ?3)",
                params![id, user_id as i64, at_ns],
            )?;
        }
        tx.commit()?;
        Ok(DmResolution {
            conversation_id: id as u64,
            created: true,
            recovered_conflict: false,
        })
    }

    pub fn list_conversations(&self, tenant_id: u64, user_id: u64, page: &Keyset) -> Result<Page<Conversation>> {
        let conn = self.conn()?;
        let mut sql = String::from(
            r#"
            SELECT c.id, c.created_at_ns
            FROM conversations c
            JOIN conversation_members m ON m.conversation_id = c.id
            WHERE c.tenant_id = ? AND m.user_id = ?
            "#,
        );
        let mut params_vec: Vec<rusqlite::types::Value> = vec![(tenant_id as i64).into(), (user_id as i64).into()];
        push_keyset(&mut sql, &mut params_vec, page, "c.created_at_ns", "c.id");

        let mut stmt = conn.prepare(&sql)?;
        let heads = stmt
            .query_map(rusqlite::params_from_iter(params_vec), |r| {
                Ok((r.get::<_, i64>(0)?, r.get::<_, i64>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut members_stmt =
            conn.prepare("SELECT user_id FROM conversation_members WHERE conversation_id=?1 ORDER BY user_id ASC")?;
        let mut items = Vec::with_capacity(heads.len());
        for (id, created_at_ns) in heads {
            let member_user_ids = members_stmt
                .query_map(params![id], |r| Ok(r.get::<_, i64>(0)? as u64))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            items.push(Conversation {
                id: id as u64,
                created_at: ns_to_time(created_at_ns),
                member_user_ids,
            });
        }
        Ok(page.finish(items, |c| (c.created_at, c.id)))
    }

    pub fn is_conversation_member(&self, tenant_id: u64, conversation_id: u64, user_id: u64) -> Result<bool> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                r#"
                SELECT 1 FROM conversation_members m
                JOIN conversations c ON c.id = m.conversation_id
                WHERE c.tenant_id=?1 AND m.conversation_id=?2 AND m.user_id=?3
                "#,
                params![tenant_id as i64, conversation_id as i64, user_id as i64],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn list_messages(&self, tenant_id: u64, conversation_id: u64, page: &Keyset) -> Result<Page<Message>> {
        let conn = self.conn()?;
        let mut sql = String::from(
            r#"
            SELECT id, sender_user_id, body, created_at_ns
            FROM messages
            WHERE tenant_id = ? AND conversation_id = ?
            "#,
        );
        let mut params_vec: Vec<rusqlite::types::Value> =
            vec![(tenant_id as i64).into(), (conversation_id as i64).into()];
        push_keyset(&mut sql, &mut params_vec, page, "created_at_ns", "id");

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(rusqlite::params_from_iter(params_vec), |r| {
                Ok(Message {
                    id: r.get::<_, i64>(0)? as u64,
                    conversation_id,
                    sender_user_id: r.get::<_, i64>(1)? as u64,
                    body: r.get(2)?,
                    created_at: ns_to_time(r.get(3)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(page.finish(items, |m| (m.created_at, m.id)))
    }

    pub fn create_message_at(
        &self,
        tenant_id: u64,
        conversation_id: u64,
        sender_user_id: u64,
        body: &str,
        at_ns: i64,
    ) -> Result<Message> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO messages(tenant_id, conversation_id, sender_user_id, body, created_at_ns) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![tenant_id as i64, conversation_id as i64, sender_user_id as i64, body, at_ns],
        )?;
        Ok(Message {
            id: conn.last_insert_rowid() as u64,
            conversation_id,
            sender_user_id,
            body: body.to_string(),
            created_at: ns_to_time(at_ns),
        })
    }
}

/// Appends the keyset boundary, ordering and limit to a query whose WHERE
/// clause is already open.
fn push_keyset(
    sql: &mut String,
    params_vec: &mut Vec<rusqlite::types::Value>,
    page: &Keyset,
    time_col: &str,
    id_col: &str,
) {
    if let Some((filter, values)) = page.sql_filter(time_col, id_col) {
        sql.push_str(" AND ");
        sql.push_str(&filter);
        params_vec.extend(values.into_iter().map(rusqlite::types::Value::from));
    }
    sql.push_str(" ORDER BY ");
    sql.push_str(&page.sql_order(time_col, id_col));
    sql.push_str(" LIMIT ?");
    params_vec.push((page.limit() as i64).into());
}

/// Order-independent key for a two-party conversation.
pub fn dm_pair_key(a: u64, b: u64) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{lo}:{hi}")
}

pub fn now_ns() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as i64
}

fn ns_to_time(ns: i64) -> DateTime<Utc> {
    Utc.timestamp_nanos(ns)
}
