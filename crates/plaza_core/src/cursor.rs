/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Opaque pagination cursors.
//!
//! A cursor is the `(created_at, id)` position of the last row a client has
//! seen. On the wire it is `base64url(<RFC 3339 UTC, 9 fractional digits>:<id>)`
//! without padding. Decoding is strict: only the exact byte sequence that
//! [`Cursor::encode`] produces is accepted, so a tampered or hand-written
//! token fails instead of silently falling back to the first page.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as B64, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor {
    pub time: DateTime<Utc>,
    pub id: u64,
}

impl Cursor {
    pub fn new(time: DateTime<Utc>, id: u64) -> Self {
        Self { time, id }
    }

    pub fn encode(&self) -> String {
        B64.encode(self.raw())
    }

    fn raw(&self) -> String {
        format!("{}:{}", self.time.to_rfc3339_opts(SecondsFormat::Nanos, true), self.id)
    }

    pub fn decode(token: &str) -> CoreResult<Self> {
        let bytes = B64
            .decode(token.as_bytes())
            .map_err(|e| CoreError::MalformedCursor(format!("bad encoding: {e}")))?;
        let raw = String::from_utf8(bytes)
            .map_err(|_| CoreError::MalformedCursor("not utf-8".to_string()))?;
        // The timestamp itself contains ':' so the id is everything after the last one.
        let (ts, id) = raw
            .rsplit_once(':')
            .ok_or_else(|| CoreError::MalformedCursor("missing separator".to_string()))?;
        let time = DateTime::parse_from_rfc3339(ts)
            .map_err(|e| CoreError::MalformedCursor(format!("bad timestamp: {e}")))?
            .with_timezone(&Utc);
        if time.timestamp_nanos_opt().is_none() {
            return Err(CoreError::MalformedCursor("timestamp out of range".to_string()));
        }
        let id = id
            .parse::<u64>()
            .map_err(|e| CoreError::MalformedCursor(format!("bad id: {e}")))?;
        let cursor = Cursor { time, id };
        if cursor.raw() != raw {
            return Err(CoreError::MalformedCursor("non-canonical cursor".to_string()));
        }
        Ok(cursor)
    }
}

/// Token for an optional boundary; `None` encodes as the empty string.
pub fn encode_cursor(cursor: Option<&Cursor>) -> String {
    cursor.map(Cursor::encode).unwrap_or_default()
}

/// Empty token means "first page"; anything else must be a valid cursor.
pub fn decode_cursor(token: &str) -> CoreResult<Option<Cursor>> {
    if token.is_empty() {
        return Ok(None);
    }
    Cursor::decode(token).map(Some)
}
