//! Stream cursor persistence.
//!
//! The cursor is the `time_us` of the last event the intake handled, stored
//! as a decimal string under a single key with a short TTL. A stale cursor
//! simply expires, and the next intake starts from the live stream.

use super::Store;
use crate::{Error, Result};

const CURSOR_KEY: &str = "cursor";

impl Store {
    /// Persist the stream cursor, replacing any previous value.
    pub async fn save_cursor(&self, cursor: i64) -> Result<()> {
        self.backend
            .set_ex(
                CURSOR_KEY,
                cursor.to_string().as_bytes(),
                self.settings.cursor_ttl,
            )
            .await
    }

    /// Read the persisted cursor. `Ok(None)` if absent or expired.
    pub async fn read_cursor(&self) -> Result<Option<i64>> {
        let Some(bytes) = self.backend.get(CURSOR_KEY).await? else {
            return Ok(None);
        };

        let value = String::from_utf8_lossy(&bytes);
        value
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|e| Error::InvalidCursor {
                value: value.into_owned(),
                reason: e.to_string(),
            })
    }
}
