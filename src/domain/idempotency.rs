//! Idempotency key and deduplication window
//!
//! The key is an audit fingerprint of a submission. It is not enforced by
//! storage: duplicate detection matches on (account, type, amount) within
//! the window, independent of the key string.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{AmountCents, TransactionType};

/// Submissions matching an earlier one within this window are suppressed.
pub const DEDUP_WINDOW_SECONDS: i64 = 180;

/// Timestamp layout of the key prefix, millisecond precision.
const KEY_TIME_FORMAT: &str = "%Y-%m-%d-%H:%M:%S%.3f";

/// Derived fingerprint `"{timestamp}:{account_id}:{TYPE}:{amount}"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyKey {
    value: String,
    issued_at: DateTime<Utc>,
}

impl IdempotencyKey {
    pub fn generate(
        now: DateTime<Utc>,
        account_id: Uuid,
        transaction_type: TransactionType,
        amount: AmountCents,
    ) -> Self {
        let issued_at = now.trunc_subsecs(3);
        let value = format!(
            "{}:{}:{}:{}",
            issued_at.format(KEY_TIME_FORMAT),
            account_id,
            transaction_type,
            amount
        );
        Self { value, issued_at }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Millisecond-truncated instant encoded in the key
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Whether a transaction created at `created_at` still suppresses a
/// matching submission arriving at `now`. The boundary is inclusive.
pub fn within_dedup_window(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - created_at <= Duration::seconds(DEDUP_WINDOW_SECONDS)
}
