//! Account and card records
//!
//! Both are owned by the account/card service; this core only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A card belongs to exactly one account. The token is an irreversible
/// digest of the card data, never the raw number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub account_id: Uuid,
    pub card_token: String,
    pub last_four_digits: String,
    pub created_at: DateTime<Utc>,
}
