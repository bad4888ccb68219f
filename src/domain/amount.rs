//! Amount type
//!
//! Domain primitive for transaction amounts in minor currency units.
//! Amounts are validated at construction time, so an `AmountCents` is
//! always a positive integer. Direction (credit or debit) is implied by the
//! transaction type, never by the sign.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest accepted amount (10 billion in major units).
const MAX_AMOUNT_CENTS: i64 = 1_000_000_000_000;

/// A validated, strictly positive amount in cents.
///
/// # Example
/// ```
/// use payment_gateway::domain::AmountCents;
///
/// let amount = AmountCents::new(10_000).unwrap();
/// assert_eq!(amount.value(), 10_000);
/// assert!(AmountCents::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct AmountCents(i64);

/// Errors that can occur when creating an AmountCents
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(i64),

    #[error("Amount exceeds maximum allowed value ({MAX_AMOUNT_CENTS} cents)")]
    Overflow,
}

impl AmountCents {
    /// Create a new amount with validation.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    /// - `AmountError::Overflow` if value exceeds the accepted maximum
    pub fn new(value: i64) -> Result<Self, AmountError> {
        if value <= 0 {
            return Err(AmountError::NotPositive(value));
        }
        if value > MAX_AMOUNT_CENTS {
            return Err(AmountError::Overflow);
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for AmountCents {
    type Error = AmountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AmountCents> for i64 {
    fn from(amount: AmountCents) -> Self {
        amount.0
    }
}

impl fmt::Display for AmountCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_amount_accepted() {
        let amount = AmountCents::new(1).unwrap();
        assert_eq!(amount.value(), 1);
        assert_eq!(amount.to_string(), "1");
    }

    #[test]
    fn test_zero_and_negative_rejected() {
        assert_eq!(AmountCents::new(0), Err(AmountError::NotPositive(0)));
        assert_eq!(AmountCents::new(-500), Err(AmountError::NotPositive(-500)));
    }

    #[test]
    fn test_overflow_rejected() {
        assert!(AmountCents::new(MAX_AMOUNT_CENTS).is_ok());
        assert_eq!(AmountCents::new(MAX_AMOUNT_CENTS + 1), Err(AmountError::Overflow));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: AmountCents = serde_json::from_str("2500").unwrap();
        assert_eq!(ok.value(), 2500);

        let err = serde_json::from_str::<AmountCents>("-1");
        assert!(err.is_err());
    }
}
