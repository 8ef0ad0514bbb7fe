use time::{
    format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime,
    PrimitiveDateTime,
};

use crate::error::StoreError;
use crate::mining::NEVER_MINED;

/// Per-user mining state.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    pub balance: f64,                 // $CHILL, never negative
    pub last_mine_at: OffsetDateTime, // UTC, NEVER_MINED until the first mine
}

impl Default for UserAccount {
    fn default() -> Self {
        Self {
            balance: 0.0,
            last_mine_at: NEVER_MINED,
        }
    }
}

/// Raw document as kept in the store: `balance` and `last_mine` as a string.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDocument {
    pub balance: f64,
    pub last_mine: String,
}

impl TryFrom<&UserAccount> for UserDocument {
    type Error = StoreError;

    fn try_from(acc: &UserAccount) -> Result<Self, Self::Error> {
        Ok(Self {
            balance: acc.balance,
            last_mine: format_timestamp(acc.last_mine_at)?,
        })
    }
}

impl UserDocument {
    pub fn into_account(self, user_id: &str) -> Result<UserAccount, StoreError> {
        let malformed = |reason: String| StoreError::MalformedRecord {
            user_id: user_id.to_string(),
            reason,
        };

        if !self.balance.is_finite() || self.balance < 0.0 {
            return Err(malformed(format!("balance {}", self.balance)));
        }
        let last_mine_at = parse_timestamp(&self.last_mine)
            .map_err(|e| malformed(format!("last_mine {:?}: {}", self.last_mine, e)))?;

        Ok(UserAccount {
            balance: self.balance,
            last_mine_at,
        })
    }
}

/// RFC 3339 in UTC, e.g. `2025-03-14T15:09:26Z`.
pub fn format_timestamp(at: OffsetDateTime) -> Result<String, StoreError> {
    at.to_offset(time::UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|e| StoreError::Unavailable(format!("format timestamp {}: {}", at, e)))
}

/// Accepts RFC 3339 and offset-less ISO 8601 (`2024-05-01T12:34:56.123456`).
/// Offset-less values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
    match OffsetDateTime::parse(raw, &Rfc3339) {
        Ok(at) => Ok(at.to_offset(time::UtcOffset::UTC)),
        Err(rfc_err) => PrimitiveDateTime::parse(
            raw,
            format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
            ),
        )
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|_| rfc_err),
    }
}
