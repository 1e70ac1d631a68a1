//! Record types owned by the two stores
//!
//! `UserRecord` lives in the secondary (read-only) store, `Product` in the
//! primary store. The two never reference each other.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Identifier of a stored record, always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Validate a raw identifier
    ///
    /// # Errors
    /// - `Error::InvalidArgument` if `id` is zero or negative
    pub fn new(id: i64) -> Result<Self> {
        if id <= 0 {
            return Err(Error::InvalidArgument(format!(
                "Record id must be greater than 0, got {}",
                id
            )));
        }
        Ok(Self(id))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Largest magnitude a price may have, in cents (`NUMERIC(12, 2)`)
pub const MAX_PRICE_CENTS: i64 = 999_999_999_999;

/// Currency amount held as minor units (two fraction digits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(i64);

impl Price {
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Price {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidArgument(format!("Invalid price '{}'", s));

        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        // cents / 100 round-trips through the shortest f64 representation
        serializer.serialize_f64(self.0 as f64 / 100.0)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PriceVisitor;

        impl de::Visitor<'_> for PriceVisitor {
            type Value = Price;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal amount with at most two fraction digits")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Price, E> {
                v.checked_mul(100)
                    .map(Price)
                    .ok_or_else(|| E::custom("price out of range"))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Price, E> {
                let v = i64::try_from(v).map_err(|_| E::custom("price out of range"))?;
                self.visit_i64(v)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Price, E> {
                if !v.is_finite() {
                    return Err(E::custom("price must be finite"));
                }
                v.to_string().parse().map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Price, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(PriceVisitor)
    }
}

/// User reference record from the secondary store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: i64,
    pub user_name: String,
    pub age: i32,
}

/// Product record from the primary store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub product_name: String,
    pub category: String,
    pub price: Price,
    pub stock: i32,
    pub create_time: DateTime<Utc>,
}

/// Creation timestamp for a new record, at microsecond precision
///
/// Rounded up, never down, so the result is not earlier than the call.
pub fn creation_time() -> DateTime<Utc> {
    let now = Utc::now();
    let truncated = now.trunc_subsecs(6);
    if truncated < now {
        truncated + Duration::microseconds(1)
    } else {
        truncated
    }
}

/// Product draft submitted for insertion
///
/// Client-supplied `id` and `createTime` fields are ignored; the store assigns both.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub stock: i32,
}

impl NewProduct {
    /// Reject drafts that cannot be persisted
    pub fn validate(&self) -> Result<()> {
        if self.product_name.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "Product name must not be empty".to_string(),
            ));
        }
        if self.price.cents().unsigned_abs() > MAX_PRICE_CENTS as u64 {
            return Err(Error::InvalidArgument(format!(
                "Price {} is out of range",
                self.price
            )));
        }
        Ok(())
    }
}
