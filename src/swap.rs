//! Bidirectional type transforms ("swaps").
//!
//! A swap replaces a value with a surrogate before it is written, and turns
//! the parsed surrogate back into the original after it is read. The set of
//! built-in swaps is closed; anything else goes through [`Swap::Custom`], which
//! holds plain function pointers.
//!
//! ```rust
//! use serde_uon::{Swap, TypeDescriptor, Value};
//!
//! let ts = TypeDescriptor::string().with_swap(Swap::EpochMillis);
//! let millis = Swap::EpochMillis.forward(&Value::from("2024-01-15T10:30:00Z")).unwrap();
//! assert_eq!(millis.as_i64(), Some(1_705_314_600_000));
//!
//! let back = Swap::EpochMillis.backward(millis, &ts).unwrap();
//! assert_eq!(back.as_str(), Some("2024-01-15T10:30:00Z"));
//! ```

use crate::types::well_known;
use crate::{Error, Result, ScalarKind, Shape, TypeDescriptor, Value};
use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use num_bigint::BigInt;
use std::fmt;
use std::str::FromStr;

/// A user-supplied transform.
#[derive(Clone, Copy)]
pub struct CustomSwap {
    pub name: &'static str,
    /// Shape of the value `forward` produces.
    pub surrogate: Shape,
    pub forward: fn(&Value) -> Result<Value>,
    pub backward: fn(Value, &TypeDescriptor) -> Result<Value>,
}

impl fmt::Debug for CustomSwap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomSwap")
            .field("name", &self.name)
            .field("surrogate", &self.surrogate)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Swap {
    /// RFC 3339 timestamp text to epoch milliseconds.
    EpochMillis,
    /// RFC 3339 timestamp text to a `YYYY-MM-DD` date (UTC).
    IsoDate,
    /// Integer of any size to its decimal text as a string.
    BigIntString,
    Custom(CustomSwap),
}

impl Swap {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Swap::EpochMillis => "EpochMillis",
            Swap::IsoDate => "IsoDate",
            Swap::BigIntString => "BigIntString",
            Swap::Custom(custom) => custom.name,
        }
    }

    /// The type the surrogate is written and parsed as.
    #[must_use]
    pub fn surrogate_type(&self) -> &'static TypeDescriptor {
        match self {
            Swap::EpochMillis => well_known(Shape::Scalar(ScalarKind::Number)),
            Swap::IsoDate | Swap::BigIntString => well_known(Shape::Scalar(ScalarKind::String)),
            Swap::Custom(custom) => well_known(custom.surrogate),
        }
    }

    /// Produces the surrogate to write in place of `value`.
    pub fn forward(&self, value: &Value) -> Result<Value> {
        match self {
            Swap::EpochMillis => {
                let dt = parse_timestamp(self, value)?;
                Ok(Value::from(dt.timestamp_millis()))
            }
            Swap::IsoDate => {
                let dt = parse_timestamp(self, value)?;
                Ok(Value::string(dt.date_naive().format("%Y-%m-%d").to_string()))
            }
            Swap::BigIntString => {
                let big = parse_bigint(self, value)?;
                Ok(Value::string(big.to_string()))
            }
            Swap::Custom(custom) => (custom.forward)(value),
        }
    }

    /// Reconstitutes the original value from a parsed surrogate.
    pub fn backward(&self, surrogate: Value, ty: &TypeDescriptor) -> Result<Value> {
        match self {
            Swap::EpochMillis => {
                let millis = surrogate
                    .as_i64()
                    .ok_or_else(|| mismatch(self, "epoch milliseconds", &surrogate))?;
                let dt = Utc
                    .timestamp_millis_opt(millis)
                    .single()
                    .ok_or_else(|| mismatch(self, "epoch milliseconds in range", &surrogate))?;
                Ok(Value::string(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
            }
            Swap::IsoDate => {
                let text = surrogate
                    .as_str()
                    .ok_or_else(|| mismatch(self, "date string", &surrogate))?;
                let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .map_err(|_| mismatch(self, "YYYY-MM-DD", &surrogate))?;
                let midnight = date
                    .and_hms_opt(0, 0, 0)
                    .ok_or_else(|| mismatch(self, "valid date", &surrogate))?;
                Ok(Value::string(
                    Utc.from_utc_datetime(&midnight)
                        .to_rfc3339_opts(SecondsFormat::AutoSi, true),
                ))
            }
            Swap::BigIntString => {
                let text = match &surrogate {
                    Value::Scalar(s) => s.text(),
                    _ => return Err(mismatch(self, "integer string", &surrogate)),
                };
                let big = BigInt::from_str(text)
                    .map_err(|_| mismatch(self, "integer string", &surrogate))?;
                Ok(Value::from(big))
            }
            Swap::Custom(custom) => (custom.backward)(surrogate, ty),
        }
    }
}

fn parse_timestamp(swap: &Swap, value: &Value) -> Result<DateTime<Utc>> {
    let text = value
        .as_str()
        .ok_or_else(|| mismatch(swap, "RFC 3339 timestamp", value))?;
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| mismatch(swap, "RFC 3339 timestamp", value))
}

fn parse_bigint(swap: &Swap, value: &Value) -> Result<BigInt> {
    match value {
        Value::Scalar(s) if s.kind() != ScalarKind::Boolean => {
            BigInt::from_str(s.text()).map_err(|_| mismatch(swap, "integer", value))
        }
        _ => Err(mismatch(swap, "integer", value)),
    }
}

fn mismatch(swap: &Swap, expected: &str, found: &Value) -> Error {
    let found = match found {
        Value::Scalar(s) => format!("{} '{}'", found.kind_name(), s.text()),
        other => other.kind_name().to_string(),
    };
    Error::type_mismatch(&format!("swap {}", swap.name()), expected, &found)
}
