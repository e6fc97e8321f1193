//! Exact decimal amounts for bookkeeping entries.
//!
//! Amounts travel as strings on the wire and live as `NUMERIC(10,2)` in the
//! database; binary floats never touch them.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing an [`Amount`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The input string is empty.
    #[error("amount cannot be empty")]
    Empty,
    /// The input is not of the form `123`, `123.4`, or `123.45`.
    #[error("amount must be a number with at most 2 decimal places")]
    InvalidFormat,
    /// The value exceeds the supported range.
    #[error("amount must be at most {max}")]
    TooLarge {
        /// Maximum representable value.
        max: Decimal,
    },
    /// The value is negative.
    #[error("amount cannot be negative")]
    Negative,
}

/// A non-negative monetary amount with exactly two fractional digits.
///
/// The value is carried as a [`Decimal`] normalized to scale 2, so sums and
/// differences are exact. Serialization uses the string form (`"100.00"`) to
/// keep the wire format lossless.
///
/// ## Constraints
///
/// - Non-negative
/// - At most two fractional digits
/// - At most `99999999.99` (the `NUMERIC(10,2)` column bound)
///
/// ## Examples
///
/// ```
/// use ledgerflow_core::Amount;
///
/// let supplied = Amount::parse("100").unwrap();
/// assert_eq!(supplied.to_string(), "100.00");
///
/// assert!(Amount::parse("12.345").is_err()); // three fractional digits
/// assert!(Amount::parse("-5").is_err());     // negative
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// Zero, rendered as `"0.00"`.
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, 2));

    /// Maximum representable amount: 99999999.99.
    pub const MAX: Self = Self(Decimal::from_parts(1_410_065_407, 2, 0, false, 2));

    /// Parse an `Amount` from its canonical string form.
    ///
    /// Accepts an unsigned integer with an optional fraction of one or two
    /// digits (`100`, `100.5`, `100.50`). Anything else - signs, exponents,
    /// grouping separators, three or more fractional digits - is rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, malformed, or larger than
    /// [`Amount::MAX`].
    pub fn parse(s: &str) -> Result<Self, AmountError> {
        if s.is_empty() {
            return Err(AmountError::Empty);
        }

        let (int_part, frac_part) = match s.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (s, None),
        };

        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::InvalidFormat);
        }

        if let Some(frac) = frac_part {
            if frac.is_empty() || frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AmountError::InvalidFormat);
            }
        }

        let value: Decimal = s.parse().map_err(|_| AmountError::TooLarge {
            max: Self::MAX.as_decimal(),
        })?;
        Self::from_decimal(value)
    }

    /// Convert a raw decimal into an `Amount`, normalizing to scale 2.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is negative, exceeds [`Amount::MAX`],
    /// or carries more than two fractional digits.
    pub fn from_decimal(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative);
        }
        if value > Self::MAX.as_decimal() {
            return Err(AmountError::TooLarge {
                max: Self::MAX.as_decimal(),
            });
        }

        let mut normalized = value;
        normalized.rescale(2);
        // Rescaling rounds; a changed value means more than 2 fractional digits
        if normalized != value {
            return Err(AmountError::InvalidFormat);
        }

        Ok(Self(normalized))
    }

    /// Get the underlying decimal value (scale 2).
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Amount {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Amount {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let mut d = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid; the column is NUMERIC(10,2)
        d.rescale(2);
        Ok(Self(d))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Amount {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

/// Serde adapter for signed decimal fields rendered with two fractional digits.
///
/// Computed figures such as net balances may be negative, so they cannot be an
/// [`Amount`]; this adapter gives them the same `"123.45"` wire form.
pub mod fixed2 {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize a decimal as a string with exactly two fractional digits.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        let mut rescaled = *value;
        rescaled.rescale(2);
        serializer.collect_str(&rescaled)
    }

    /// Deserialize a decimal from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid decimal.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_parse_valid_amounts() {
        assert_eq!(Amount::parse("0").unwrap().to_string(), "0.00");
        assert_eq!(Amount::parse("100").unwrap().to_string(), "100.00");
        assert_eq!(Amount::parse("12.3").unwrap().to_string(), "12.30");
        assert_eq!(Amount::parse("12.34").unwrap().to_string(), "12.34");
        assert_eq!(Amount::parse("007.5").unwrap().to_string(), "7.50");
        assert_eq!(Amount::parse("99999999.99").unwrap(), Amount::MAX);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Amount::parse(""), Err(AmountError::Empty));
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for input in ["12.345", "-5", "+5", "1.2.3", "abc", ".5", "5.", " 12", "1e3", "1,000"] {
            assert_eq!(
                Amount::parse(input),
                Err(AmountError::InvalidFormat),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_parse_too_large() {
        assert!(matches!(
            Amount::parse("100000000.00"),
            Err(AmountError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_from_decimal() {
        assert_eq!(
            Amount::from_decimal(dec!(1.5)).unwrap().to_string(),
            "1.50"
        );
        assert_eq!(
            Amount::from_decimal(dec!(-3)),
            Err(AmountError::Negative)
        );
        assert_eq!(
            Amount::from_decimal(dec!(1.234)),
            Err(AmountError::InvalidFormat)
        );
    }

    #[test]
    fn test_zero_renders_with_two_digits() {
        assert_eq!(Amount::ZERO.to_string(), "0.00");
        assert_eq!(Amount::ZERO.as_decimal(), Decimal::ZERO);
    }

    #[test]
    fn test_serde_string_form() {
        let amount = Amount::parse("74.5").unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"74.50\"");

        let parsed: Amount = serde_json::from_str("\"100.00\"").unwrap();
        assert_eq!(parsed, Amount::parse("100").unwrap());

        assert!(serde_json::from_str::<Amount>("\"12.345\"").is_err());
        assert!(serde_json::from_str::<Amount>("100").is_err());
    }

    #[test]
    fn test_fixed2_renders_signed_values() {
        #[derive(Serialize)]
        struct Net {
            #[serde(with = "super::fixed2")]
            value: Decimal,
        }

        let json = serde_json::to_string(&Net { value: dec!(-74.5) }).unwrap();
        assert_eq!(json, "{\"value\":\"-74.50\"}");

        let json = serde_json::to_string(&Net {
            value: Decimal::ZERO,
        })
        .unwrap();
        assert_eq!(json, "{\"value\":\"0.00\"}");
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let supplied = Amount::parse("0.1").unwrap();
        let remaining = Amount::parse("0.3").unwrap();
        let net = supplied.as_decimal() - remaining.as_decimal();
        assert_eq!(net, dec!(-0.2));
    }
}
