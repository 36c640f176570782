use num_bigint::BigUint;
use num_traits::Zero;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

/// Token amount in minor units (lamports, raw token units)
///
/// Serialized as a decimal string so values above 2^53 survive JSON clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(BigUint);

impl Amount {
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Saturating conversion for instruction arguments
    pub fn to_u64_saturating(&self) -> u64 {
        u64::try_from(&self.0).unwrap_or(u64::MAX)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<BigUint> for Amount {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl FromStr for Amount {
    type Err = num_bigint::ParseBigIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigUint::from_str(s.trim()).map(Self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'a> AddAssign<&'a Amount> for Amount {
    fn add_assign(&mut self, rhs: &'a Amount) {
        self.0 += &rhs.0;
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer or decimal string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_str(v).map_err(|_| E::custom(format!("invalid amount: {}", v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        u64::try_from(v)
            .map(Amount::from)
            .map_err(|_| E::custom(format!("negative amount: {}", v)))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_decimal_string() {
        let amount = Amount::from_str("9007199254740993").unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"9007199254740993\"");
    }

    #[test]
    fn accepts_strings_and_integers() {
        let a: Amount = serde_json::from_str("\"123\"").unwrap();
        let b: Amount = serde_json::from_str("123").unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_str::<Amount>("-1").is_err());
        assert!(serde_json::from_str::<Amount>("\"1.5\"").is_err());
    }

    #[test]
    fn saturates_when_narrowing() {
        let huge = Amount::from_str("340282366920938463463374607431768211456").unwrap();
        assert_eq!(huge.to_u64_saturating(), u64::MAX);
        assert_eq!(Amount::from(42).to_u64_saturating(), 42);
    }
}
