//! Amount deserialization accepting decimal strings and JSON numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de::Error};
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Integer(i64),
    Float(f64),
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    match RawAmount::deserialize(deserializer)? {
        RawAmount::Text(text) => Decimal::from_str(text.trim())
            .map_err(|e| D::Error::custom(format!("invalid amount '{text}': {e}"))),
        RawAmount::Integer(value) => Ok(Decimal::from(value)),
        // Shortest round-trip rendering, so 10.1 reads back as exactly 10.1.
        RawAmount::Float(value) => Decimal::from_str(&value.to_string())
            .or_else(|_| Decimal::from_scientific(&format!("{value:e}")))
            .map_err(|e| D::Error::custom(format!("invalid amount {value}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "super::deserialize")]
        value: Decimal,
    }

    fn read(json: &str) -> Result<Decimal, serde_json::Error> {
        serde_json::from_str::<Holder>(json).map(|h| h.value)
    }

    #[test]
    fn test_reads_strings_and_numbers() {
        assert_eq!(read(r#"{"value": "12.50"}"#).unwrap(), dec!(12.50));
        assert_eq!(read(r#"{"value": 20}"#).unwrap(), dec!(20));
        assert_eq!(read(r#"{"value": 10.1}"#).unwrap(), dec!(10.1));
        assert_eq!(read(r#"{"value": 0.0}"#).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_rejects_non_numeric_text() {
        assert!(read(r#"{"value": "ten"}"#).is_err());
    }
}
