/// Serde helper functions for custom serialization/deserialization
use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

/// Skip serializing if Option is None
pub fn is_none<T>(value: &Option<T>) -> bool {
    value.is_none()
}

/// Skip serializing if value is zero
pub fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

/// Accept a boolean flag written as `true`/`false` or `0`/`1`
pub mod flag {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(u64),
    }

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bool(*value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => Ok(b),
            Raw::Int(0) => Ok(false),
            Raw::Int(1) => Ok(true),
            Raw::Int(n) => Err(serde::de::Error::custom(format!(
                "flag must be 0 or 1, got {}",
                n
            ))),
        }
    }
}

/// Serialize Duration as whole milliseconds
pub mod duration_millis {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Flagged {
        #[serde(with = "flag")]
        blocks: bool,
    }

    #[test]
    fn test_flag_accepts_numbers_and_bools() {
        let a: Flagged = serde_json::from_str(r#"{"blocks": 1}"#).unwrap();
        let b: Flagged = serde_json::from_str(r#"{"blocks": false}"#).unwrap();
        assert!(a.blocks);
        assert!(!b.blocks);
        assert!(serde_json::from_str::<Flagged>(r#"{"blocks": 2}"#).is_err());
    }

    #[test]
    fn test_skip_serializing_helpers() {
        assert!(is_none::<String>(&None));
        assert!(!is_none(&Some(1)));
        assert!(is_zero_u64(&0));
        assert!(!is_zero_u64(&1));
    }
}
