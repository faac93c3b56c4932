//! Lenient decoding for string-typed fields.
//!
//! Authors write `args: [--port, 8080]` or `default: true` without quoting;
//! YAML resolves those to numbers and booleans. String fields take the scalar's
//! text instead of failing the whole document.

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;

/// Any plain scalar, kept as its text.
pub(crate) struct Text(pub(crate) String);

struct TextVisitor;

impl<'de> Visitor<'de> for TextVisitor {
    type Value = Text;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string, number or boolean")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Text, E> {
        Ok(Text(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Text, E> {
        Ok(Text(value))
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Text, E> {
        Ok(Text(value.to_string()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Text, E> {
        Ok(Text(value.to_string()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Text, E> {
        Ok(Text(value.to_string()))
    }

    // Debug keeps the fractional part: 1.0 stays "1.0".
    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Text, E> {
        Ok(Text(format!("{value:?}")))
    }
}

impl<'de> Deserialize<'de> for Text {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TextVisitor)
    }
}

/// Required text; `null` reads as empty.
pub(crate) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Text>::deserialize(deserializer)?
        .map(|text| text.0)
        .unwrap_or_default())
}

pub(crate) fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Text>::deserialize(deserializer)?.map(|text| text.0))
}

/// List of text items; a `null` list reads as empty.
pub(crate) fn strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Text>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(|text| text.0)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "string")]
        text: String,
        #[serde(default, deserialize_with = "opt_string")]
        maybe: Option<String>,
        #[serde(default, deserialize_with = "strings")]
        items: Vec<String>,
    }

    #[test]
    fn scalars_keep_their_text() {
        let sample: Sample =
            serde_yaml::from_str("text: 8080\nmaybe: false\nitems: [a, 1, -2, 0.5, true]\n").unwrap();
        assert_eq!(sample.text, "8080");
        assert_eq!(sample.maybe.as_deref(), Some("false"));
        assert_eq!(sample.items, ["a", "1", "-2", "0.5", "true"]);
    }

    #[test]
    fn nulls_and_missing_keys_read_as_empty() {
        let sample: Sample = serde_yaml::from_str("text: ~\nmaybe: null\nitems:\n").unwrap();
        assert_eq!(sample.text, "");
        assert!(sample.maybe.is_none());
        assert!(sample.items.is_empty());

        let sample: Sample = serde_yaml::from_str("{}").unwrap();
        assert!(sample.items.is_empty());
    }

    #[test]
    fn nested_structures_are_still_rejected() {
        let err = serde_yaml::from_str::<Sample>("text: {a: 1}\n").err().unwrap();
        assert!(err.to_string().contains("a string, number or boolean"));
    }

    #[test]
    fn json_numbers_are_accepted_too() {
        let sample: Sample = serde_json::from_str(r#"{"text": 3, "items": [1.0]}"#).unwrap();
        assert_eq!(sample.text, "3");
        assert_eq!(sample.items, ["1.0"]);
    }
}
