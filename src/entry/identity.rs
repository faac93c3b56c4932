use crate::entry::scalar::Text;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Communication protocol spoken by a described service.
///
/// Known variants keep serialization consistent; `Other` carries whatever the
/// source document declared so validation can report it instead of the YAML
/// decoder rejecting the whole file.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Transport {
    Stdio,
    Sse,
    StreamableHttp,
    Other(String),
}

/// Provenance/maintenance classification of an entry.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Tier {
    Official,
    #[default]
    Community,
    Other(String),
}

/// Maturity classification of an entry.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Status {
    #[default]
    Active,
    Beta,
    Alpha,
    Deprecated,
    Other(String),
}

impl Transport {
    pub const KNOWN: &'static [&'static str] = &["stdio", "sse", "streamable-http"];

    pub fn as_str(&self) -> &str {
        match self {
            Transport::Stdio => "stdio",
            Transport::Sse => "sse",
            Transport::StreamableHttp => "streamable-http",
            Transport::Other(value) => value.as_str(),
        }
    }

    fn from_str(value: &str) -> Self {
        match value {
            "stdio" => Transport::Stdio,
            "sse" => Transport::Sse,
            "streamable-http" => Transport::StreamableHttp,
            other => Transport::Other(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Transport::Other(_))
    }
}

impl Tier {
    // `Partner` appeared in one historical validator; it is not accepted.
    pub const KNOWN: &'static [&'static str] = &["Official", "Community"];

    pub fn as_str(&self) -> &str {
        match self {
            Tier::Official => "Official",
            Tier::Community => "Community",
            Tier::Other(value) => value.as_str(),
        }
    }

    fn from_str(value: &str) -> Self {
        match value {
            "Official" => Tier::Official,
            "Community" => Tier::Community,
            other => Tier::Other(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Tier::Other(_))
    }
}

impl Status {
    pub const KNOWN: &'static [&'static str] = &["Active", "Beta", "Alpha", "Deprecated"];

    pub fn as_str(&self) -> &str {
        match self {
            Status::Active => "Active",
            Status::Beta => "Beta",
            Status::Alpha => "Alpha",
            Status::Deprecated => "Deprecated",
            Status::Other(value) => value.as_str(),
        }
    }

    fn from_str(value: &str) -> Self {
        match value {
            "Active" => Status::Active,
            "Beta" => Status::Beta,
            "Alpha" => Status::Alpha,
            "Deprecated" => Status::Deprecated,
            other => Status::Other(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Status::Other(_))
    }
}

impl Serialize for Transport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Transport {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Text(value) = Text::deserialize(deserializer)?;
        Ok(Self::from_str(&value))
    }
}

impl Serialize for Tier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Tier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Text(value) = Text::deserialize(deserializer)?;
        Ok(Self::from_str(&value))
    }
}

impl Serialize for Status {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Text(value) = Text::deserialize(deserializer)?;
        Ok(Self::from_str(&value))
    }
}
