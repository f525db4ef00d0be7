//! Report leaves that may be "not available".
//!
//! A [`Field`] is either a computed value or the explicit sentinel. On the
//! wire the sentinel is the literal string `"not available"`, so a lookup
//! never has to distinguish "absent" from "omitted".

use std::borrow::Cow;

use schemars::{json_schema, JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::reference::NOT_AVAILABLE;

/// A report value that is either present or explicitly not available.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    /// Computed value.
    Present(T),
    /// Known to be missing.
    NotAvailable,
}

/// A required field held the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Missing {
    /// Dotted report path of the missing value, e.g. `feature_contributions.top_contributing_regions`.
    pub path: &'static str,
}

impl std::fmt::Display for Missing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} is not available", self.path)
    }
}

impl<T> Field<T> {
    /// Returns the value, or [`Missing`] naming `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Missing`] if the field is [`Field::NotAvailable`].
    pub const fn require(&self, path: &'static str) -> Result<&T, Missing> {
        match self {
            Self::Present(value) => Ok(value),
            Self::NotAvailable => Err(Missing { path }),
        }
    }

    /// Returns true if a value is present.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Borrow the value if present.
    #[must_use]
    pub const fn as_option(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            Self::NotAvailable => None,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NotAvailable, Self::Present)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Present(value) => value.serialize(serializer),
            Self::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// Matches only the sentinel string.
struct Sentinel;

impl<'de> Deserialize<'de> for Sentinel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text == NOT_AVAILABLE {
            Ok(Self)
        } else {
            Err(serde::de::Error::custom("expected the not-available sentinel"))
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldRepr<T> {
    Sentinel(Sentinel),
    Value(T),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match FieldRepr::<T>::deserialize(deserializer)? {
            FieldRepr::Sentinel(Sentinel) => Self::NotAvailable,
            FieldRepr::Value(value) => Self::Present(value),
        })
    }
}

impl<T: JsonSchema> JsonSchema for Field<T> {
    fn inline_schema() -> bool {
        true
    }

    fn schema_name() -> Cow<'static, str> {
        format!("Field_{}", T::schema_name()).into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "anyOf": [
                generator.subschema_for::<T>(),
                { "const": NOT_AVAILABLE }
            ]
        })
    }
}
