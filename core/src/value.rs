//! Typed flag values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The value type a flag carries.
///
/// # Examples
///
/// ```
/// use redhawk_flags::{FlagKind, FlagValue};
///
/// assert_eq!(FlagValue::Bool(true).kind(), FlagKind::Bool);
/// assert_eq!(FlagKind::StringSlice.to_string(), "string-slice");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlagKind {
    /// A single string.
    String,
    /// A switch; present means `true`.
    Bool,
    /// Comma-delimited or repeated strings.
    StringSlice,
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::StringSlice => "string-slice",
        };
        f.write_str(name)
    }
}

/// A flag's current, parsed or default value.
///
/// Serializes untagged, so a resolved configuration renders as plain
/// strings, booleans and arrays.
///
/// # Examples
///
/// ```
/// use redhawk_flags::FlagValue;
///
/// let regions = FlagValue::StrList(vec!["us-east-1".into(), "eu-west-1".into()]);
/// assert_eq!(regions.to_string(), "us-east-1,eu-west-1");
/// assert_eq!(FlagValue::from("table").as_str(), Some("table"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Str(String),
    Bool(bool),
    StrList(Vec<String>),
}

impl FlagValue {
    /// Returns the kind of this value.
    pub fn kind(&self) -> FlagKind {
        match self {
            Self::Str(_) => FlagKind::String,
            Self::Bool(_) => FlagKind::Bool,
            Self::StrList(_) => FlagKind::StringSlice,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str_list(&self) -> Option<&[String]> {
        match self {
            Self::StrList(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::StrList(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for FlagValue {
    fn from(value: Vec<String>) -> Self {
        Self::StrList(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kinds() {
        assert_eq!(FlagValue::from("x").kind(), FlagKind::String);
        assert_eq!(FlagValue::from(false).kind(), FlagKind::Bool);
        assert_eq!(FlagValue::from(Vec::new()).kind(), FlagKind::StringSlice);
    }

    #[test]
    fn test_accessors_reject_other_kinds() {
        let value = FlagValue::Bool(true);
        assert_eq!(value.as_bool(), Some(true));
        assert!(value.as_str().is_none());
        assert!(value.as_str_list().is_none());
    }

    #[test]
    fn test_serializes_untagged() {
        let json = serde_json::to_string(&FlagValue::from("table")).unwrap();
        assert_eq!(json, "\"table\"");
        let json = serde_json::to_string(&FlagValue::Bool(true)).unwrap();
        assert_eq!(json, "true");
    }
}
