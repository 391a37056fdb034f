//! Identifier parsing: textual path/linkage ids into typed identifier values.
//!
//! Stateless. The target type comes from the resource metadata registered at
//! startup, never from the input text.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Declared type of a resource's identifier field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdType {
    Short,
    Integer,
    Long,
    String,
    Uuid,
}

impl IdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdType::Short => "short",
            IdType::Integer => "integer",
            IdType::Long => "long",
            IdType::String => "string",
            IdType::Uuid => "uuid",
        }
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed, strongly-typed identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum IdValue {
    Short(i16),
    Integer(i32),
    Long(i64),
    String(String),
    Uuid(Uuid),
}

impl IdValue {
    /// The identifier type this value was parsed as.
    pub fn id_type(&self) -> IdType {
        match self {
            IdValue::Short(_) => IdType::Short,
            IdValue::Integer(_) => IdType::Integer,
            IdValue::Long(_) => IdType::Long,
            IdValue::String(_) => IdType::String,
            IdValue::Uuid(_) => IdType::Uuid,
        }
    }
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdValue::Short(v) => write!(f, "{v}"),
            IdValue::Integer(v) => write!(f, "{v}"),
            IdValue::Long(v) => write!(f, "{v}"),
            IdValue::String(v) => f.write_str(v),
            IdValue::Uuid(v) => write!(f, "{v}"),
        }
    }
}

impl From<i16> for IdValue {
    fn from(v: i16) -> Self {
        IdValue::Short(v)
    }
}

impl From<i32> for IdValue {
    fn from(v: i32) -> Self {
        IdValue::Integer(v)
    }
}

impl From<i64> for IdValue {
    fn from(v: i64) -> Self {
        IdValue::Long(v)
    }
}

impl From<&str> for IdValue {
    fn from(v: &str) -> Self {
        IdValue::String(v.to_string())
    }
}

impl From<Uuid> for IdValue {
    fn from(v: Uuid) -> Self {
        IdValue::Uuid(v)
    }
}

/// An identifier string that does not convert to the expected type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse '{input}' as {target}: {reason}")]
pub struct ParseError {
    pub input: String,
    pub target: IdType,
    pub reason: String,
}

impl ParseError {
    /// A linkage object that carries no identifier where one is required.
    pub fn missing(target: IdType) -> Self {
        Self {
            input: "null".to_string(),
            target,
            reason: "linkage object has no id".to_string(),
        }
    }
}

/// Converts identifier text into [`IdValue`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeParser;

impl TypeParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one identifier. Input is taken verbatim (no trimming).
    pub fn parse(&self, input: &str, target: IdType) -> Result<IdValue, ParseError> {
        let fail = |reason: String| ParseError {
            input: input.to_string(),
            target,
            reason,
        };

        match target {
            IdType::Short => input
                .parse::<i16>()
                .map(IdValue::Short)
                .map_err(|e| fail(e.to_string())),
            IdType::Integer => input
                .parse::<i32>()
                .map(IdValue::Integer)
                .map_err(|e| fail(e.to_string())),
            IdType::Long => input
                .parse::<i64>()
                .map(IdValue::Long)
                .map_err(|e| fail(e.to_string())),
            IdType::String => Ok(IdValue::String(input.to_string())),
            IdType::Uuid => Uuid::parse_str(input)
                .map(IdValue::Uuid)
                .map_err(|e| fail(e.to_string())),
        }
    }

    /// Parse a sequence of identifiers, keeping order and duplicates.
    /// Stops at the first malformed element.
    pub fn parse_all<'a, I>(&self, inputs: I, target: IdType) -> Result<Vec<IdValue>, ParseError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        inputs
            .into_iter()
            .map(|input| self.parse(input, target))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_types() {
        let parser = TypeParser::new();
        assert_eq!(parser.parse("7", IdType::Short).unwrap(), IdValue::Short(7));
        assert_eq!(
            parser.parse("-42", IdType::Integer).unwrap(),
            IdValue::Integer(-42)
        );
        assert_eq!(
            parser.parse("9000000000", IdType::Long).unwrap(),
            IdValue::Long(9_000_000_000)
        );
    }

    #[test]
    fn string_is_taken_verbatim() {
        let parser = TypeParser::new();
        assert_eq!(
            parser.parse(" abc ", IdType::String).unwrap(),
            IdValue::String(" abc ".into())
        );
        assert_eq!(
            parser.parse("", IdType::String).unwrap(),
            IdValue::String(String::new())
        );
    }

    #[test]
    fn parses_uuid() {
        let parser = TypeParser::new();
        let id = Uuid::new_v4();
        assert_eq!(
            parser.parse(&id.to_string(), IdType::Uuid).unwrap(),
            IdValue::Uuid(id)
        );
    }

    #[test]
    fn malformed_input_is_an_error() {
        let parser = TypeParser::new();
        let err = parser.parse("abc", IdType::Long).unwrap_err();
        assert_eq!(err.input, "abc");
        assert_eq!(err.target, IdType::Long);
        assert!(err.to_string().starts_with("cannot parse 'abc' as long"));
    }

    #[test]
    fn integer_overflow_is_an_error() {
        let parser = TypeParser::new();
        assert!(parser.parse("40000", IdType::Short).is_err());
        assert!(parser.parse("3000000000", IdType::Integer).is_err());
    }

    #[test]
    fn whitespace_is_not_trimmed_for_numbers() {
        let parser = TypeParser::new();
        assert!(parser.parse(" 1", IdType::Integer).is_err());
    }

    #[test]
    fn parse_all_keeps_order_and_duplicates() {
        let parser = TypeParser::new();
        let ids = parser
            .parse_all(["3", "1", "3"], IdType::Integer)
            .unwrap();
        assert_eq!(
            ids,
            vec![IdValue::Integer(3), IdValue::Integer(1), IdValue::Integer(3)]
        );
    }

    #[test]
    fn parse_all_fails_on_first_bad_element() {
        let parser = TypeParser::new();
        let err = parser
            .parse_all(["1", "x", "y"], IdType::Integer)
            .unwrap_err();
        assert_eq!(err.input, "x");
    }

    #[test]
    fn missing_id_error() {
        let err = ParseError::missing(IdType::Long);
        assert_eq!(err.target, IdType::Long);
        assert_eq!(
            err.to_string(),
            "cannot parse 'null' as long: linkage object has no id"
        );
    }

    #[test]
    fn display_round_trips_text() {
        assert_eq!(IdValue::Long(12).to_string(), "12");
        assert_eq!(IdValue::from("abc").to_string(), "abc");
        assert_eq!(IdType::Uuid.to_string(), "uuid");
    }
}
