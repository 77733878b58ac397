//! Field extraction from the loosely typed YAML tree.
//!
//! Every accessor either returns a value of the requested shape or a
//! [`LoadError`] naming the record it came from. Nothing is coerced: a
//! number is never accepted where a string is expected.

use std::path::PathBuf;

use serde_yaml::{Mapping, Value};

use crate::error::LoadError;
use crate::loader::SOURCE_KEY;

/// A mapping together with a description of where it came from.
#[derive(Debug, Clone)]
pub(crate) struct Record<'a> {
    map: &'a Mapping,
    origin: String,
}

impl<'a> Record<'a> {
    pub fn new(value: &'a Value, origin: impl Into<String>) -> Result<Self, LoadError> {
        let origin = origin.into();
        match value {
            Value::Mapping(map) => Ok(Self::from_mapping(map, origin)),
            _ => Err(LoadError::InvalidField {
                origin,
                field: "<record>".to_string(),
                expected: "a mapping",
            }),
        }
    }

    pub fn from_mapping(map: &'a Mapping, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        let origin = match map.get(SOURCE_KEY) {
            Some(Value::String(source)) => source.clone(),
            _ => origin,
        };
        Self { map, origin }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Null values count as absent.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn invalid(&self, field: &str, expected: &'static str) -> LoadError {
        LoadError::InvalidField {
            origin: self.origin.clone(),
            field: field.to_string(),
            expected,
        }
    }

    fn missing(&self, field: &str) -> LoadError {
        LoadError::MissingField {
            origin: self.origin.clone(),
            field: field.to_string(),
        }
    }

    pub fn str(&self, key: &str) -> Result<&'a str, LoadError> {
        self.opt_str(key)?.ok_or_else(|| self.missing(key))
    }

    pub fn opt_str(&self, key: &str) -> Result<Option<&'a str>, LoadError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(self.invalid(key, "a string")),
        }
    }

    pub fn opt_string(&self, key: &str) -> Result<Option<String>, LoadError> {
        Ok(self.opt_str(key)?.map(str::to_string))
    }

    pub fn opt_int(&self, key: &str) -> Result<Option<i64>, LoadError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| self.invalid(key, "an integer")),
            Some(_) => Err(self.invalid(key, "an integer")),
        }
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, LoadError> {
        match self.get(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(self.invalid(key, "a boolean")),
        }
    }

    /// A required nested mapping.
    pub fn record(&self, key: &str) -> Result<Record<'a>, LoadError> {
        self.opt_record(key)?.ok_or_else(|| self.missing(key))
    }

    pub fn opt_record(&self, key: &str) -> Result<Option<Record<'a>>, LoadError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Mapping(map)) => Ok(Some(Record::from_mapping(
                map,
                format!("{}.{}", self.origin, key),
            ))),
            Some(_) => Err(self.invalid(key, "a mapping")),
        }
    }

    /// A sequence; absent means empty.
    pub fn list(&self, key: &str) -> Result<&'a [Value], LoadError> {
        match self.get(key) {
            None => Ok(&[]),
            Some(Value::Sequence(items)) => Ok(items),
            Some(_) => Err(self.invalid(key, "a list")),
        }
    }

    /// A sequence of strings; absent means empty.
    pub fn str_list(&self, key: &str) -> Result<Vec<&'a str>, LoadError> {
        self.list(key)?
            .iter()
            .map(|item| item.as_str().ok_or_else(|| self.invalid(key, "a list of strings")))
            .collect()
    }

    /// A mapping keyed by string slugs, in key order; absent means empty.
    pub fn entries(&self, key: &str) -> Result<Vec<(&'a str, &'a Value)>, LoadError> {
        let map = match self.get(key) {
            None => return Ok(Vec::new()),
            Some(Value::Mapping(map)) => map,
            Some(_) => return Err(self.invalid(key, "a mapping")),
        };
        let mut entries = map
            .iter()
            .filter(|(k, _)| k.as_str() != Some(SOURCE_KEY))
            .map(|(k, v)| {
                k.as_str()
                    .map(|k| (k, v))
                    .ok_or_else(|| self.invalid(key, "a mapping with string keys"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort_by(|a, b| a.0.cmp(b.0));
        Ok(entries)
    }

    /// A list item or mapping value, described relative to this record.
    pub fn child(&self, value: &'a Value, label: impl std::fmt::Display) -> Result<Record<'a>, LoadError> {
        Record::new(value, format!("{}: {}", self.origin, label))
    }

    /// The file this record was read from.
    pub fn source(&self) -> Result<PathBuf, LoadError> {
        match self.map.get(SOURCE_KEY) {
            Some(Value::String(source)) => Ok(PathBuf::from(source)),
            _ => Err(self.missing(SOURCE_KEY)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_required_and_optional() {
        let value = parse("name: Brno\nnumber: 3\nnotes: null\n_source: a/b.yaml\n");
        let record = Record::new(&value, "fallback").unwrap();

        assert_eq!(record.origin(), "a/b.yaml");
        assert_eq!(record.str("name").unwrap(), "Brno");
        assert_eq!(record.opt_int("number").unwrap(), Some(3));
        assert_eq!(record.opt_str("notes").unwrap(), None);
        assert_eq!(record.source().unwrap(), PathBuf::from("a/b.yaml"));
        assert!(record.list("talks").unwrap().is_empty());
        assert!(!record.bool_or("lightning", false).unwrap());
    }

    #[test]
    fn test_missing_field_names_origin() {
        let value = parse("city: brno\n");
        let record = Record::new(&value, "series/x/events/e").unwrap();

        let err = record.str("name").unwrap_err();
        assert_eq!(
            err.to_string(),
            "series/x/events/e: missing required field `name`"
        );
    }

    #[test]
    fn test_no_coercion() {
        let value = parse("topic: 2024\nnumber: seven\n");
        let record = Record::new(&value, "e").unwrap();

        assert!(matches!(
            record.opt_str("topic"),
            Err(LoadError::InvalidField { .. })
        ));
        assert!(matches!(
            record.opt_int("number"),
            Err(LoadError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_entries_sorted_without_source() {
        let value = parse("b: {}\na: {}\n_source: x.yaml\n");
        let record = Record::new(&value, "x").unwrap();
        let parent = Value::Mapping(Mapping::from_iter([(
            Value::from("items"),
            value.clone(),
        )]));
        let parent = Record::new(&parent, "p").unwrap();

        let keys: Vec<_> = parent.entries("items").unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(record.origin(), "x.yaml");
    }
}
