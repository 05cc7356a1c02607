//! The schema collaborator: record registry, leaf coercion and record
//! construction.
//!
//! The flattener and reconstructor never check values themselves. They ask
//! the [`SchemaRegistry`] to coerce leaves and to construct records, and
//! wrap whatever [`ValidationError`] it raises.
//!
//! # Example
//!
//! ```
//! use argflat_core::*;
//! use serde_json::json;
//!
//! let mut registry = SchemaRegistry::new();
//! registry.insert(
//!     RecordDefinition::new("Alpha")
//!         .with_field(FieldDescriptor::required("a", FieldType::Primitive(ValueType::Integer))),
//! );
//!
//! let mut values = serde_json::Map::new();
//! values.insert("a".into(), json!("4"));
//! assert_eq!(registry.construct("Alpha", values).unwrap(), json!({"a": 4}));
//! ```

use std::collections::HashMap;

use serde_json::{Map, Number, Value};

use crate::error::ValidationError;
use crate::types::{FieldDescriptor, FieldType, RecordDefinition, ValueType};

/// Capability of a typed Rust record to describe itself as a
/// [`RecordDefinition`].
///
/// Implementors usually also derive `serde::Serialize` and
/// `serde::Deserialize` so that reconstructed values can be converted with
/// [`ReconstructedArguments::get`](crate::ReconstructedArguments::get).
///
/// # Examples
///
/// ```
/// use argflat_core::*;
///
/// struct Alpha;
///
/// impl Structured for Alpha {
///     const NAME: &'static str = "Alpha";
///
///     fn definition() -> RecordDefinition {
///         RecordDefinition::new(Self::NAME)
///             .with_field(FieldDescriptor::required("a", FieldType::Primitive(ValueType::Integer)))
///     }
/// }
///
/// let mut registry = SchemaRegistry::new();
/// registry.register::<Alpha>();
/// assert!(registry.contains("Alpha"));
/// ```
pub trait Structured {
    /// Record type name.
    const NAME: &'static str;

    /// Returns the ordered field list of this record.
    fn definition() -> RecordDefinition;

    /// Registers every record referenced by this record's fields.
    fn register_nested(_registry: &mut SchemaRegistry) {}
}

/// Record definitions by name, in registration order.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    records: Vec<RecordDefinition>,
    index: HashMap<String, usize>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, replacing any previous definition with the same name.
    pub fn insert(&mut self, record: RecordDefinition) -> Option<RecordDefinition> {
        match self.index.get(&record.name) {
            Some(&idx) => Some(std::mem::replace(&mut self.records[idx], record)),
            None => {
                self.index.insert(record.name.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    /// Registers a typed record and the records it references.
    pub fn register<T: Structured>(&mut self) -> &mut Self {
        if !self.contains(T::NAME) {
            self.insert(T::definition());
            T::register_nested(self);
        }
        self
    }

    /// Looks up a record by name.
    pub fn get(&self, name: &str) -> Option<&RecordDefinition> {
        self.index.get(name).map(|&idx| &self.records[idx])
    }

    /// Returns `true` if a record with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterates over records in registration order.
    pub fn records(&self) -> impl Iterator<Item = &RecordDefinition> {
        self.records.iter()
    }

    /// Number of registered records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no records are registered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Coerces a supplied value to the declared type of `field`.
    ///
    /// Command-line strings become booleans and numbers; numbers and
    /// booleans are accepted for string fields.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidValue`] or
    /// [`ValidationError::NotAChoice`] when the value cannot be coerced.
    pub fn coerce(&self, field: &FieldDescriptor, value: Value) -> Result<Value, ValidationError> {
        match &field.field_type {
            FieldType::Optional(_) if value.is_null() => Ok(Value::Null),
            FieldType::Primitive(vt) | FieldType::Optional(vt) => {
                coerce_primitive(&field.name, vt, value)
            }
            FieldType::Record(record) => {
                if value.is_object() {
                    Ok(value)
                } else {
                    Err(ValidationError::InvalidValue {
                        field: field.name.clone(),
                        expected: record.clone(),
                        found: value.to_string(),
                    })
                }
            }
        }
    }

    /// Constructs an instance of `record` from the supplied field values.
    ///
    /// Fields are taken in declaration order. Missing fields fall back to
    /// their default (or `null`); unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Missing`] for absent required fields,
    /// coercion errors from [`coerce`](Self::coerce), or
    /// [`ValidationError::UnknownRecord`] if `record` is not registered.
    pub fn construct(
        &self,
        record: &str,
        mut values: Map<String, Value>,
    ) -> Result<Value, ValidationError> {
        let definition = self
            .get(record)
            .ok_or_else(|| ValidationError::UnknownRecord(record.to_string()))?;

        let mut instance = Map::new();
        for field in &definition.fields {
            let value = match values.remove(&field.name) {
                Some(Value::Null) if field.field_type.is_nullable() => Value::Null,
                Some(Value::Null) | None => {
                    if field.required {
                        return Err(ValidationError::Missing {
                            field: field.name.clone(),
                        });
                    }
                    field.default.clone().unwrap_or(Value::Null)
                }
                Some(value) => self.coerce(field, value)?,
            };
            instance.insert(field.name.clone(), value);
        }

        Ok(Value::Object(instance))
    }

    /// Returns `true` if `value` already is a valid `record` instance: an
    /// object holding only declared fields, every required field, primitive
    /// values already of their declared type, and conforming nested records.
    ///
    /// Values that would only pass after coercion (such as `"4"` for an
    /// integer field) do not conform.
    pub fn conforms(&self, record: &str, value: &Value) -> bool {
        let (Some(definition), Value::Object(map)) = (self.get(record), value) else {
            return false;
        };

        if !map.keys().all(|key| definition.field(key).is_some()) {
            return false;
        }

        definition.fields.iter().all(|field| match map.get(&field.name) {
            None => !field.required,
            Some(nested) => match field.field_type.record_name() {
                Some(child) => self.conforms(child, nested),
                None => self.coerce(field, nested.clone()).as_ref() == Ok(nested),
            },
        })
    }
}

impl FromIterator<RecordDefinition> for SchemaRegistry {
    fn from_iter<I: IntoIterator<Item = RecordDefinition>>(iter: I) -> Self {
        let mut registry = Self::new();
        for record in iter {
            registry.insert(record);
        }
        registry
    }
}

fn coerce_primitive(field: &str, vt: &ValueType, value: Value) -> Result<Value, ValidationError> {
    let invalid = |found: &Value| ValidationError::InvalidValue {
        field: field.to_string(),
        expected: vt.canonical_name().to_string(),
        found: found.to_string(),
    };

    match (vt, value) {
        (ValueType::Any, value) => Ok(value),
        (ValueType::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
        (ValueType::Bool, Value::String(s)) => match parse_bool(&s) {
            Some(b) => Ok(Value::Bool(b)),
            None => Err(invalid(&Value::String(s))),
        },
        (ValueType::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => {
            Ok(Value::Number(n))
        }
        (ValueType::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(i) => Ok(Value::from(i)),
            Err(_) => Err(invalid(&Value::String(s))),
        },
        (ValueType::Float, Value::Number(n)) => Ok(Value::Number(n)),
        (ValueType::Float, Value::String(s)) => {
            match s.trim().parse::<f64>().ok().and_then(Number::from_f64) {
                Some(n) => Ok(Value::Number(n)),
                None => Err(invalid(&Value::String(s))),
            }
        }
        (ValueType::String, Value::String(s)) => Ok(Value::String(s)),
        (ValueType::String, value @ (Value::Number(_) | Value::Bool(_))) => {
            Ok(Value::String(value.to_string()))
        }
        (ValueType::Choice(choices), value) => {
            let text = match value {
                Value::String(s) => s,
                Value::Number(_) | Value::Bool(_) => value.to_string(),
                other => return Err(invalid(&other)),
            };
            if choices.contains(&text) {
                Ok(Value::String(text))
            } else {
                Err(ValidationError::NotAChoice {
                    field: field.to_string(),
                    value: text,
                    choices: choices.clone(),
                })
            }
        }
        (_, other) => Err(invalid(&other)),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn int(name: &str) -> FieldDescriptor {
        FieldDescriptor::required(name, FieldType::Primitive(ValueType::Integer))
    }

    fn registry() -> SchemaRegistry {
        [
            RecordDefinition::new("Alpha").with_field(int("a")),
            RecordDefinition::new("Color")
                .with_field(int("r"))
                .with_field(FieldDescriptor::record("alpha", "Alpha")),
            RecordDefinition::new("Pet")
                .with_field(
                    FieldDescriptor::required("kind", FieldType::Primitive(ValueType::String))
                        .with_default("dog"),
                )
                .with_field(FieldDescriptor::optional(
                    "nickname",
                    FieldType::Optional(ValueType::String),
                )),
        ]
        .into_iter()
        .collect()
    }

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_construct_coerces_strings() {
        let built = registry()
            .construct("Alpha", map(json!({"a": "12"})))
            .unwrap();
        assert_eq!(built, json!({"a": 12}));
    }

    #[test]
    fn test_construct_applies_defaults_and_null() {
        let built = registry().construct("Pet", Map::new()).unwrap();
        assert_eq!(built, json!({"kind": "dog", "nickname": null}));
    }

    #[test]
    fn test_construct_reports_missing_field() {
        let err = registry().construct("Alpha", Map::new()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Missing {
                field: "a".to_string()
            }
        );
    }

    #[test]
    fn test_construct_rejects_bad_integer() {
        let err = registry()
            .construct("Alpha", map(json!({"a": "twelve"})))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { ref field, .. } if field == "a"));
    }

    #[test]
    fn test_construct_ignores_unknown_keys() {
        let built = registry()
            .construct("Alpha", map(json!({"a": 1, "zzz": 2})))
            .unwrap();
        assert_eq!(built, json!({"a": 1}));
    }

    #[test]
    fn test_coerce_choice() {
        let field = FieldDescriptor::required(
            "format",
            FieldType::Primitive(ValueType::Choice(vec!["json".into(), "yaml".into()])),
        );
        let reg = SchemaRegistry::new();
        assert_eq!(reg.coerce(&field, json!("yaml")).unwrap(), json!("yaml"));
        assert!(matches!(
            reg.coerce(&field, json!("toml")),
            Err(ValidationError::NotAChoice { .. })
        ));
    }

    #[test]
    fn test_coerce_bool_and_float() {
        let reg = SchemaRegistry::new();
        let flag = FieldDescriptor::required("flag", FieldType::Primitive(ValueType::Bool));
        let ratio = FieldDescriptor::required("ratio", FieldType::Primitive(ValueType::Float));
        assert_eq!(reg.coerce(&flag, json!("yes")).unwrap(), json!(true));
        assert_eq!(reg.coerce(&ratio, json!("0.5")).unwrap(), json!(0.5));
        assert!(reg.coerce(&flag, json!("maybe")).is_err());
    }

    #[test]
    fn test_conforms_checks_nested_shape() {
        let reg = registry();
        assert!(reg.conforms("Color", &json!({"r": 1, "alpha": {"a": 2}})));
        assert!(!reg.conforms("Color", &json!({"r": 1, "alpha": {"b": 2}})));
        assert!(!reg.conforms("Color", &json!({"r": 1})));
        assert!(!reg.conforms("Color", &json!(5)));
    }

    #[test]
    fn test_conforms_requires_declared_primitive_types() {
        let reg = registry();
        assert!(!reg.conforms("Alpha", &json!({"a": "not-a-number"})));
        assert!(!reg.conforms("Alpha", &json!({"a": "4"})));
        assert!(!reg.conforms("Alpha", &json!({"a": null})));
        assert!(!reg.conforms("Color", &json!({"r": 1, "alpha": {"a": 2.5}})));
        assert!(reg.conforms("Pet", &json!({"kind": "cat", "nickname": null})));
        assert!(!reg.conforms("Pet", &json!({"kind": 3})));
    }

    #[test]
    fn test_insert_replaces_existing_record() {
        let mut reg = registry();
        let previous = reg.insert(RecordDefinition::new("Alpha").with_field(int("b")));
        assert!(previous.is_some());
        assert_eq!(reg.len(), 3);
        assert!(reg.get("Alpha").unwrap().field("b").is_some());
    }
}
