//! Argument reconstruction.
//!
//! [`reconstruct`] rebuilds the real arguments of a callable from the flat
//! key/value map its flattened signature was bound with. Structured
//! parameters are built depth-first: every nested record is constructed by
//! the schema collaborator before the record that contains it.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ReconstructionError, SchemaError, ValidationError};
use crate::schema::SchemaRegistry;
use crate::types::{CallableSpec, DefaultKind, FieldDescriptor, FlatArguments};
use crate::walk::TypeGraph;

/// The arguments handed to the wrapped callable: one entry per declared
/// parameter, structured parameters fully built.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReconstructedArguments {
    values: Map<String, Value>,
}

impl ReconstructedArguments {
    /// Returns the raw value of a parameter.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Converts a parameter into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Missing`] if the parameter is absent, or
    /// [`ValidationError::Deserialize`] if the value does not fit `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, ReconstructionError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| ReconstructionError::Invalid {
                path: name.to_string(),
                source: ValidationError::Missing {
                    field: name.to_string(),
                },
            })?;

        T::deserialize(value).map_err(|err| ReconstructionError::Invalid {
            path: name.to_string(),
            source: ValidationError::Deserialize {
                field: name.to_string(),
                message: err.to_string(),
            },
        })
    }

    /// Iterates over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the callable declares no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consumes the arguments, returning the underlying map.
    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }
}

/// Rebuilds the arguments of `spec` from `flat`.
///
/// - Plain parameters are coerced and passed through, falling back to their
///   default.
/// - A structured parameter whose flat entry already conforms to the
///   declared record is used verbatim.
/// - Any other structured parameter is built from the leaves in `flat`,
///   matched by leaf name.
///
/// # Errors
///
/// Returns [`ReconstructionError::Invalid`] carrying the dotted leaf path
/// when the collaborator rejects or misses a value, and
/// [`ReconstructionError::Schema`] for malformed type graphs. Nothing is
/// returned partially built.
///
/// # Examples
///
/// ```
/// use argflat_core::*;
/// use serde_json::json;
///
/// let registry: SchemaRegistry = [RecordDefinition::new("Alpha")
///     .with_field(FieldDescriptor::required("a", FieldType::Primitive(ValueType::Integer)))]
///     .into_iter()
///     .collect();
/// let spec = CallableSpec::new("get").with_param(FieldDescriptor::record("alpha", "Alpha"));
///
/// let mut flat = FlatArguments::new();
/// flat.insert("a".into(), json!("1"));
/// let args = reconstruct(&spec, &registry, &flat).unwrap();
/// assert_eq!(args.value("alpha"), Some(&json!({"a": 1})));
///
/// let err = reconstruct(&spec, &registry, &FlatArguments::new()).unwrap_err();
/// assert_eq!(err.path(), Some("alpha.a"));
/// ```
pub fn reconstruct(
    spec: &CallableSpec,
    registry: &SchemaRegistry,
    flat: &FlatArguments,
) -> Result<ReconstructedArguments, ReconstructionError> {
    let graph = TypeGraph::new(registry);
    let mut values = Map::new();

    for param in &spec.parameters {
        let value = match param.field_type.record_name() {
            Some(record) => match flat.get(&param.name) {
                Some(instance) if registry.conforms(record, instance) => {
                    debug!(param = %param.name, record, "Using pre-built instance");
                    instance.clone()
                }
                _ => build(&graph, param, &param.name, flat, &mut Vec::new())?,
            },
            None => pass_through(&graph, param, flat)?,
        };
        values.insert(param.name.clone(), value);
    }

    Ok(ReconstructedArguments { values })
}

fn pass_through(
    graph: &TypeGraph<'_>,
    param: &FieldDescriptor,
    flat: &FlatArguments,
) -> Result<Value, ReconstructionError> {
    let invalid = |source| ReconstructionError::Invalid {
        path: param.name.clone(),
        source,
    };

    match flat.get(&param.name) {
        Some(value) if !value.is_null() => {
            graph.registry().coerce(param, value.clone()).map_err(invalid)
        }
        _ => match graph.describe_default(param) {
            DefaultKind::Required => Err(invalid(ValidationError::Missing {
                field: param.name.clone(),
            })),
            DefaultKind::Absent => Ok(Value::Null),
            DefaultKind::Value(value) => Ok(value),
        },
    }
}

fn build<'a>(
    graph: &TypeGraph<'a>,
    field: &'a FieldDescriptor,
    path: &str,
    flat: &FlatArguments,
    chain: &mut Vec<&'a str>,
) -> Result<Value, ReconstructionError> {
    let fields = graph.fields_of(&field.field_type)?;
    let record = field.field_type.record_name().unwrap_or_default();
    if chain.contains(&record) {
        return Err(SchemaError::Cycle(format!("{} -> {record}", chain.join(" -> "))).into());
    }

    chain.push(record);
    let mut supplied = Map::new();
    for child in fields {
        if graph.is_structured(&child.field_type) {
            let child_path = format!("{path}.{}", child.name);
            let nested = build(graph, child, &child_path, flat, chain)?;
            supplied.insert(child.name.clone(), nested);
        } else if let Some(value) = flat.get(&child.name) {
            supplied.insert(child.name.clone(), value.clone());
        }
    }
    chain.pop();

    debug!(path, record, "Constructing record");
    graph
        .registry()
        .construct(record, supplied)
        .map_err(|source| ReconstructionError::at(path, source))
}
