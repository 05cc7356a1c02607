//! Schema type definitions for record flattening.
//!
//! This module defines the data model shared by the flattener, the
//! reconstructor and the front-end binding. The types are designed for
//! serialization with [`serde`] so that records and callables can be authored
//! as JSON or YAML bundles.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Version of the schema contract (semver).
///
/// Embedded in every [`SchemaBundle`](crate::SchemaBundle) to track
/// compatibility across bundle versions.
pub const SCHEMA_CONTRACT_VERSION: &str = "1.0.0";

/// Flat key/value input supplied at call time.
pub type FlatArguments = Map<String, Value>;

/// Primitive value type of a leaf field.
///
/// Leaf values arriving from a command line are strings; the schema
/// collaborator coerces them into the representation named here.
///
/// # Examples
///
/// ```
/// use argflat_core::ValueType;
///
/// assert_eq!(ValueType::default(), ValueType::Any);
/// assert_eq!(ValueType::Integer.canonical_name(), "int");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// `true` / `false`.
    Bool,
    /// Free-form text.
    String,
    /// Signed 64-bit integer.
    Integer,
    /// 64-bit float.
    Float,
    /// One of a fixed set of strings.
    Choice(Vec<String>),
    /// Accepted as supplied (the default).
    #[default]
    Any,
}

impl ValueType {
    /// Returns the canonical type name rendered in signatures and help text.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "str",
            Self::Integer => "int",
            Self::Float => "float",
            Self::Choice(_) => "choice",
            Self::Any => "any",
        }
    }
}

/// Declared type of a field or callable parameter.
///
/// # Examples
///
/// ```
/// use argflat_core::{FieldType, ValueType};
///
/// let age = FieldType::Primitive(ValueType::Integer);
/// assert_eq!(age.canonical_name(), "int");
///
/// let email = FieldType::Optional(ValueType::String);
/// assert_eq!(email.canonical_name(), "Optional[str]");
///
/// let hair = FieldType::Record("Hair".into());
/// assert_eq!(hair.record_name(), Some("Hair"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// A primitive leaf.
    Primitive(ValueType),
    /// A primitive leaf that may hold `null`.
    Optional(ValueType),
    /// A reference, by name, to a [`RecordDefinition`].
    Record(String),
}

impl FieldType {
    /// Returns the referenced record name for structured types.
    pub fn record_name(&self) -> Option<&str> {
        match self {
            Self::Record(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Returns the primitive value type for leaf types.
    pub fn value_type(&self) -> Option<&ValueType> {
        match self {
            Self::Primitive(vt) | Self::Optional(vt) => Some(vt),
            Self::Record(_) => None,
        }
    }

    /// Returns `true` if the type accepts `null`.
    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Returns the canonical type name (`int`, `Optional[int]`, `Hair`).
    pub fn canonical_name(&self) -> String {
        match self {
            Self::Primitive(vt) => vt.canonical_name().to_string(),
            Self::Optional(vt) => format!("Optional[{}]", vt.canonical_name()),
            Self::Record(name) => name.clone(),
        }
    }
}

fn default_required() -> bool {
    true
}

/// A field declared on a record, or a parameter declared on a callable.
///
/// Fields are required unless they carry a default or are created with
/// [`optional`](FieldDescriptor::optional).
///
/// # Examples
///
/// ```
/// use argflat_core::{FieldDescriptor, FieldType, ValueType};
///
/// let pet = FieldDescriptor::required("pet", FieldType::Primitive(ValueType::String))
///     .with_default("dog")
///     .with_description("The person's pet.");
/// assert!(!pet.required);
/// assert_eq!(pet.default, Some(serde_json::json!("dog")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name, unique within its record.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether a value must be supplied.
    #[serde(default = "default_required")]
    pub required: bool,
    /// Default used when the field is not required and no value is supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Record this field is declared on (`None` for callable parameters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owning_record: Option<String>,
}

impl FieldDescriptor {
    /// Creates a required field with no default.
    pub fn required(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            required: true,
            default: None,
            description: None,
            owning_record: None,
        }
    }

    /// Creates a field that defaults to `null` when absent.
    pub fn optional(name: &str, field_type: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(name, field_type)
        }
    }

    /// Creates a required parameter typed as a record.
    pub fn record(name: &str, record: &str) -> Self {
        Self::required(name, FieldType::Record(record.to_string()))
    }

    /// Sets a concrete default, making the field optional.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.required = false;
        self.default = Some(value.into());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Returns `true` if the field's type references a record.
    pub fn is_structured(&self) -> bool {
        self.field_type.record_name().is_some()
    }
}

/// A structured record: a named, ordered set of fields.
///
/// Field order is significant and preserved through flattening.
///
/// # Examples
///
/// ```
/// use argflat_core::{FieldDescriptor, FieldType, RecordDefinition, ValueType};
///
/// let alpha = RecordDefinition::new("Alpha")
///     .with_field(FieldDescriptor::required("a", FieldType::Primitive(ValueType::Integer)));
///
/// assert_eq!(alpha.fields.len(), 1);
/// assert_eq!(alpha.field("a").unwrap().owning_record.as_deref(), Some("Alpha"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDefinition {
    /// Record type name.
    pub name: String,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered fields.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl RecordDefinition {
    /// Creates an empty record definition.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Appends a field, stamping it with this record as its owner.
    pub fn with_field(mut self, mut field: FieldDescriptor) -> Self {
        field.owning_record = Some(self.name.clone());
        self.fields.push(field);
        self
    }

    /// Finds a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A callable's declared parameter list: the flattening root.
///
/// # Examples
///
/// ```
/// use argflat_core::{CallableSpec, FieldDescriptor, FieldType, ValueType};
///
/// let spec = CallableSpec::new("get_person")
///     .with_doc("Get a person's information.")
///     .with_param(FieldDescriptor::record("person", "Person"))
///     .with_param(FieldDescriptor::required("thing", FieldType::Primitive(ValueType::String)));
///
/// assert_eq!(spec.structured_params().count(), 1);
/// assert_eq!(spec.param("thing").unwrap().field_type.canonical_name(), "str");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallableSpec {
    /// Callable name (also the generated command name).
    pub name: String,
    /// Documentation text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Declared parameters, in order.
    #[serde(default)]
    pub parameters: Vec<FieldDescriptor>,
}

impl CallableSpec {
    /// Creates a callable with no parameters.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Sets the documentation text.
    pub fn with_doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_string());
        self
    }

    /// Appends a parameter.
    pub fn with_param(mut self, param: FieldDescriptor) -> Self {
        self.parameters.push(param);
        self
    }

    /// Finds a parameter by name.
    pub fn param(&self, name: &str) -> Option<&FieldDescriptor> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Iterates over parameters typed as records.
    pub fn structured_params(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.parameters.iter().filter(|p| p.is_structured())
    }
}

/// Three-way default classification of a leaf.
///
/// Collapsing this into required/optional would lose the distinction between
/// a nullable leaf (rendered with a `None` placeholder) and a leaf that must
/// be supplied or prompted for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum DefaultKind {
    /// No default: the front-end must supply a value or prompt for one.
    Required,
    /// Defaults to the absence sentinel (`null`).
    Absent,
    /// Concrete default value.
    Value(Value),
}

impl DefaultKind {
    /// Returns `true` unless the leaf is [`Required`](DefaultKind::Required).
    pub fn has_default(&self) -> bool {
        !matches!(self, Self::Required)
    }

    /// Returns the value used when nothing is supplied.
    pub fn default_value(&self) -> Option<Value> {
        match self {
            Self::Required => None,
            Self::Absent => Some(Value::Null),
            Self::Value(v) => Some(v.clone()),
        }
    }

    /// Splits into `(has_default, default_value, is_optional_none)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use argflat_core::DefaultKind;
    ///
    /// assert_eq!(DefaultKind::Required.as_parts(), (false, None, false));
    /// assert_eq!(DefaultKind::Absent.as_parts(), (true, None, true));
    /// ```
    pub fn as_parts(&self) -> (bool, Option<&Value>, bool) {
        match self {
            Self::Required => (false, None, false),
            Self::Absent => (true, None, true),
            Self::Value(v) => (true, Some(v), false),
        }
    }
}

/// One leaf of a [`FlatSignature`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatParameter {
    /// Leaf name; doubles as the flag name and the flat argument key.
    pub name: String,
    /// Primitive type used for argument-string coercion.
    pub value_type: ValueType,
    /// Canonical declared type name.
    pub type_name: String,
    /// Default classification.
    pub default: DefaultKind,
    /// Help text taken from the field description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Dot-joined ancestor record chain, furthest ancestor first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel: Option<String>,
    /// Dotted path from the callable parameter down to this leaf.
    pub path: String,
    /// Whether the front-end should prompt when the value is missing.
    #[serde(default)]
    pub prompt: bool,
}

/// The flat-facing signature of a wrapped callable.
///
/// Leaves without a default always precede leaves with one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatSignature {
    /// Name of the wrapped callable.
    pub callable: String,
    /// Documentation extended with the accepted leaf names.
    pub doc: String,
    /// Ordered leaves.
    pub parameters: Vec<FlatParameter>,
}

impl FlatSignature {
    /// Finds a leaf by name.
    pub fn get(&self, name: &str) -> Option<&FlatParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Leaf names in signature order.
    pub fn names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    /// Leaves that have no default.
    pub fn required(&self) -> impl Iterator<Item = &FlatParameter> {
        self.parameters.iter().filter(|p| !p.default.has_default())
    }

    /// Leaves that have a default.
    pub fn defaulted(&self) -> impl Iterator<Item = &FlatParameter> {
        self.parameters.iter().filter(|p| p.default.has_default())
    }

    /// Groups leaves by panel, in order of first appearance.
    ///
    /// Plain callable parameters are grouped under `None`.
    pub fn panels(&self) -> Vec<(Option<&str>, Vec<&FlatParameter>)> {
        let mut groups: Vec<(Option<&str>, Vec<&FlatParameter>)> = Vec::new();
        for param in &self.parameters {
            let panel = param.panel.as_deref();
            match groups.iter_mut().find(|(p, _)| *p == panel) {
                Some((_, members)) => members.push(param),
                None => groups.push((panel, vec![param])),
            }
        }
        groups
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns `true` if the signature has no leaves.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}
