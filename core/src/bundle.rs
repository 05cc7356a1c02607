use serde::{Deserialize, Serialize};

use crate::schema::SchemaRegistry;
use crate::types::{CallableSpec, RecordDefinition};

/// Serializable bundle of record definitions and the callables that use
/// them.
///
/// Bundles are the on-disk form consumed by the `argflat` binary, authored
/// as JSON or YAML.
///
/// # Examples
///
/// ```
/// use argflat_core::*;
///
/// let mut bundle = SchemaBundle::new("1.0.0");
/// bundle.name = Some("people".into());
/// bundle.records.push(
///     RecordDefinition::new("Alpha")
///         .with_field(FieldDescriptor::required("a", FieldType::Primitive(ValueType::Integer))),
/// );
/// bundle.commands.push(
///     CallableSpec::new("get_alpha").with_param(FieldDescriptor::record("alpha", "Alpha")),
/// );
///
/// assert_eq!(bundle.record_count(), 1);
/// assert!(bundle.command("get_alpha").is_some());
/// assert!(bundle.registry().contains("Alpha"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaBundle {
    /// Schema contract version (populated from
    /// [`SCHEMA_CONTRACT_VERSION`](crate::SCHEMA_CONTRACT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Bundle format version (semver string).
    pub version: String,
    /// Optional bundle name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Optional bundle description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Record definitions, in declaration order.
    #[serde(default)]
    pub records: Vec<RecordDefinition>,
    /// Callables whose parameters reference the records.
    #[serde(default)]
    pub commands: Vec<CallableSpec>,
}

impl SchemaBundle {
    /// Creates an empty bundle.
    ///
    /// The `schema_version` is automatically set from
    /// [`SCHEMA_CONTRACT_VERSION`](crate::SCHEMA_CONTRACT_VERSION).
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            schema_version: Some(crate::SCHEMA_CONTRACT_VERSION.to_string()),
            version: version.into(),
            name: None,
            description: None,
            records: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Builds a registry from the bundle's records.
    ///
    /// Record fields are stamped with their owning record, which hand-written
    /// bundles usually leave out.
    pub fn registry(&self) -> SchemaRegistry {
        self.records
            .iter()
            .map(|record| {
                let mut record = record.clone();
                for field in &mut record.fields {
                    field.owning_record = Some(record.name.clone());
                }
                record
            })
            .collect()
    }

    /// Finds a command by name.
    pub fn command(&self, name: &str) -> Option<&CallableSpec> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Returns the number of records in this bundle.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}
