//! Registry and bundle validation.
//!
//! Checks the structural invariants the flattener relies on (non-empty
//! names, unique fields, resolvable record references, no empty records, no
//! cycles) before any callable is wrapped.
//!
//! # Examples
//!
//! ```
//! use argflat_core::*;
//!
//! let mut registry = SchemaRegistry::new();
//! registry.insert(RecordDefinition::new("Alpha")
//!     .with_field(FieldDescriptor::required("a", FieldType::Primitive(ValueType::Integer))));
//! assert!(validate_registry(&registry).is_empty());
//!
//! // Invalid: a field references a record that does not exist
//! registry.insert(RecordDefinition::new("Color")
//!     .with_field(FieldDescriptor::record("alpha", "Alfa")));
//! assert_eq!(
//!     validate_registry(&registry),
//!     vec![SchemaError::UnknownRecord("Alfa".into())]
//! );
//! ```

use std::collections::HashSet;

use crate::error::SchemaError;
use crate::schema::SchemaRegistry;
use crate::types::{CallableSpec, FieldDescriptor};
use crate::walk::TypeGraph;
use crate::SchemaBundle;

/// Validates a full schema bundle.
///
/// Checks for an empty version string, duplicate record names, then the
/// registry built from the records, then every command.
///
/// # Examples
///
/// ```
/// use argflat_core::*;
///
/// let mut bundle = SchemaBundle::new("1.0.0");
/// bundle.commands.push(CallableSpec::new("noop"));
/// assert!(validate_bundle(&bundle).is_empty());
///
/// // Duplicate command → error
/// bundle.commands.push(CallableSpec::new("noop"));
/// let errors = validate_bundle(&bundle);
/// assert!(errors.iter().any(|e| matches!(e, SchemaError::DuplicateCommand(_))));
/// ```
pub fn validate_bundle(bundle: &SchemaBundle) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    if bundle.version.trim().is_empty() {
        errors.push(SchemaError::EmptyBundleVersion);
        return errors;
    }

    let mut seen_records: HashSet<&str> = HashSet::new();
    for record in &bundle.records {
        if !seen_records.insert(record.name.as_str()) {
            errors.push(SchemaError::DuplicateRecord(record.name.clone()));
            return errors;
        }
    }

    let registry = bundle.registry();
    errors.extend(validate_registry(&registry));
    if !errors.is_empty() {
        return errors;
    }

    let mut seen_commands: HashSet<&str> = HashSet::new();
    for command in &bundle.commands {
        let name = command.name.trim();
        if name.is_empty() {
            errors.push(SchemaError::EmptyCommandName);
            return errors;
        }
        if !seen_commands.insert(name) {
            errors.push(SchemaError::DuplicateCommand(name.to_string()));
            return errors;
        }
        errors.extend(validate_callable(command, &registry));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

/// Validates every record in a registry.
///
/// Stops at the first problem found, like the flattener would.
pub fn validate_registry(registry: &SchemaRegistry) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let graph = TypeGraph::new(registry);

    for record in registry.records() {
        if record.name.trim().is_empty() {
            errors.push(SchemaError::EmptyRecordName);
            return errors;
        }
        if record.fields.is_empty() {
            errors.push(SchemaError::EmptyRecord(record.name.clone()));
            return errors;
        }

        errors.extend(validate_fields(&record.name, &record.fields, registry));
        if !errors.is_empty() {
            return errors;
        }
    }

    for record in registry.records() {
        if let Err(err) = graph.check_acyclic(&record.name) {
            errors.push(err);
            return errors;
        }
    }

    errors
}

/// Validates a callable's parameter list against a registry.
pub fn validate_callable(spec: &CallableSpec, registry: &SchemaRegistry) -> Vec<SchemaError> {
    validate_fields(&spec.name, &spec.parameters, registry)
}

fn validate_fields(
    scope: &str,
    fields: &[FieldDescriptor],
    registry: &SchemaRegistry,
) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for field in fields {
        let name = field.name.trim();
        if name.is_empty() {
            errors.push(SchemaError::EmptyFieldName(scope.to_string()));
            return errors;
        }
        if !seen.insert(name) {
            errors.push(SchemaError::DuplicateField {
                record: scope.to_string(),
                field: name.to_string(),
            });
            return errors;
        }
        if let Some(child) = field.field_type.record_name() {
            if !registry.contains(child) {
                errors.push(SchemaError::UnknownRecord(child.to_string()));
                return errors;
            }
        }
    }

    errors
}
