//! Type-graph walking shared by the flattener and the reconstructor.
//!
//! Both sides go through [`TypeGraph`] so they see one consistent view of
//! which types are structured and in what order their fields appear.

use std::collections::HashSet;

use tracing::debug;

use crate::error::SchemaError;
use crate::schema::SchemaRegistry;
use crate::types::{DefaultKind, FieldDescriptor, FieldType};

/// Read-only view over the records of a [`SchemaRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct TypeGraph<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> TypeGraph<'a> {
    /// Creates a walker over `registry`.
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Returns the underlying registry.
    pub fn registry(&self) -> &'a SchemaRegistry {
        self.registry
    }

    /// Returns `true` if `ty` references a record, registered or not.
    ///
    /// Dangling references count as structured so that expanding them
    /// fails in [`fields_of`] with [`SchemaError::UnknownRecord`].
    ///
    /// [`fields_of`]: TypeGraph::fields_of
    pub fn is_structured(&self, ty: &FieldType) -> bool {
        ty.record_name().is_some()
    }

    /// Returns the ordered fields of the record referenced by `ty`.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::NotStructured`] if `ty` is a primitive.
    /// - [`SchemaError::UnknownRecord`] if the record is not registered.
    /// - [`SchemaError::EmptyRecord`] if the record declares no fields.
    pub fn fields_of(&self, ty: &FieldType) -> Result<&'a [FieldDescriptor], SchemaError> {
        let name = ty
            .record_name()
            .ok_or_else(|| SchemaError::NotStructured(ty.canonical_name()))?;
        let record = self
            .registry
            .get(name)
            .ok_or_else(|| SchemaError::UnknownRecord(name.to_string()))?;
        if record.fields.is_empty() {
            return Err(SchemaError::EmptyRecord(name.to_string()));
        }
        Ok(&record.fields)
    }

    /// Classifies a field's default.
    ///
    /// # Examples
    ///
    /// ```
    /// use argflat_core::*;
    ///
    /// let registry = SchemaRegistry::new();
    /// let graph = TypeGraph::new(&registry);
    /// let ty = FieldType::Primitive(ValueType::String);
    ///
    /// let name = FieldDescriptor::required("name", ty.clone());
    /// let email = FieldDescriptor::optional("email", ty.clone());
    /// let pet = FieldDescriptor::required("pet", ty).with_default("dog");
    ///
    /// assert_eq!(graph.describe_default(&name), DefaultKind::Required);
    /// assert_eq!(graph.describe_default(&email), DefaultKind::Absent);
    /// assert_eq!(graph.describe_default(&pet), DefaultKind::Value("dog".into()));
    /// ```
    pub fn describe_default(&self, field: &FieldDescriptor) -> DefaultKind {
        if field.required {
            return DefaultKind::Required;
        }
        match &field.default {
            None | Some(serde_json::Value::Null) => DefaultKind::Absent,
            Some(value) => DefaultKind::Value(value.clone()),
        }
    }

    /// Counts the distinct registered records reachable from `roots`.
    ///
    /// Terminates on cyclic graphs. A legitimate acyclic schema expands at
    /// most this many times.
    pub fn reachable_records(&self, roots: &[FieldDescriptor]) -> usize {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = roots
            .iter()
            .filter_map(|f| f.field_type.record_name())
            .collect();

        while let Some(name) = stack.pop() {
            let Some(record) = self.registry.get(name) else {
                continue;
            };
            if !seen.insert(record.name.as_str()) {
                continue;
            }
            stack.extend(
                record
                    .fields
                    .iter()
                    .filter_map(|f| f.field_type.record_name()),
            );
        }

        seen.len()
    }

    /// Fails if `record` reaches itself through its fields.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Cycle`] naming the chain, e.g. `A -> B -> A`.
    pub fn check_acyclic(&self, record: &str) -> Result<(), SchemaError> {
        let Some(root) = self.registry.get(record) else {
            return Ok(());
        };
        let mut path = Vec::new();
        let mut done = HashSet::new();
        self.visit(root.name.as_str(), &mut path, &mut done)
    }

    fn visit(
        &self,
        name: &'a str,
        path: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Result<(), SchemaError> {
        if path.contains(&name) {
            let cycle = path
                .iter()
                .copied()
                .chain(std::iter::once(name))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(SchemaError::Cycle(cycle));
        }
        if done.contains(name) {
            return Ok(());
        }
        let Some(record) = self.registry.get(name) else {
            return Ok(());
        };

        debug!(record = name, depth = path.len(), "Walking record");
        path.push(name);
        for field in &record.fields {
            if let Some(child) = field.field_type.record_name() {
                self.visit(child, path, done)?;
            }
        }
        path.pop();
        done.insert(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{RecordDefinition, ValueType};

    use super::*;

    fn int(name: &str) -> FieldDescriptor {
        FieldDescriptor::required(name, FieldType::Primitive(ValueType::Integer))
    }

    fn hair_registry() -> SchemaRegistry {
        [
            RecordDefinition::new("Alpha").with_field(int("a")),
            RecordDefinition::new("Color")
                .with_field(int("r"))
                .with_field(FieldDescriptor::record("alpha", "Alpha")),
            RecordDefinition::new("Hair")
                .with_field(FieldDescriptor::record("color", "Color"))
                .with_field(int("length")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_fields_of_preserves_order() {
        let registry = hair_registry();
        let graph = TypeGraph::new(&registry);
        let fields = graph
            .fields_of(&FieldType::Record("Hair".to_string()))
            .unwrap();
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["color", "length"]);
    }

    #[test]
    fn test_fields_of_rejects_primitive_and_unknown() {
        let registry = hair_registry();
        let graph = TypeGraph::new(&registry);
        assert_eq!(
            graph.fields_of(&FieldType::Primitive(ValueType::Integer)),
            Err(SchemaError::NotStructured("int".to_string()))
        );
        assert_eq!(
            graph.fields_of(&FieldType::Record("Nope".to_string())),
            Err(SchemaError::UnknownRecord("Nope".to_string()))
        );
    }

    #[test]
    fn test_dangling_reference_is_structured_but_unresolvable() {
        let registry = hair_registry();
        let graph = TypeGraph::new(&registry);
        let dangling = FieldType::Record("Nope".to_string());

        assert!(graph.is_structured(&dangling));
        assert!(graph.is_structured(&FieldType::Record("Hair".to_string())));
        assert!(!graph.is_structured(&FieldType::Optional(ValueType::String)));
        assert_eq!(
            graph.fields_of(&dangling),
            Err(SchemaError::UnknownRecord("Nope".to_string()))
        );
    }

    #[test]
    fn test_fields_of_rejects_empty_record() {
        let registry: SchemaRegistry = [RecordDefinition::new("Empty")].into_iter().collect();
        let graph = TypeGraph::new(&registry);
        assert_eq!(
            graph.fields_of(&FieldType::Record("Empty".to_string())),
            Err(SchemaError::EmptyRecord("Empty".to_string()))
        );
    }

    #[test]
    fn test_reachable_records_counts_distinct() {
        let registry = hair_registry();
        let graph = TypeGraph::new(&registry);
        let roots = vec![
            FieldDescriptor::record("hair", "Hair"),
            FieldDescriptor::record("color", "Color"),
        ];
        assert_eq!(graph.reachable_records(&roots), 3);
    }

    #[test]
    fn test_check_acyclic_reports_chain() {
        let registry: SchemaRegistry = [
            RecordDefinition::new("A").with_field(FieldDescriptor::record("b", "B")),
            RecordDefinition::new("B").with_field(FieldDescriptor::record("a", "A")),
        ]
        .into_iter()
        .collect();
        let graph = TypeGraph::new(&registry);
        assert_eq!(graph.reachable_records(&[FieldDescriptor::record("x", "A")]), 2);
        assert_eq!(
            graph.check_acyclic("A"),
            Err(SchemaError::Cycle("A -> B -> A".to_string()))
        );
        assert!(TypeGraph::new(&hair_registry()).check_acyclic("Hair").is_ok());
    }
}
