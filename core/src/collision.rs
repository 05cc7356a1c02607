//! Leaf-name collision handling.
//!
//! Two distinct substructures may declare leaves with the same name (for
//! example `Person.name` and `Pet.name`). Both would bind to the same flag,
//! so [`resolve_collisions`] applies a [`CollisionPolicy`] to decide what the
//! flat signature exposes.
//!
//! # Example
//!
//! ```
//! use argflat_core::*;
//!
//! let mut registry = SchemaRegistry::new();
//! registry.insert(RecordDefinition::new("Person")
//!     .with_field(FieldDescriptor::required("name", FieldType::Primitive(ValueType::String))));
//! registry.insert(RecordDefinition::new("Pet")
//!     .with_field(FieldDescriptor::required("name", FieldType::Primitive(ValueType::String))));
//!
//! let spec = CallableSpec::new("adopt")
//!     .with_param(FieldDescriptor::record("owner", "Person"))
//!     .with_param(FieldDescriptor::record("pet", "Pet"));
//!
//! let strict = FlattenOptions::default();
//! assert!(matches!(
//!     flatten(&spec, &registry, &strict),
//!     Err(SchemaError::DuplicateLeaf { .. })
//! ));
//!
//! let lenient = FlattenOptions { collision: CollisionPolicy::LastWins, ..Default::default() };
//! let signature = flatten(&spec, &registry, &lenient).unwrap();
//! assert_eq!(signature.get("name").unwrap().path, "pet.name");
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SchemaError;
use crate::types::{DefaultKind, FlatParameter};

/// What to do when two leaves flatten to the same name.
///
/// Whatever the policy, reconstruction feeds every leaf with that name from
/// the same flat argument; the policy only decides which descriptor (type,
/// help, panel) the signature shows. If any of the colliding leaves is
/// required, the kept descriptor is made required too, so the shared flag is
/// enforced (or prompted for) whenever one of its leaves needs a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Fail at flatten time with [`SchemaError::DuplicateLeaf`] (the default).
    #[default]
    Reject,
    /// Keep the first descriptor encountered.
    FirstWins,
    /// Keep the last descriptor encountered, at the first one's position.
    LastWins,
}

/// Deduplicates leaves by name according to `policy`.
///
/// Order of first appearance is preserved.
///
/// # Errors
///
/// Returns [`SchemaError::DuplicateLeaf`] under [`CollisionPolicy::Reject`].
pub fn resolve_collisions(
    leaves: Vec<FlatParameter>,
    policy: CollisionPolicy,
) -> Result<Vec<FlatParameter>, SchemaError> {
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut resolved: Vec<FlatParameter> = Vec::with_capacity(leaves.len());

    for leaf in leaves {
        let Some(&idx) = by_name.get(&leaf.name) else {
            by_name.insert(leaf.name.clone(), resolved.len());
            resolved.push(leaf);
            continue;
        };

        let existing = &resolved[idx];
        warn!(
            leaf = %leaf.name,
            first = %existing.path,
            second = %leaf.path,
            policy = ?policy,
            "Leaf name collision"
        );

        match policy {
            CollisionPolicy::Reject => {
                return Err(SchemaError::DuplicateLeaf {
                    name: leaf.name,
                    first: existing.path.clone(),
                    second: leaf.path,
                });
            }
            CollisionPolicy::FirstWins => tighten(&mut resolved[idx], &leaf),
            CollisionPolicy::LastWins => {
                let dropped = std::mem::replace(&mut resolved[idx], leaf);
                tighten(&mut resolved[idx], &dropped);
            }
        }
    }

    Ok(resolved)
}

fn tighten(kept: &mut FlatParameter, dropped: &FlatParameter) {
    if matches!(dropped.default, DefaultKind::Required) {
        kept.default = DefaultKind::Required;
        kept.prompt |= dropped.prompt;
    }
}
