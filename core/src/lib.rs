//! Flattening of structured callable parameters into leaf arguments, and
//! reconstruction of the real arguments from them.
//!
//! This crate turns a callable whose parameters are nested records into a
//! flat command-line surface, and back:
//!
//! - [`SchemaRegistry`]: the record definitions a callable refers to, plus
//!   coercion and construction of record values.
//! - [`TypeGraph`]: read-only walks over the registry (structured checks,
//!   default descriptions, cycle detection).
//! - [`flatten`]: expands every structured parameter into its primitive
//!   leaves, producing a [`FlatSignature`].
//! - [`reconstruct`]: rebuilds nested record values from flat arguments.
//! - [`CallAdapter`]: binds both around a callable.
//! - [`SchemaBundle`]: a versioned, serializable set of records and
//!   callables.
//!
//! Validation ([`validate_registry`], [`validate_bundle`]) catches empty
//! names, duplicate fields, unknown record references and cycles.
//!
//! With the `clap` feature (on by default), [`frontend`] renders a
//! [`FlatSignature`] as a `clap::Command`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use argflat_core::*;
//! use serde_json::json;
//!
//! let registry: SchemaRegistry = [
//!     RecordDefinition::new("Alpha")
//!         .with_field(FieldDescriptor::required("a", FieldType::Primitive(ValueType::Integer))),
//!     RecordDefinition::new("Color")
//!         .with_field(FieldDescriptor::required("r", FieldType::Primitive(ValueType::Integer)))
//!         .with_field(FieldDescriptor::record("alpha", "Alpha")),
//! ]
//! .into_iter()
//! .collect();
//! assert!(validate_registry(&registry).is_empty());
//!
//! let spec = CallableSpec::new("paint").with_param(FieldDescriptor::record("color", "Color"));
//! let adapter = CallAdapter::new(spec, Arc::new(registry), &FlattenOptions::default(), |args| {
//!     args.value("color").cloned()
//! })
//! .unwrap();
//!
//! assert_eq!(adapter.signature().names(), vec!["r", "a"]);
//! let color = adapter.call_with([("r", json!("10")), ("a", json!(1))]).unwrap();
//! assert_eq!(color, Some(json!({"r": 10, "alpha": {"a": 1}})));
//!
//! let matches = frontend::build_command(adapter.signature())
//!     .try_get_matches_from(["paint", "--r", "1", "--a", "2"])
//!     .unwrap();
//! let flat = frontend::matches_to_flat(adapter.signature(), &matches);
//! assert_eq!(adapter.call(&flat).unwrap(), Some(json!({"r": 1, "alpha": {"a": 2}})));
//! ```

mod adapter;
mod bundle;
mod collision;
mod error;
mod flatten;
mod reconstruct;
mod schema;
mod types;
mod validate;
mod walk;

#[cfg(feature = "clap")]
pub mod frontend;

pub use adapter::CallAdapter;
pub use bundle::SchemaBundle;
pub use collision::{CollisionPolicy, resolve_collisions};
pub use error::{ReconstructionError, SchemaError, ValidationError};
pub use flatten::{FlattenOptions, RESERVED_LEAF_NAMES, flatten, flatten_instance};
pub use reconstruct::{ReconstructedArguments, reconstruct};
pub use schema::{SchemaRegistry, Structured};
pub use types::*;
pub use validate::{validate_bundle, validate_callable, validate_registry};
pub use walk::TypeGraph;
