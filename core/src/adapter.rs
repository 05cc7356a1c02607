//! Call adapter binding the flattener and the reconstructor around a
//! callable.
//!
//! A [`CallAdapter`] owns the callable's [`FlatSignature`], computed once at
//! construction. Callers only ever deal with the flat surface: they pass
//! flat arguments and receive the callable's result unchanged.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use argflat_core::*;
//! use serde_json::json;
//!
//! let registry: SchemaRegistry = [RecordDefinition::new("Alpha")
//!     .with_field(FieldDescriptor::required("a", FieldType::Primitive(ValueType::Integer)))]
//!     .into_iter()
//!     .collect();
//! let spec = CallableSpec::new("get_alpha")
//!     .with_doc("Return the alpha.")
//!     .with_param(FieldDescriptor::record("alpha", "Alpha"));
//!
//! let adapter = CallAdapter::new(spec, Arc::new(registry), &FlattenOptions::default(), |args| {
//!     args.value("alpha").cloned()
//! })
//! .unwrap();
//!
//! assert_eq!(adapter.signature().names(), vec!["a"]);
//! assert!(adapter.doc().ends_with("Also accepts a in place of alpha."));
//! assert_eq!(adapter.call_with([("a", json!(1))]).unwrap(), Some(json!({"a": 1})));
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::{ReconstructionError, SchemaError};
use crate::flatten::{FlattenOptions, flatten};
use crate::reconstruct::{ReconstructedArguments, reconstruct};
use crate::schema::SchemaRegistry;
use crate::types::{CallableSpec, FlatArguments, FlatSignature};

/// A callable wrapped behind its flat signature.
///
/// The signature is immutable after construction, so an adapter around a
/// `Sync` callable can be shared across threads and called concurrently.
pub struct CallAdapter<F> {
    spec: CallableSpec,
    registry: Arc<SchemaRegistry>,
    signature: FlatSignature,
    callable: F,
}

impl<F> CallAdapter<F> {
    /// Flattens `spec` and wraps `callable`.
    ///
    /// # Errors
    ///
    /// Returns the flattener's [`SchemaError`]; no adapter is built for a
    /// malformed schema.
    pub fn new<R>(
        spec: CallableSpec,
        registry: Arc<SchemaRegistry>,
        options: &FlattenOptions,
        callable: F,
    ) -> Result<Self, SchemaError>
    where
        F: Fn(ReconstructedArguments) -> R,
    {
        let signature = flatten(&spec, &registry, options)?;
        debug!(
            callable = %spec.name,
            leaves = signature.len(),
            "Built call adapter"
        );
        Ok(Self {
            spec,
            registry,
            signature,
            callable,
        })
    }

    /// Name of the wrapped callable.
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// The original parameter list.
    pub fn spec(&self) -> &CallableSpec {
        &self.spec
    }

    /// The flat-facing signature.
    pub fn signature(&self) -> &FlatSignature {
        &self.signature
    }

    /// Documentation extended with the accepted leaf names.
    pub fn doc(&self) -> &str {
        &self.signature.doc
    }

    /// The registry records are resolved against.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Rebuilds the real arguments from `flat` without invoking the callable.
    ///
    /// # Errors
    ///
    /// See [`reconstruct`].
    pub fn reconstruct(
        &self,
        flat: &FlatArguments,
    ) -> Result<ReconstructedArguments, ReconstructionError> {
        reconstruct(&self.spec, &self.registry, flat)
    }

    /// Reconstructs the arguments from `flat` and invokes the callable.
    ///
    /// # Errors
    ///
    /// Returns the [`ReconstructionError`] for this call; the callable is not
    /// invoked in that case.
    pub fn call<R>(&self, flat: &FlatArguments) -> Result<R, ReconstructionError>
    where
        F: Fn(ReconstructedArguments) -> R,
    {
        let args = self.reconstruct(flat)?;
        Ok((self.callable)(args))
    }

    /// Keyword-style convenience over [`call`](Self::call).
    pub fn call_with<R, I, K>(&self, args: I) -> Result<R, ReconstructionError>
    where
        F: Fn(ReconstructedArguments) -> R,
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let flat: FlatArguments = args.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.call(&flat)
    }
}

impl<F> fmt::Debug for CallAdapter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallAdapter")
            .field("spec", &self.spec)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}
