//! Schema flattening.
//!
//! [`flatten`] turns a [`CallableSpec`] whose parameters may be typed as
//! nested records into a [`FlatSignature`] of leaf parameters, each annotated
//! with the panel (ancestor record chain) it came from.
//!
//! # Example
//!
//! ```
//! use argflat_core::*;
//!
//! let int = |name| FieldDescriptor::required(name, FieldType::Primitive(ValueType::Integer));
//! let registry: SchemaRegistry = [
//!     RecordDefinition::new("Alpha").with_field(int("a")),
//!     RecordDefinition::new("Color")
//!         .with_field(int("r"))
//!         .with_field(int("g"))
//!         .with_field(int("b"))
//!         .with_field(FieldDescriptor::record("alpha", "Alpha")),
//!     RecordDefinition::new("Hair")
//!         .with_field(FieldDescriptor::record("color", "Color"))
//!         .with_field(int("length")),
//! ]
//! .into_iter()
//! .collect();
//!
//! let spec = CallableSpec::new("get").with_param(FieldDescriptor::record("hair", "Hair"));
//! let signature = flatten(&spec, &registry, &FlattenOptions::default()).unwrap();
//!
//! assert_eq!(signature.names(), vec!["r", "g", "b", "a", "length"]);
//! assert_eq!(signature.get("a").unwrap().panel.as_deref(), Some("Hair.Color.Alpha"));
//! assert_eq!(signature.get("a").unwrap().path, "hair.color.alpha.a");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::collision::{CollisionPolicy, resolve_collisions};
use crate::error::SchemaError;
use crate::schema::SchemaRegistry;
use crate::types::{
    CallableSpec, DefaultKind, FieldDescriptor, FlatArguments, FlatParameter, FlatSignature,
};
use crate::walk::TypeGraph;

/// Leaf names that would shadow the flags a command line provides itself.
pub const RESERVED_LEAF_NAMES: &[&str] = &["help", "version"];

/// Knobs for [`flatten`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenOptions {
    /// How duplicate leaf names are handled.
    pub collision: CollisionPolicy,
    /// Mark leaves without a default as prompt-on-missing instead of
    /// mandatory flags.
    pub prompt_required: bool,
    /// Append the accepted leaf names to the callable's doc.
    pub document_leaves: bool,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            collision: CollisionPolicy::Reject,
            prompt_required: false,
            document_leaves: true,
        }
    }
}

/// An entry of the working list: a field plus where it came from.
struct Pending<'a> {
    field: &'a FieldDescriptor,
    path: Vec<&'a str>,
    chain: Vec<&'a str>,
}

/// Flattens the parameters of `spec` into a [`FlatSignature`].
///
/// Structured entries are expanded in place, round after round, until only
/// leaves remain. Leaves without a default are then moved ahead of leaves
/// with one, each group keeping its relative order.
///
/// # Errors
///
/// - [`SchemaError::Cycle`] if a record reaches itself.
/// - [`SchemaError::UnknownRecord`] / [`SchemaError::EmptyRecord`] from the
///   walker.
/// - [`SchemaError::DuplicateLeaf`] under [`CollisionPolicy::Reject`].
/// - [`SchemaError::ReservedLeaf`] if a leaf is named like one of
///   [`RESERVED_LEAF_NAMES`].
pub fn flatten(
    spec: &CallableSpec,
    registry: &SchemaRegistry,
    options: &FlattenOptions,
) -> Result<FlatSignature, SchemaError> {
    let graph = TypeGraph::new(registry);
    let bound = graph.reachable_records(&spec.parameters);

    let mut working: Vec<Pending<'_>> = spec
        .parameters
        .iter()
        .map(|param| Pending {
            field: param,
            path: vec![param.name.as_str()],
            chain: Vec::new(),
        })
        .collect();

    let mut rounds = 0;
    while working.iter().any(|p| graph.is_structured(&p.field.field_type)) {
        if rounds > bound {
            let stuck = working
                .iter()
                .find(|p| graph.is_structured(&p.field.field_type))
                .map(|p| p.path.join("."))
                .unwrap_or_default();
            return Err(SchemaError::Cycle(format!(
                "expansion of {stuck} did not terminate after {bound} rounds"
            )));
        }
        rounds += 1;
        working = expand_round(&graph, working)?;
    }

    debug!(
        callable = %spec.name,
        rounds,
        leaves = working.len(),
        "Flattened parameters"
    );

    let leaves = working
        .iter()
        .map(|pending| synthesize(&graph, pending, options))
        .collect();
    let leaves = resolve_collisions(leaves, options.collision)?;
    if let Some(leaf) = leaves
        .iter()
        .find(|leaf| RESERVED_LEAF_NAMES.contains(&leaf.name.as_str()))
    {
        return Err(SchemaError::ReservedLeaf {
            name: leaf.name.clone(),
            path: leaf.path.clone(),
        });
    }

    let (mut parameters, defaulted): (Vec<_>, Vec<_>) = leaves
        .into_iter()
        .partition(|leaf| !leaf.default.has_default());
    parameters.extend(defaulted);

    let doc = extended_doc(spec, &parameters, options);
    Ok(FlatSignature {
        callable: spec.name.clone(),
        doc,
        parameters,
    })
}

fn expand_round<'a>(
    graph: &TypeGraph<'a>,
    working: Vec<Pending<'a>>,
) -> Result<Vec<Pending<'a>>, SchemaError> {
    let mut next = Vec::with_capacity(working.len());

    for pending in working {
        let Some(record) = pending.field.field_type.record_name() else {
            next.push(pending);
            continue;
        };

        if pending.chain.contains(&record) {
            let cycle = pending
                .chain
                .iter()
                .copied()
                .chain(std::iter::once(record))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(SchemaError::Cycle(cycle));
        }

        let fields = graph.fields_of(&pending.field.field_type)?;
        debug!(
            path = %pending.path.join("."),
            record,
            fields = fields.len(),
            "Expanding record"
        );

        let mut chain = pending.chain.clone();
        chain.push(record);
        for field in fields {
            let mut path = pending.path.clone();
            path.push(field.name.as_str());
            next.push(Pending {
                field,
                path,
                chain: chain.clone(),
            });
        }
    }

    Ok(next)
}

fn synthesize(
    graph: &TypeGraph<'_>,
    pending: &Pending<'_>,
    options: &FlattenOptions,
) -> FlatParameter {
    let field = pending.field;
    let default = graph.describe_default(field);
    FlatParameter {
        name: field.name.clone(),
        value_type: field.field_type.value_type().cloned().unwrap_or_default(),
        type_name: field.field_type.canonical_name(),
        prompt: options.prompt_required && default == DefaultKind::Required,
        default,
        help: field.description.clone(),
        panel: (!pending.chain.is_empty()).then(|| pending.chain.join(".")),
        path: pending.path.join("."),
    }
}

fn extended_doc(spec: &CallableSpec, leaves: &[FlatParameter], options: &FlattenOptions) -> String {
    let doc = spec.doc.clone().unwrap_or_default();
    let structured: Vec<&str> = spec.structured_params().map(|p| p.name.as_str()).collect();
    if !options.document_leaves || structured.is_empty() {
        return doc;
    }

    let names: Vec<&str> = leaves
        .iter()
        .filter(|leaf| leaf.panel.is_some())
        .map(|leaf| leaf.name.as_str())
        .collect();
    let suffix = format!(
        "Also accepts {} in place of {}.",
        names.join(", "),
        structured.join(", ")
    );
    if doc.is_empty() {
        suffix
    } else {
        format!("{doc}\n\n{suffix}")
    }
}

/// Turns a built value for `param` back into its flat leaf map.
///
/// Plain parameters map to themselves; structured ones are walked down to
/// their leaves. Feeding the result to
/// [`reconstruct`](crate::reconstruct) rebuilds `value`.
///
/// # Errors
///
/// Returns the walker's [`SchemaError`] for unknown or empty records.
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
///
/// let flat = flatten_instance(&registry, &FieldDescriptor::record("alpha", "Alpha"), &json!({"a": 4}))
///     .unwrap();
/// assert_eq!(flat.get("a"), Some(&json!(4)));
/// ```
pub fn flatten_instance(
    registry: &SchemaRegistry,
    param: &FieldDescriptor,
    value: &Value,
) -> Result<FlatArguments, SchemaError> {
    let graph = TypeGraph::new(registry);
    let mut flat = FlatArguments::new();
    collect_leaves(&graph, param, value, &mut Vec::new(), &mut flat)?;
    Ok(flat)
}

fn collect_leaves<'a>(
    graph: &TypeGraph<'a>,
    field: &'a FieldDescriptor,
    value: &Value,
    chain: &mut Vec<&'a str>,
    flat: &mut FlatArguments,
) -> Result<(), SchemaError> {
    let Some(record) = field.field_type.record_name() else {
        flat.insert(field.name.clone(), value.clone());
        return Ok(());
    };
    if chain.contains(&record) {
        return Err(SchemaError::Cycle(format!("{} -> {record}", chain.join(" -> "))));
    }

    chain.push(record);
    for child in graph.fields_of(&field.field_type)? {
        let nested = value.get(&child.name).unwrap_or(&Value::Null);
        collect_leaves(graph, child, nested, chain, flat)?;
    }
    chain.pop();
    Ok(())
}
