//! clap binding for a [`FlatSignature`].
//!
//! [`build_command`] renders one `--flag` per leaf, grouped under help
//! headings named after the leaf's panel; [`matches_to_flat`] turns the parsed
//! matches back into [`FlatArguments`] ready for reconstruction.

use clap::builder::PossibleValuesParser;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;

use crate::types::{DefaultKind, FlatArguments, FlatParameter, FlatSignature, ValueType};

/// Builds a clap [`Command`] whose options are the leaves of `signature`.
///
/// Leaf `other_name` becomes `--other-name`; its argument id stays
/// `other_name`.
///
/// # Examples
///
/// ```
/// use argflat_core::*;
///
/// let registry: SchemaRegistry = [RecordDefinition::new("Alpha")
///     .with_field(FieldDescriptor::required("a", FieldType::Primitive(ValueType::Integer)))]
///     .into_iter()
///     .collect();
/// let spec = CallableSpec::new("get").with_param(FieldDescriptor::record("alpha", "Alpha"));
/// let signature = flatten(&spec, &registry, &FlattenOptions::default()).unwrap();
///
/// let matches = frontend::build_command(&signature)
///     .try_get_matches_from(["get", "--a", "4"])
///     .unwrap();
/// let flat = frontend::matches_to_flat(&signature, &matches);
/// assert_eq!(flat.get("a"), Some(&serde_json::json!("4")));
/// ```
pub fn build_command(signature: &FlatSignature) -> Command {
    signature.parameters.iter().fold(
        Command::new(signature.callable.clone()).about(signature.doc.clone()),
        |command, param| command.arg(build_arg(param)),
    )
}

fn build_arg(param: &FlatParameter) -> Arg {
    let mut arg = Arg::new(param.name.clone())
        .long(param.name.replace('_', "-"))
        .value_name(param.type_name.to_uppercase())
        .action(ArgAction::Set);

    if let Some(help) = &param.help {
        arg = arg.help(help.clone());
    }
    if let Some(panel) = &param.panel {
        arg = arg.help_heading(panel.clone());
    }

    match &param.default {
        DefaultKind::Required => arg = arg.required(!param.prompt),
        DefaultKind::Absent => {}
        DefaultKind::Value(value) => arg = arg.default_value(display_value(value)),
    }

    match &param.value_type {
        ValueType::Bool => arg.num_args(0..=1).default_missing_value("true"),
        ValueType::Choice(choices) => arg.value_parser(PossibleValuesParser::new(choices.clone())),
        _ => arg,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Collects the values supplied for each leaf of `signature`.
///
/// Values stay strings; the schema collaborator coerces them during
/// reconstruction. Values clap filled in from a leaf's default are left out
/// so reconstruction applies the typed default instead of its rendering.
pub fn matches_to_flat(signature: &FlatSignature, matches: &ArgMatches) -> FlatArguments {
    let mut flat = FlatArguments::new();
    for param in &signature.parameters {
        if matches.value_source(&param.name) == Some(ValueSource::DefaultValue) {
            continue;
        }
        if let Some(value) = matches.get_one::<String>(&param.name) {
            flat.insert(param.name.clone(), Value::String(value.clone()));
        }
    }
    flat
}

/// Leaves marked for prompting that `flat` does not supply.
pub fn missing_prompts<'a>(
    signature: &'a FlatSignature,
    flat: &FlatArguments,
) -> Vec<&'a FlatParameter> {
    signature
        .parameters
        .iter()
        .filter(|p| p.prompt && !flat.contains_key(&p.name))
        .collect()
}
