//! Output formatting for flat signatures.

use argflat_core::{DefaultKind, FlatParameter, FlatSignature};
use serde::{Deserialize, Serialize};

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Markdown,
    Table,
}

/// Formats signatures in the requested output format.
pub fn format_signatures(
    signatures: &[FlatSignature],
    format: OutputFormat,
) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(signatures)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => serde_yaml::to_string(signatures)
            .map_err(|e| format!("YAML serialization failed: {e}")),
        OutputFormat::Markdown => Ok(signatures
            .iter()
            .map(signature_to_markdown)
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Table => Ok(signatures
            .iter()
            .map(signature_to_table)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn default_label(param: &FlatParameter) -> String {
    match &param.default {
        DefaultKind::Required => "required".to_string(),
        DefaultKind::Absent => "none".to_string(),
        DefaultKind::Value(value) => value.to_string(),
    }
}

fn flag(param: &FlatParameter) -> String {
    format!("--{}", param.name.replace('_', "-"))
}

fn signature_to_markdown(signature: &FlatSignature) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", signature.callable));
    if !signature.doc.is_empty() {
        out.push_str(&format!("{}\n\n", signature.doc));
    }

    for (panel, leaves) in signature.panels() {
        out.push_str(&format!("## {}\n\n", panel.unwrap_or("Options")));
        out.push_str("| Flag | Type | Default | Description |\n");
        out.push_str("|------|------|---------|-------------|\n");
        for leaf in leaves {
            let desc = leaf.help.as_deref().unwrap_or("");
            out.push_str(&format!(
                "| `{}` | {} | {} | {desc} |\n",
                flag(leaf),
                leaf.type_name,
                default_label(leaf)
            ));
        }
        out.push('\n');
    }

    out
}

fn signature_to_table(signature: &FlatSignature) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Command: {}  Leaves: {}\n",
        signature.callable,
        signature.len()
    ));
    if let Some(first) = signature.doc.lines().next().filter(|l| !l.is_empty()) {
        out.push_str(&format!("  {first}\n"));
    }

    let max_flag = signature
        .parameters
        .iter()
        .map(|p| flag(p).len())
        .max()
        .unwrap_or(4);
    let max_type = signature
        .parameters
        .iter()
        .map(|p| p.type_name.len())
        .max()
        .unwrap_or(4);

    for (panel, leaves) in signature.panels() {
        out.push_str(&format!("\n{}:\n", panel.unwrap_or("Options")));
        for leaf in leaves {
            let desc = leaf.help.as_deref().unwrap_or("");
            let line = format!(
                "  {:<fw$}  {:<tw$}  {:<9}  {desc}",
                flag(leaf),
                leaf.type_name,
                default_label(leaf),
                fw = max_flag,
                tw = max_type
            );
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use argflat_core::*;

    use super::*;

    fn signature() -> FlatSignature {
        let registry: SchemaRegistry = [RecordDefinition::new("Alpha")
            .with_field(
                FieldDescriptor::required("a", FieldType::Primitive(ValueType::Integer))
                    .with_description("Opacity."),
            )
            .with_field(
                FieldDescriptor::required("blend_mode", FieldType::Primitive(ValueType::String))
                    .with_default("normal"),
            )]
        .into_iter()
        .collect();
        let spec = CallableSpec::new("get_alpha")
            .with_doc("Return the alpha.")
            .with_param(FieldDescriptor::record("alpha", "Alpha"))
            .with_param(FieldDescriptor::optional(
                "note",
                FieldType::Optional(ValueType::String),
            ));
        flatten(&spec, &registry, &FlattenOptions::default()).unwrap()
    }

    #[test]
    fn test_markdown_groups_by_panel() {
        let out = format_signatures(&[signature()], OutputFormat::Markdown).unwrap();
        assert!(out.starts_with("# get_alpha\n\nReturn the alpha."));
        assert!(out.contains("## Alpha\n"));
        assert!(out.contains("| `--a` | int | required | Opacity. |"));
        assert!(out.contains("| `--blend-mode` | str | \"normal\" |  |"));
        assert!(out.contains("## Options\n"));
        assert!(out.contains("| `--note` | Optional[str] | none |  |"));
    }

    #[test]
    fn test_table_lists_every_leaf() {
        let out = format_signatures(&[signature()], OutputFormat::Table).unwrap();
        assert!(out.starts_with("Command: get_alpha  Leaves: 3\n  Return the alpha.\n"));
        assert!(out.contains("--blend-mode"));
        assert!(out.contains("\nOptions:\n"));
    }

    #[test]
    fn test_json_is_parseable() {
        let out = format_signatures(&[signature()], OutputFormat::Json).unwrap();
        let parsed: Vec<FlatSignature> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, vec![signature()]);
    }
}
