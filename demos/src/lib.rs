//! Typed records shared by the demos.
//!
//! `Person` nests `Hair`, which nests `Color`, which nests `Alpha`;
//! registering `Person` pulls in the rest.

use argflat_core::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alpha {
    pub a: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: i64,
    pub g: i64,
    pub b: i64,
    pub alpha: Alpha,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hair {
    pub color: Color,
    pub length: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub other_name: Option<String>,
    pub age: i64,
    pub pet: String,
    pub address: String,
    pub hair: Hair,
}

fn int(name: &str) -> FieldDescriptor {
    FieldDescriptor::required(name, FieldType::Primitive(ValueType::Integer))
}

fn text(name: &str) -> FieldDescriptor {
    FieldDescriptor::required(name, FieldType::Primitive(ValueType::String))
}

impl Structured for Alpha {
    const NAME: &'static str = "Alpha";

    fn definition() -> RecordDefinition {
        RecordDefinition::new(Self::NAME).with_field(int("a").with_description("Opacity."))
    }
}

impl Structured for Color {
    const NAME: &'static str = "Color";

    fn definition() -> RecordDefinition {
        RecordDefinition::new(Self::NAME)
            .with_field(int("r"))
            .with_field(int("g"))
            .with_field(int("b"))
            .with_field(FieldDescriptor::record("alpha", Alpha::NAME))
    }

    fn register_nested(registry: &mut SchemaRegistry) {
        registry.register::<Alpha>();
    }
}

impl Structured for Hair {
    const NAME: &'static str = "Hair";

    fn definition() -> RecordDefinition {
        RecordDefinition::new(Self::NAME)
            .with_field(FieldDescriptor::record("color", Color::NAME))
            .with_field(int("length").with_description("Length in centimetres."))
    }

    fn register_nested(registry: &mut SchemaRegistry) {
        registry.register::<Color>();
    }
}

impl Structured for Person {
    const NAME: &'static str = "Person";

    fn definition() -> RecordDefinition {
        RecordDefinition::new(Self::NAME)
            .with_field(text("name"))
            .with_field(FieldDescriptor::optional(
                "other_name",
                FieldType::Optional(ValueType::String),
            ))
            .with_field(int("age"))
            .with_field(text("pet").with_default("dog"))
            .with_field(
                text("address")
                    .with_default("123 Main St")
                    .with_description("Where the person calls home."),
            )
            .with_field(FieldDescriptor::record("hair", Hair::NAME))
    }

    fn register_nested(registry: &mut SchemaRegistry) {
        registry.register::<Hair>();
    }
}

/// Registry holding `Person` and every record it reaches.
pub fn person_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register::<Person>();
    registry
}
