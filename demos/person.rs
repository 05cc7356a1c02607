//! Flattens `get_person(person: Person, thing: str)` into a flat command
//! line and calls it.
//!
//! ```text
//! cargo run -p argflat-demos --example person -- \
//!     --name John --age 30 --r 1 --g 2 --b 3 --a 4 --length 10 --thing stuff
//! ```

use std::sync::Arc;

use argflat_core::*;
use argflat_demos::{Person, person_registry};

fn text(name: &str) -> FieldDescriptor {
    FieldDescriptor::required(name, FieldType::Primitive(ValueType::String))
}

fn get_person(person: Person, thing: String) -> String {
    format!("{person:#?}\nthing = {thing}")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let spec = CallableSpec::new("get_person")
        .with_doc("Get a person's information.")
        .with_param(FieldDescriptor::record("person", Person::NAME))
        .with_param(text("thing"));

    let adapter = CallAdapter::new(
        spec,
        Arc::new(person_registry()),
        &FlattenOptions::default(),
        |args: ReconstructedArguments| -> Result<String, ReconstructionError> {
            Ok(get_person(args.get("person")?, args.get("thing")?))
        },
    )?;

    let matches = frontend::build_command(adapter.signature()).get_matches();
    let flat = frontend::matches_to_flat(adapter.signature(), &matches);
    println!("{}", adapter.call(&flat)??);
    Ok(())
}
