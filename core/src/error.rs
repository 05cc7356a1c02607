//! Error types for flattening and reconstruction.
//!
//! - [`SchemaError`]: the type graph is malformed. Raised at flatten time and
//!   aborts adapter construction.
//! - [`ValidationError`]: the schema collaborator rejected a value.
//! - [`ReconstructionError`]: a call could not be rebuilt; wraps the
//!   collaborator's error together with the dotted leaf path.

use thiserror::Error;

/// Structural problems in records, callables or bundles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Record name is empty or whitespace-only.
    #[error("record name cannot be empty")]
    EmptyRecordName,
    /// A field (or parameter) in the named scope has an empty name.
    #[error("field name cannot be empty in {0}")]
    EmptyFieldName(String),
    /// Two fields in the same record share a name.
    #[error("duplicate field {field} in {record}")]
    DuplicateField { record: String, field: String },
    /// Two records in the same registry or bundle share a name.
    #[error("duplicate record: {0}")]
    DuplicateRecord(String),
    /// A field references a record that is not registered.
    #[error("unknown record type: {0}")]
    UnknownRecord(String),
    /// Fields were requested from a primitive type.
    #[error("type is not a structured record: {0}")]
    NotStructured(String),
    /// A record declares zero fields.
    #[error("record {0} declares no fields")]
    EmptyRecord(String),
    /// Expanding the type graph does not terminate.
    #[error("cycle detected: {0}")]
    Cycle(String),
    /// Two leaves from different paths flatten to the same name.
    #[error("duplicate leaf {name}: {first} and {second}")]
    DuplicateLeaf {
        name: String,
        first: String,
        second: String,
    },
    /// A leaf takes a name the generated command reserves for its own flags.
    #[error("leaf {name} at {path} clashes with the reserved --{name} flag")]
    ReservedLeaf { name: String, path: String },
    /// Bundle version string is empty.
    #[error("bundle version cannot be empty")]
    EmptyBundleVersion,
    /// Callable name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// Two callables in the same bundle share a name.
    #[error("duplicate command in bundle: {0}")]
    DuplicateCommand(String),
}

/// Value errors raised by the schema collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was not supplied.
    #[error("field required: {field}")]
    Missing { field: String },
    /// A value could not be coerced to the declared type.
    #[error("invalid value for {field}: expected {expected}, found {found}")]
    InvalidValue {
        field: String,
        expected: String,
        found: String,
    },
    /// A value is not one of the allowed choices.
    #[error("invalid choice for {field}: {value} (expected one of {})", choices.join(", "))]
    NotAChoice {
        field: String,
        value: String,
        choices: Vec<String>,
    },
    /// The record to construct is not registered.
    #[error("unknown record type: {0}")]
    UnknownRecord(String),
    /// A built value could not be converted into a typed record.
    #[error("cannot convert {field}: {message}")]
    Deserialize { field: String, message: String },
}

impl ValidationError {
    /// Returns the field the error refers to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Missing { field }
            | Self::InvalidValue { field, .. }
            | Self::NotAChoice { field, .. }
            | Self::Deserialize { field, .. } => Some(field),
            Self::UnknownRecord(_) => None,
        }
    }
}

/// Failure to rebuild the arguments of a single call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconstructionError {
    /// The collaborator rejected the value at `path`.
    #[error("{path}: {source}")]
    Invalid {
        /// Dotted leaf path, e.g. `hair.color.alpha.a`.
        path: String,
        #[source]
        source: ValidationError,
    },
    /// The type graph turned out to be malformed while rebuilding.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ReconstructionError {
    /// Wraps a collaborator error raised while constructing the record at
    /// `record_path`, extending the path with the offending field.
    pub fn at(record_path: &str, source: ValidationError) -> Self {
        let path = match source.field() {
            Some(field) => format!("{record_path}.{field}"),
            None => record_path.to_string(),
        };
        Self::Invalid { path, source }
    }

    /// Returns the dotted leaf path for value errors.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Invalid { path, .. } => Some(path),
            Self::Schema(_) => None,
        }
    }

    /// Returns the wrapped collaborator error.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Invalid { source, .. } => Some(source),
            Self::Schema(_) => None,
        }
    }
}
