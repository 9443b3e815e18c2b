pub mod json_backend;

use std::path::Path;

use crate::{errors::HabitError, habit::Schema};

pub type Result<T> = std::result::Result<T, HabitError>;

/// Abstraction over persistence backends capable of storing habit schemas.
pub trait SchemaStore {
    /// Loads a schema, back-filling missing habit identifiers.
    fn load_schema(&self, path: &Path) -> Result<Schema>;

    /// Validates strictly, then writes. Nothing is written when validation fails.
    fn save_schema(&self, schema: &Schema, path: &Path) -> Result<()>;

    /// Like [`SchemaStore::load_schema`], but a missing file yields an empty schema.
    fn load_or_default(&self, path: &Path) -> Result<Schema> {
        if path.exists() {
            self.load_schema(path)
        } else {
            Ok(Schema::new(chrono::Local::now().date_naive()))
        }
    }
}

pub use json_backend::JsonSchemaStore;
