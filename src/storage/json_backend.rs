use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{errors::HabitError, habit::Schema};

use super::{Result, SchemaStore};

const TMP_SUFFIX: &str = "tmp";

/// Pretty-printed JSON schema files.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaStore;

impl JsonSchemaStore {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaStore for JsonSchemaStore {
    fn load_schema(&self, path: &Path) -> Result<Schema> {
        let data = fs::read_to_string(path)?;
        let mut schema: Schema = serde_json::from_str(&data)?;
        let generated = schema.ensure_ids();
        if generated > 0 {
            debug!(generated, path = %path.display(), "back-filled habit identifiers");
            let json = serde_json::to_string_pretty(&schema)?;
            if let Err(err) = replace_file(path, &json) {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "could not persist generated habit identifiers"
                );
            }
        }
        Ok(schema)
    }

    fn save_schema(&self, schema: &Schema, path: &Path) -> Result<()> {
        schema.validate().map_err(HabitError::InvalidSchema)?;
        let json = serde_json::to_string_pretty(schema)?;
        replace_file(path, &json)?;
        info!(
            path = %path.display(),
            habits = schema.habits.len(),
            "schema saved"
        );
        Ok(())
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{TMP_SUFFIX}"));
    path.with_file_name(name)
}

/// Stages `data` next to `path` and renames it into place.
fn replace_file(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LEGACY: &str = r#"{
  "version": "1.0.0",
  "created_date": "2025-01-05",
  "habits": [
    {
      "title": "Morning Walk",
      "habit_type": "simple",
      "field_type": { "type": "boolean" },
      "scoring_type": "manual",
      "prompt": "Walked?"
    }
  ]
}"#;

    #[test]
    fn load_back_fills_and_persists_ids() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("habits.json");
        fs::write(&path, LEGACY).expect("seed file");

        let schema = JsonSchemaStore.load_schema(&path).expect("load");
        assert_eq!(schema.habits[0].id, "morning_walk");

        let written = fs::read_to_string(&path).expect("reread");
        assert!(written.contains("\"id\": \"morning_walk\""));
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn invalid_schema_is_not_written() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("habits.json");
        let mut schema = JsonSchemaStore.load_or_default(&path).expect("default");
        let mut habit = serde_json::from_str::<Schema>(LEGACY)
            .expect("parse")
            .habits
            .remove(0);
        habit.title = String::new();
        schema.habits.push(habit);

        let err = JsonSchemaStore.save_schema(&schema, &path).unwrap_err();
        assert!(matches!(err, HabitError::InvalidSchema(_)));
        assert!(!path.exists());
    }

    #[test]
    fn tmp_path_keeps_the_extension() {
        let path = Path::new("/data/habits.json");
        assert_eq!(tmp_path(path), PathBuf::from("/data/habits.json.tmp"));
    }
}
