use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::HabitError;

pub const HOME_ENV: &str = "HABIT_CORE_HOME";
const CONFIG_FILE: &str = "config.json";
const DEFAULT_SCHEMA_FILE: &str = "habits.json";
const TMP_SUFFIX: &str = "tmp";
pub const PLAIN_THEME: &str = "plain";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl Config {
    pub fn plain_output(&self) -> bool {
        self.theme.as_deref() == Some(PLAIN_THEME)
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    /// Resolves the base directory from `HABIT_CORE_HOME`, falling back to the
    /// platform configuration directory.
    pub fn new() -> Result<Self, HabitError> {
        let base = match env::var_os(HOME_ENV) {
            Some(home) if !home.is_empty() => PathBuf::from(home),
            _ => dirs::config_dir()
                .map(|dir| dir.join("habit_core"))
                .ok_or_else(|| {
                    HabitError::Config(format!(
                        "no configuration directory found; set {HOME_ENV}"
                    ))
                })?,
        };
        Ok(Self::with_base_dir(base))
    }

    pub fn with_base_dir(base: PathBuf) -> Self {
        let path = base.join(CONFIG_FILE);
        Self { base, path }
    }

    pub fn load(&self) -> Result<Config, HabitError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), HabitError> {
        fs::create_dir_all(&self.base)?;
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Schema file to operate on: an explicit override, then the configured
    /// path, then `habits.json` under the base directory.
    pub fn schema_path(&self, config: &Config, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| config.schema_path.clone())
            .unwrap_or_else(|| self.base.join(DEFAULT_SCHEMA_FILE))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_defaults() {
        let temp = TempDir::new().expect("temp dir");
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf());
        assert_eq!(manager.load().expect("load"), Config::default());
    }

    #[test]
    fn save_and_reload() {
        let temp = TempDir::new().expect("temp dir");
        let manager = ConfigManager::with_base_dir(temp.path().join("nested"));
        let config = Config {
            schema_path: Some(PathBuf::from("/tmp/mine.json")),
            theme: Some(PLAIN_THEME.into()),
        };
        manager.save(&config).expect("save");
        assert!(!tmp_path(manager.path()).exists());
        let loaded = manager.load().expect("load");
        assert_eq!(loaded, config);
        assert!(loaded.plain_output());
    }

    #[test]
    fn schema_path_precedence() {
        let manager = ConfigManager::with_base_dir(PathBuf::from("/base"));
        let mut config = Config::default();
        assert_eq!(
            manager.schema_path(&config, None),
            PathBuf::from("/base/habits.json")
        );
        config.schema_path = Some(PathBuf::from("/configured.json"));
        assert_eq!(
            manager.schema_path(&config, None),
            PathBuf::from("/configured.json")
        );
        assert_eq!(
            manager.schema_path(&config, Some(Path::new("/flag.json"))),
            PathBuf::from("/flag.json")
        );
    }
}
