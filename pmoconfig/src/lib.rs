//! # PMOPlayer Configuration Module
//!
//! This module provides configuration management for the PMOPlayer stack, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters and setters for player settings (autoplay, type map, sink hints)
//! - Thread-safe singleton access pattern
//!
//! ## Usage
//!
//! ```no_run
//! use pmoconfig::get_config;
//!
//! // Get the global configuration
//! let config = get_config();
//!
//! // Access configuration values
//! let autoplay = config.get_autoplay()?;
//! let type_map = config.get_type_map();
//!
//! // Update configuration values
//! config.set_autoplay(false)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Value};
use std::{
    collections::HashMap,
    env, fs,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::{info, warn};

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("pmoplayer.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> = Arc::new(Config::load_config("").unwrap_or_else(|err| {
        warn!(error=%err, "Failed to load PMOPlayer configuration, using embedded defaults");
        Config::embedded()
    }));
}

const ENV_CONFIG_DIR: &str = "PMOPLAYER_CONFIG";
const ENV_PREFIX: &str = "PMOPLAYER_CONFIG__";
const CONFIG_DIR_NAME: &str = ".pmoplayer";

// Default values for configuration
const DEFAULT_AUTOPLAY: bool = true;
const DEFAULT_MEDIA_EVENTS: bool = false;
const DEFAULT_PRELOAD: &str = "none";
const DEFAULT_CROSS_ORIGIN: &str = "anonymous";
const DEFAULT_CONTEXT_STATE: &str = "suspended";

/// Built-in mapping from short stream types to fully-qualified media types.
pub const DEFAULT_TYPE_MAP: [(&str, &str); 4] = [
    ("aac", "audio/aac"),
    ("mp3", "audio/mp3"),
    ("opus", "audio/ogg; codecs=opus"),
    ("oga", "audio/ogg; codecs=vorbis"),
];

/// Macro to generate getter/setter for bool values with default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<bool> {
            match self.get_value($path)? {
                Value::Bool(b) => Ok(b),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Macro to generate getter/setter for string values with default
macro_rules! impl_string_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> String {
            match self.get_value($path) {
                Ok(Value::String(s)) if !s.is_empty() => s,
                _ => $default.to_string(),
            }
        }

        pub fn $setter(&self, value: String) -> Result<()> {
            self.set_value($path, Value::String(value))
        }
    };
}

/// Configuration manager for PMOPlayer
///
/// This structure manages the player configuration, including:
/// - Loading configuration from YAML files
/// - Merging with default configuration
/// - Handling environment variable overrides
/// - Providing typed getters/setters for configuration values
///
/// A configuration built with [`Config::from_yaml_str`] lives in memory only:
/// it has no backing file and [`Config::save`] does nothing.
///
/// # Examples
///
/// ```no_run
/// use pmoconfig::get_config;
///
/// let config = get_config();
/// let autoplay = config.get_autoplay()?;
/// println!("Autoplay: {}", autoplay);
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: Option<String>,
    data: Mutex<Value>,
}

// Implémentation manuelle de Clone
impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self.lock_data().clone();
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Config {
    fn lock_data(&self) -> MutexGuard<'_, Value> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var=ENV_CONFIG_DIR, path=%env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(CONFIG_DIR_NAME).exists() {
            return CONFIG_DIR_NAME.to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        // Default fallback
        CONFIG_DIR_NAME.to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        // Create if doesn't exist
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        // Verify it's a directory
        if !path.is_dir() {
            return Err(anyhow!("Le chemin spécifié n'est pas un répertoire"));
        }

        // Test write permission
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `PMOPLAYER_CONFIG` environment variable
    /// 3. `.pmoplayer` in the current directory
    /// 4. `.pmoplayer` in the user's home directory
    ///
    /// The directory is created if it doesn't exist, and validated for write permission.
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&dir_path))?;
        Ok(dir_path)
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    /// 5. Saves the merged configuration
    ///
    /// # Arguments
    ///
    /// * `directory` - The directory containing the config.yaml file, or empty to use defaults
    pub fn load_config(directory: &str) -> Result<Self> {
        // Obtenir le répertoire de configuration
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir=%config_dir, "Using config directory");

        // Construire le chemin du fichier config.yaml
        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        // Charger la configuration par défaut
        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        // Essayer de charger le fichier de configuration
        let yaml_data = if let Ok(data) = fs::read(&path) {
            info!(config_file=%path, "Loaded config file");
            data
        } else {
            info!(config_file=%path, "Config file not found, using default embedded config");
            DEFAULT_CONFIG.as_bytes().to_vec()
        };

        // Merger avec la config par défaut
        let external_value: Value = serde_yaml::from_slice(&yaml_data)?;
        merge_yaml(&mut default_value, &external_value);
        let mut config_value = Self::lower_keys_value(default_value);

        // Appliquer les overrides depuis les variables d'environnement
        Self::apply_env_overrides(&mut config_value);

        let config = Config {
            config_dir,
            path: Some(path),
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    /// Builds an in-memory configuration from a YAML document
    ///
    /// The document is merged over the embedded defaults. Environment
    /// overrides are not applied and nothing is ever written to disk.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        let external_value: Value = serde_yaml::from_str(yaml)?;
        if !external_value.is_null() {
            merge_yaml(&mut default_value, &external_value);
        }

        Ok(Config {
            config_dir: String::new(),
            path: None,
            data: Mutex::new(Self::lower_keys_value(default_value)),
        })
    }

    /// In-memory configuration holding only the embedded defaults
    pub fn embedded() -> Self {
        let value = serde_yaml::from_str(DEFAULT_CONFIG).unwrap_or(Value::Mapping(Mapping::new()));
        Config {
            config_dir: String::new(),
            path: None,
            data: Mutex::new(Self::lower_keys_value(value)),
        }
    }

    /// Returns the configuration directory, empty for in-memory configurations
    pub fn directory(&self) -> &str {
        &self.config_dir
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let yaml = serde_yaml::to_string(&*self.lock_data())?;
        fs::write(path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["player", "autoplay"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.lock_data();
            Self::set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key_value = Value::String(path[0].to_lowercase());
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    ///
    /// Returns an error if the path doesn't exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.lock_data();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                if let Some(next) = map.get(&Value::String(key.to_lowercase())) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path = stripped.split("__").collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                if let Err(err) = Self::set_value_internal(config, &key_path, yaml_value) {
                    warn!(env_var=%key, error=%err, "Ignoring environment override");
                }
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    let new_val = Self::lower_keys_value(v);
                    if let Value::String(s) = k {
                        new_map.insert(Value::String(s.to_lowercase()), new_val);
                    } else {
                        new_map.insert(k, new_val);
                    }
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    impl_bool_config!(
        get_autoplay,
        set_autoplay,
        &["player", "autoplay"],
        DEFAULT_AUTOPLAY
    );

    impl_bool_config!(
        get_sink_media_events,
        set_sink_media_events,
        &["player", "sink", "media_events"],
        DEFAULT_MEDIA_EVENTS
    );

    impl_string_config!(
        get_sink_preload,
        set_sink_preload,
        &["player", "sink", "preload"],
        DEFAULT_PRELOAD
    );

    impl_string_config!(
        get_sink_cross_origin,
        set_sink_cross_origin,
        &["player", "sink", "cross_origin"],
        DEFAULT_CROSS_ORIGIN
    );

    impl_string_config!(
        get_context_initial_state,
        set_context_initial_state,
        &["player", "context", "initial_state"],
        DEFAULT_CONTEXT_STATE
    );

    /// Récupère la table de correspondance type → media type
    ///
    /// Les entrées dont la valeur n'est pas une chaîne sont ignorées. Si la
    /// section est absente ou invalide, la table intégrée est retournée.
    pub fn get_type_map(&self) -> HashMap<String, String> {
        match self.get_value(&["player", "type_map"]) {
            Ok(Value::Mapping(map)) => map
                .into_iter()
                .filter_map(|(k, v)| match (k, v) {
                    (Value::String(k), Value::String(v)) => Some((k, v)),
                    (k, _) => {
                        warn!(key=?k, "Ignoring non-string type map entry");
                        None
                    }
                })
                .collect(),
            Ok(_) | Err(_) => {
                warn!("Type map missing from configuration, using built-in table");
                default_type_map()
            }
        }
    }

    /// Ajoute ou remplace une entrée de la table type → media type
    pub fn set_type_map_entry(&self, stream_type: &str, media_type: &str) -> Result<()> {
        self.set_value(
            &["player", "type_map", stream_type],
            Value::String(media_type.to_string()),
        )
    }

    /// Media types the default element sink reports as playable
    pub fn get_supported_media_types(&self) -> Vec<String> {
        match self.get_value(&["player", "sink", "supported_types"]) {
            Ok(Value::Sequence(seq)) => seq
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// The built-in type map as an owned table
pub fn default_type_map() -> HashMap<String, String> {
    DEFAULT_TYPE_MAP
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Returns the global configuration instance
///
/// This function provides access to the singleton configuration instance,
/// which is lazily loaded on first access. If loading fails, the embedded
/// defaults are used in memory.
///
/// # Examples
///
/// ```no_run
/// use pmoconfig::get_config;
///
/// let config = get_config();
/// let preload = config.get_sink_preload();
/// ```
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Merges external YAML configuration into default configuration
///
/// This function recursively merges two YAML value trees:
/// - For mappings (objects), it merges keys from external into default
/// - For scalars and sequences, external values replace default values
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(), // pour les scalaires ou séquences, on remplace
    }
}
