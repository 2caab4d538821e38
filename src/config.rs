//! Application configuration.
//!
//! The configuration is a JSON file, by default
//! `$XDG_CONFIG_HOME/btops/config.json`.  Every key is optional; a minimal
//! `{}` file is valid and falls back to the compiled-in defaults.
//!
//! # Example
//!
//! ```json
//! {
//!   "min": 2,
//!   "max": 8,
//!   "remove-empty": true,
//!   "remove-focused": false,
//!   "append-when-occupied": true,
//!   "watch-config": true,
//!   "renamers": ["classified", "client", "numeric"],
//!   "names": {
//!     "constant": "~",
//!     "static": ["one", "two", "three"],
//!     "classified": [
//!       { "web": ["firefox", "chromium"] },
//!       { "term": ["kitty", "Alacritty"] }
//!     ]
//!   }
//! }
//! ```

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::Path;

/// Top-level configuration, shared read-only by every handler and strategy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Minimum number of desktops per monitor.
    pub min: usize,
    /// Maximum number of desktops per monitor.
    pub max: usize,
    /// Remove empty desktops (keeping one as a landing pad).
    pub remove_empty: bool,
    /// Whether the focused desktop may be removed.
    pub remove_focused: bool,
    /// Append a fresh desktop once every desktop is occupied.
    pub append_when_occupied: bool,
    /// Restart the listen loop when the config file changes.
    pub watch_config: bool,
    /// Naming strategies by identifier, highest priority first.
    pub renamers: Vec<String>,
    /// Per-strategy settings.
    pub names: Names,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min: 1,
            max: usize::MAX,
            remove_empty: true,
            remove_focused: true,
            append_when_occupied: true,
            watch_config: true,
            renamers: vec!["numeric".into()],
            names: Names::default(),
        }
    }
}

/// Settings for the naming strategies.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Names {
    /// Name used by the `constant` strategy.
    pub constant: String,
    /// Positional names used by the `static` strategy.
    #[serde(rename = "static")]
    pub static_names: Vec<String>,
    /// Priority groups for the `classified` strategy, earliest first.
    #[serde(deserialize_with = "deserialize_classified")]
    pub classified: Vec<ClassGroup>,
}

/// One classified group: windows of any of `clients` make a desktop `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassGroup {
    pub name: String,
    pub clients: Vec<String>,
}

/// The entries of one `{ "group": [clients] }` object, in document order.
struct GroupEntries(Vec<ClassGroup>);

impl<'de> Deserialize<'de> for GroupEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = GroupEntries;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "object mapping group names to lists of client classes")
            }
            fn visit_map<A>(self, mut map: A) -> Result<GroupEntries, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut groups = Vec::new();
                while let Some((name, clients)) = map.next_entry::<String, Vec<String>>()? {
                    groups.push(ClassGroup { name, clients });
                }
                Ok(GroupEntries(groups))
            }
        }
        deserializer.deserialize_map(V)
    }
}

/// Flatten the list of group objects; a multi-key object yields its groups
/// in the order they are written.
fn deserialize_classified<'de, D>(deserializer: D) -> Result<Vec<ClassGroup>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<GroupEntries>::deserialize(deserializer)?;
    Ok(entries.into_iter().flat_map(|e| e.0).collect())
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
