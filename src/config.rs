//! Engine configuration
//!
//! An engine is described by the shard directories it serves and how those
//! shards are brought into memory. Configurations are usually read from a
//! JSON file holding either one object or a list of named objects:
//!
//! ```json
//! [
//!   { "name": "pileval", "index_dirs": ["/idx/pileval/0", "/idx/pileval/1"],
//!     "load_mode": "resident", "get_metadata": true }
//! ]
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// How shard files are brought into memory
///
/// `Resident` reads every file up front: slow to open, uniformly fast
/// queries. `Mapped` memory-maps the files: instant open, first queries pay
/// page faults. The choice affects deployment sizing, so callers make it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    Resident,
    #[default]
    Mapped,
}

impl LoadMode {
    pub fn from_load_to_ram(load_to_ram: bool) -> Self {
        if load_to_ram {
            LoadMode::Resident
        } else {
            LoadMode::Mapped
        }
    }
}

/// Configuration for opening an [`Engine`](crate::engine::Engine)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Display name of the index
    #[serde(default)]
    pub name: Option<String>,
    /// Shard directories, in shard order
    pub index_dirs: Vec<PathBuf>,
    /// Resident or memory-mapped loading
    #[serde(default)]
    pub load_mode: LoadMode,
    /// Load `meta.fm` / `meta_offset` and return metadata with snippets
    #[serde(default)]
    pub get_metadata: bool,
    /// Split large extractions across the rayon pool
    #[serde(default)]
    pub parallel_extract: bool,
}

impl EngineConfig {
    pub fn new(index_dirs: Vec<PathBuf>, load_mode: LoadMode, get_metadata: bool) -> Self {
        Self {
            name: None,
            index_dirs,
            load_mode,
            get_metadata,
            parallel_extract: false,
        }
    }

    /// Read every configuration in a JSON file (a single object or a list)
    pub fn from_file(path: &Path) -> Result<Vec<Self>> {
        let file = File::open(path)?;
        let parsed: ConfigFile = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let configs = match parsed {
            ConfigFile::One(config) => vec![config],
            ConfigFile::Many(configs) => configs,
        };
        for config in &configs {
            config.validate()?;
        }
        Ok(configs)
    }

    /// Read the configuration called `name` from a JSON file.
    /// With `name == None` the file must hold exactly one configuration.
    pub fn from_file_named(path: &Path, name: Option<&str>) -> Result<Self> {
        let mut configs = Self::from_file(path)?;
        match name {
            Some(name) => configs
                .into_iter()
                .find(|c| c.name.as_deref() == Some(name))
                .ok_or_else(|| Error::Config(format!("no index named '{}'", name))),
            None if configs.len() == 1 => Ok(configs.remove(0)),
            None => Err(Error::Config(format!(
                "{} holds {} indexes; pick one by name",
                path.display(),
                configs.len()
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.index_dirs.is_empty() {
            return Err(Error::NoShards);
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigFile {
    One(EngineConfig),
    Many(Vec<EngineConfig>),
}
