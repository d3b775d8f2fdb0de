//! Sound catalog
//!
//! Maps sound names to files in the sound folder. The catalog file is
//! `sounds.toml` inside that folder:
//!
//! ```toml
//! [sounds]
//! alarm = "alarm.wav"
//! airhorn = "horns/airhorn.ogg"
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::constants::CATALOG_FILE;
use crate::error::CatalogError;

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sound {
    pub name: String,
    pub filename: String,
    path: PathBuf,
}

impl Sound {
    pub fn new(name: impl Into<String>, filename: impl Into<String>, dir: &Path) -> Self {
        let filename = filename.into();
        let path = dir.join(&filename);
        Self {
            name: name.into(),
            filename,
            path,
        }
    }

    /// Resolved path of the audio resource
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the audio resource is present on disk
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    sounds: HashMap<String, String>,
}

/// Name → sound lookup table
#[derive(Debug, Clone, Default)]
pub struct SoundCatalog {
    directory: PathBuf,
    sounds: HashMap<String, Sound>,
}

impl SoundCatalog {
    /// Empty catalog rooted at `directory`
    pub fn empty(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            sounds: HashMap::new(),
        }
    }

    /// Load `sounds.toml` from the sound folder
    pub fn load(directory: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let directory = directory.into();
        let path = directory.join(CATALOG_FILE);
        let text = std::fs::read_to_string(&path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(directory, &text).map_err(|message| CatalogError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    /// Build a catalog from catalog file text
    pub fn parse(directory: impl Into<PathBuf>, text: &str) -> Result<Self, String> {
        let file: CatalogFile = toml::from_str(text).map_err(|e| e.to_string())?;
        let mut catalog = Self::empty(directory);
        for (name, filename) in file.sounds {
            catalog.insert(name, filename);
        }
        Ok(catalog)
    }

    /// Add or replace an entry
    pub fn insert(&mut self, name: impl Into<String>, filename: impl Into<String>) {
        let name = name.into();
        let sound = Sound::new(name.clone(), filename, &self.directory);
        self.sounds.insert(name, sound);
    }

    pub fn lookup(&self, name: &str) -> Option<&Sound> {
        self.sounds.get(name)
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    /// Sound names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sounds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
