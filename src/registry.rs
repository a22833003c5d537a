//! Palette registry handing out stable palette identities
//!
//! Every registered palette gets a fresh [`PaletteId`]. The aggregator compares
//! these ids, never palette contents, so two registrations of identical colors
//! are still two different palettes.
//!
//! References are resolved from strings:
//! - `@name` - a built-in palette
//! - `name` - a palette registered under that name
//! - `path/to/file.toml` or `.json` - a palette file

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::color::ColorError;
use crate::models::{Palette, PaletteDef};
use crate::palettes;

/// Opaque, stable identity of a registered palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaletteId(u32);

impl PaletteId {
    /// Raw numeric value, for display and debugging only.
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Read access to palettes by identity.
pub trait PaletteStore {
    /// The palette registered under `id`, if it is still present.
    fn palette(&self, id: PaletteId) -> Option<&Palette>;
}

/// Error when resolving a palette reference or loading a palette file.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Referenced built-in palette (@name) was not found
    #[error("Built-in palette '@{0}' not found")]
    BuiltinNotFound(String),
    /// Reference is neither a registered name nor an existing file
    #[error("Palette '{0}' not found")]
    NotFound(String),
    /// Palette file could not be read
    #[error("Cannot read palette file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Palette file is not valid TOML
    #[error("Cannot parse palette file '{}': {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// Palette file is not valid JSON
    #[error("Cannot parse palette file '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A color entry inside a palette file is invalid
    #[error("Palette file '{}': color {index} ('{value}'): {source}", path.display())]
    BadColor {
        path: PathBuf,
        index: usize,
        value: String,
        #[source]
        source: ColorError,
    },
}

/// Registry owning palettes and the names and files they were loaded from.
#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    palettes: HashMap<PaletteId, Palette>,
    /// Reference string (name, `@builtin` or file path) to the id it resolved to
    names: HashMap<String, PaletteId>,
    next_id: u32,
}

impl PaletteRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a palette and return its new identity.
    ///
    /// The palette is reachable only through the returned id. Its own
    /// `name` is display text and never becomes a reference.
    pub fn register(&mut self, palette: Palette) -> PaletteId {
        let id = PaletteId(self.next_id);
        self.next_id += 1;
        self.palettes.insert(id, palette);
        id
    }

    /// Register a palette under an explicit reference name.
    ///
    /// The name now refers to this registration, replacing any earlier
    /// palette registered under it. The earlier palette stays reachable
    /// through its own id.
    pub fn register_as(&mut self, name: impl Into<String>, palette: Palette) -> PaletteId {
        let id = self.register(palette);
        self.names.insert(name.into(), id);
        id
    }

    /// Get a palette by id.
    pub fn get(&self, id: PaletteId) -> Option<&Palette> {
        self.palettes.get(&id)
    }

    /// Look up the id currently registered under a name.
    pub fn lookup(&self, name: &str) -> Option<PaletteId> {
        self.names.get(name).copied()
    }

    /// Check if a palette with the given id exists.
    pub fn contains(&self, id: PaletteId) -> bool {
        self.palettes.contains_key(&id)
    }

    /// Remove a palette. Names pointing at it stop resolving.
    pub fn remove(&mut self, id: PaletteId) -> Option<Palette> {
        self.names.retain(|_, v| *v != id);
        self.palettes.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    /// Resolve a palette reference to an id, loading it on first use.
    ///
    /// Resolving the same reference twice yields the same id. Relative file
    /// paths are taken relative to `base_dir`.
    pub fn resolve(&mut self, reference: &str, base_dir: &Path) -> Result<PaletteId, RegistryError> {
        if let Some(name) = reference.strip_prefix('@') {
            if let Some(id) = self.lookup(reference) {
                return Ok(id);
            }
            let palette = palettes::get_builtin(name)
                .ok_or_else(|| RegistryError::BuiltinNotFound(name.to_string()))?;
            debug!(builtin = name, "registered built-in palette");
            return Ok(self.register_as(reference, palette));
        }

        if let Some(id) = self.lookup(reference) {
            return Ok(id);
        }

        let path = base_dir.join(reference);
        if !path.is_file() {
            return Err(RegistryError::NotFound(reference.to_string()));
        }
        let key = path.display().to_string();
        if let Some(id) = self.lookup(&key) {
            return Ok(id);
        }
        let palette = load_palette_file(&path)?;
        debug!(path = %path.display(), colors = palette.len(), "loaded palette file");
        Ok(self.register_as(key, palette))
    }

    /// Resolve a list of references in order.
    pub fn resolve_all<S: AsRef<str>>(
        &mut self,
        references: &[S],
        base_dir: &Path,
    ) -> Result<Vec<Option<PaletteId>>, RegistryError> {
        references
            .iter()
            .map(|r| self.resolve(r.as_ref(), base_dir).map(Some))
            .collect()
    }
}

impl PaletteStore for PaletteRegistry {
    fn palette(&self, id: PaletteId) -> Option<&Palette> {
        self.get(id)
    }
}

/// Load a palette file. `.json` files are parsed as JSON, anything else as TOML.
///
/// Unnamed palettes are named after the file stem.
pub fn load_palette_file(path: &Path) -> Result<Palette, RegistryError> {
    let content = fs::read_to_string(path).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    let def: PaletteDef = if is_json {
        serde_json::from_str(&content).map_err(|source| RegistryError::Json {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        toml::from_str(&content).map_err(|source| RegistryError::Toml {
            path: path.to_path_buf(),
            source,
        })?
    };

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("palette");
    def.into_palette(stem).map_err(|bad| RegistryError::BadColor {
        path: path.to_path_buf(),
        index: bad.index,
        value: bad.value,
        source: bad.error,
    })
}
