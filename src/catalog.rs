//! JSON theme catalog: loading, the insert-or-update merge, and full rewrites.
//!
//! A catalog holds a single top-level array keyed by item type (`themes` or
//! `clockThemes`). Entries are matched by exact `id`, resolutions by exact
//! `resolution` label; nothing is ever removed.
//!
//! # Kinds
//!
//! Wallpaper and clock entries share every field except the clock-only
//! `isCustomizable` flag. [`ThemeEntry`] is generic over a [`ThemeKind`]
//! that is flattened into the entry, so each catalog file only ever
//! (de)serializes the shape that belongs to it.
//!
//! # Preservation
//!
//! Fields the publisher does not manage survive a rewrite: other top-level
//! keys keep their position, and unknown keys on theme and resolution
//! entries are carried in `extra`. Missing or `null` managed fields read as
//! their defaults.
//!
//! # Writes
//!
//! [`Catalog::save`] writes the whole document to a sibling temporary file
//! and renames it over the original, so a failed write never truncates the
//! existing catalog.

use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::PublishError;
use crate::theme::ItemType;

/// Per-kind fields flattened into a [`ThemeEntry`]
pub trait ThemeKind: Serialize + DeserializeOwned + Debug + Clone {
    /// Top-level array key of this kind's catalog
    const CATALOG_KEY: &'static str;

    /// Kind fields carried by the current publish
    fn from_item(item: &ItemType) -> Self;
}

/// Wallpapers have no fields of their own
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WallpaperFields {}

impl ThemeKind for WallpaperFields {
    const CATALOG_KEY: &'static str = "themes";

    fn from_item(_item: &ItemType) -> Self {
        WallpaperFields {}
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockFields {
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_customizable: bool,
}

impl ThemeKind for ClockFields {
    const CATALOG_KEY: &'static str = "clockThemes";

    fn from_item(item: &ItemType) -> Self {
        match item {
            ItemType::Clock { customizable } => ClockFields {
                is_customizable: *customizable,
            },
            ItemType::Wallpaper => ClockFields::default(),
        }
    }
}

/// One published artifact of a theme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub resolution: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub download_url: String,
    /// Missing or `null` in hand-edited files reads as 0
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: u32,
    #[serde(rename = "sizeMB", default, deserialize_with = "null_as_default")]
    pub size_mb: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeEntry<K> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preview_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resolutions: Vec<ResolutionEntry>,
    // Must precede `extra` so the kind's own keys are claimed first
    #[serde(flatten)]
    pub kind: K,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Everything the merge needs from one publish
#[derive(Debug, Clone)]
pub struct ThemeUpdate<K> {
    pub id: String,
    pub name: String,
    pub description: String,
    pub author: String,
    pub tags: Vec<String>,
    pub preview_url: String,
    pub kind: K,
    pub resolution: String,
    pub download_url: String,
    pub size_mb: f64,
}

/// What happened to the theme entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeChange {
    Added,
    MetadataUpdated,
}

/// What happened to the resolution entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionChange {
    Added,
    Updated,
}

/// Outcome of a merge, used for reporting and the commit message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    pub theme: ThemeChange,
    pub resolution: ResolutionChange,
    pub version: u32,
}

/// Where a loaded catalog came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// Parsed from the existing file
    Existing,
    /// No file yet
    Missing,
    /// File was not a readable catalog; its content was copied to `backup`
    Invalid { backup: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog<K> {
    pub themes: Vec<ThemeEntry<K>>,
    /// Other top-level keys, in file order
    pub extra: Map<String, Value>,
    /// Index of the catalog key among all top-level keys
    position: usize,
}

impl<K> Default for Catalog<K> {
    fn default() -> Self {
        Self {
            themes: Vec::new(),
            extra: Map::new(),
            position: 0,
        }
    }
}

impl<K: ThemeKind> Catalog<K> {
    /// Create an empty catalog
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a catalog document. A missing top-level key reads as empty.
    pub fn from_json(content: &str) -> Result<Self, PublishError> {
        let value: Value = serde_json::from_str(content)?;
        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(PublishError::CatalogParse(serde::de::Error::custom(
                    format!("expected a JSON object, found {}", json_type(&other)),
                )))
            }
        };

        let mut catalog = Self::empty();
        let mut themes = None;
        for (key, value) in object {
            if key == K::CATALOG_KEY {
                catalog.position = catalog.extra.len();
                themes = Some(value);
            } else {
                catalog.extra.insert(key, value);
            }
        }

        match themes {
            Some(Value::Null) | None => catalog.position = catalog.extra.len(),
            Some(themes) => catalog.themes = serde_json::from_value(themes)?,
        }
        Ok(catalog)
    }

    /// Render the whole document, 2-space indented
    pub fn to_json(&self) -> Result<String, PublishError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from disk.
    ///
    /// A missing file gives an empty catalog. A file that is not a valid
    /// catalog is copied to `<file>.bak` and replaced by an empty catalog,
    /// so the next write cannot silently lose its content. Read errors other
    /// than "not found" are returned.
    pub fn load(path: &Path) -> Result<(Self, CatalogSource), PublishError> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok((Self::empty(), CatalogSource::Missing))
            }
            Err(source) => {
                return Err(PublishError::CatalogRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        match Self::from_json(&content) {
            Ok(catalog) => Ok((catalog, CatalogSource::Existing)),
            Err(e) => {
                let backup = backup_path(path);
                fs::write(&backup, &content).map_err(|source| PublishError::CatalogWrite {
                    path: backup.clone(),
                    source,
                })?;
                Ok((
                    Self::empty(),
                    CatalogSource::Invalid {
                        backup,
                        reason: e.to_string(),
                    },
                ))
            }
        }
    }

    /// Write the whole document through a temporary file and rename
    pub fn save(&self, path: &Path) -> Result<(), PublishError> {
        let json = self.to_json()?;
        let tmp = temp_path(path);
        let write_err = |source: io::Error| PublishError::CatalogWrite {
            path: path.to_path_buf(),
            source,
        };

        fs::write(&tmp, json)
            .map_err(|e| PublishError::from_io(e, &tmp, write_err))?;
        fs::rename(&tmp, path).map_err(write_err)
    }

    /// Insert or update the theme and resolution named by `update`
    pub fn merge(&mut self, update: ThemeUpdate<K>) -> MergeReport {
        let ThemeUpdate {
            id,
            name,
            description,
            author,
            tags,
            preview_url,
            kind,
            resolution,
            download_url,
            size_mb,
        } = update;

        let (index, theme_change) = match self.themes.iter().position(|t| t.id == id) {
            Some(index) => {
                let entry = &mut self.themes[index];
                entry.name = name;
                entry.description = description;
                entry.author = author;
                entry.tags = tags;
                entry.preview_url = preview_url;
                entry.kind = kind;
                (index, ThemeChange::MetadataUpdated)
            }
            None => {
                self.themes.push(ThemeEntry {
                    id,
                    name,
                    description,
                    author,
                    tags,
                    preview_url,
                    resolutions: Vec::new(),
                    kind,
                    extra: Map::new(),
                });
                (self.themes.len() - 1, ThemeChange::Added)
            }
        };

        let resolutions = &mut self.themes[index].resolutions;
        let (version, resolution_change) =
            match resolutions.iter_mut().find(|r| r.resolution == resolution) {
                Some(existing) => {
                    existing.version = existing.version.saturating_add(1);
                    existing.download_url = download_url;
                    existing.size_mb = size_mb;
                    (existing.version, ResolutionChange::Updated)
                }
                None => {
                    resolutions.push(ResolutionEntry {
                        resolution,
                        download_url,
                        version: 1,
                        size_mb,
                        extra: Map::new(),
                    });
                    (1, ResolutionChange::Added)
                }
            };

        MergeReport {
            theme: theme_change,
            resolution: resolution_change,
            version,
        }
    }
}

impl<K: ThemeKind> Serialize for Catalog<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.extra.len() + 1))?;
        for (index, (key, value)) in self.extra.iter().enumerate() {
            if index == self.position {
                map.serialize_entry(K::CATALOG_KEY, &self.themes)?;
            }
            map.serialize_entry(key, value)?;
        }
        if self.position >= self.extra.len() {
            map.serialize_entry(K::CATALOG_KEY, &self.themes)?;
        }
        map.end()
    }
}

/// Read `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

/// `update.json` -> `update.json.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    with_suffix(path, ".bak")
}

fn temp_path(path: &Path) -> PathBuf {
    with_suffix(path, ".tmp")
}
