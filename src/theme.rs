//! Item type, theme id, and naming rules for published themes.
//!
//! Provides the type-safe `ThemeId` wrapper with its normalization rule and
//! the file-naming conventions shared by the archive and preview steps.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::PublishError;

/// What is being published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    Wallpaper,
    /// Clock themes carry the customizable flag
    Clock { customizable: bool },
}

impl ItemType {
    /// Choices offered by the item type question, in display order
    pub const CHOICES: [&'static str; 2] = ["Wallpaper", "Clock"];

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Wallpaper => "Wallpaper",
            ItemType::Clock { .. } => "Clock",
        }
    }

    #[inline]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Wallpaper" => Some(ItemType::Wallpaper),
            "Clock" => Some(ItemType::Clock {
                customizable: false,
            }),
            _ => None,
        }
    }

    /// Catalog file name at the repository root
    #[inline]
    pub fn catalog_file(&self) -> &'static str {
        match self {
            ItemType::Wallpaper => "update.json",
            ItemType::Clock { .. } => "updateClock.json",
        }
    }

    /// Top-level array key inside the catalog
    #[inline]
    pub fn catalog_key(&self) -> &'static str {
        match self {
            ItemType::Wallpaper => "themes",
            ItemType::Clock { .. } => "clockThemes",
        }
    }

    /// Directory holding the per-id archive folders
    #[inline]
    pub fn archive_dir(&self) -> &'static str {
        match self {
            ItemType::Wallpaper => "wallpapers",
            ItemType::Clock { .. } => "clocks",
        }
    }

    /// Flat directory holding preview images
    #[inline]
    pub fn preview_dir(&self) -> &'static str {
        match self {
            ItemType::Wallpaper => "previews",
            ItemType::Clock { .. } => "clock_previews",
        }
    }

    #[inline]
    pub fn is_clock(&self) -> bool {
        matches!(self, ItemType::Clock { .. })
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Theme identifier: lowercase ASCII letters, digits and hyphens only.
/// Newtype wrapper so an un-normalized id can never reach the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThemeId(Arc<str>);

impl ThemeId {
    /// Normalize raw operator input into an id.
    ///
    /// Lower-cases, collapses each run of internal whitespace into a single
    /// hyphen and strips everything outside `[a-z0-9-]`. Fails when nothing
    /// survives.
    pub fn normalize(raw: &str) -> Result<Self, PublishError> {
        let id = normalize_id(raw);
        if id.is_empty() {
            return Err(PublishError::Validation(
                "Theme ID cannot be empty.".to_string(),
            ));
        }
        Ok(Self(Arc::from(id)))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn normalize_id(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut id = String::with_capacity(lowered.len());
    let mut in_whitespace = false;

    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                id.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            id.push(c);
        }
    }

    id
}

/// Split comma-separated tags, trimming each and dropping empty segments
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Clean a dragged-and-dropped path: trim, then strip one quote from each end
pub fn clean_path_input(input: &str) -> PathBuf {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix(['"', '\''])
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(['"', '\'']).unwrap_or(trimmed);
    PathBuf::from(trimmed)
}

/// Replace every character outside `[A-Za-z0-9_.-]` with an underscore
pub fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Archive file name for an (id, label) pair, e.g. `aurora-blast_1920x1080.zip`
pub fn archive_file_name(id: &ThemeId, label: &str) -> String {
    format!("{}_{}.zip", id, sanitize_label(label))
}

/// Preview file name keeping the source extension, e.g. `aurora-blast_preview.png`
pub fn preview_file_name(id: &ThemeId, extension: &str) -> String {
    format!("{}_preview{}", id, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== ItemType tests ====================

    #[test]
    fn test_item_type_parse() {
        assert_eq!(ItemType::parse("Wallpaper"), Some(ItemType::Wallpaper));
        assert_eq!(
            ItemType::parse("Clock"),
            Some(ItemType::Clock {
                customizable: false
            })
        );
        assert_eq!(ItemType::parse("wallpaper"), None);
    }

    #[test]
    fn test_item_type_layout_wallpaper() {
        let item = ItemType::Wallpaper;
        assert_eq!(item.catalog_file(), "update.json");
        assert_eq!(item.catalog_key(), "themes");
        assert_eq!(item.archive_dir(), "wallpapers");
        assert_eq!(item.preview_dir(), "previews");
        assert!(!item.is_clock());
    }

    #[test]
    fn test_item_type_layout_clock() {
        let item = ItemType::Clock { customizable: true };
        assert_eq!(item.catalog_file(), "updateClock.json");
        assert_eq!(item.catalog_key(), "clockThemes");
        assert_eq!(item.archive_dir(), "clocks");
        assert_eq!(item.preview_dir(), "clock_previews");
        assert!(item.is_clock());
        assert_eq!(item.to_string(), "Clock");
    }

    // ==================== ThemeId tests ====================

    #[test]
    fn test_theme_id_already_normal() {
        let id = ThemeId::normalize("aurora-blast").unwrap();
        assert_eq!(id.as_str(), "aurora-blast");
    }

    #[test]
    fn test_theme_id_lowercases_and_hyphenates() {
        let id = ThemeId::normalize("Aurora   Blast").unwrap();
        assert_eq!(id.as_str(), "aurora-blast");
    }

    #[test]
    fn test_theme_id_strips_invalid_characters() {
        let id = ThemeId::normalize("Neon_City! v2.0").unwrap();
        assert_eq!(id.as_str(), "neoncity-v20");
    }

    #[test]
    fn test_theme_id_trims_outer_whitespace() {
        let id = ThemeId::normalize("  deep\tspace  ").unwrap();
        assert_eq!(id.as_str(), "deep-space");
    }

    #[test]
    fn test_theme_id_empty_is_rejected() {
        assert!(matches!(
            ThemeId::normalize("   "),
            Err(PublishError::Validation(_))
        ));
        assert!(matches!(
            ThemeId::normalize("!!!"),
            Err(PublishError::Validation(_))
        ));
    }

    #[test]
    fn test_theme_id_normalization_is_idempotent() {
        for raw in [
            "Aurora Blast",
            "  Mixed CASE  input ",
            "ünïcödé théme",
            "a--b",
            "tabs\tand\nnewlines",
            "x_y.z",
        ] {
            let once = ThemeId::normalize(raw).unwrap();
            let twice = ThemeId::normalize(once.as_str()).unwrap();
            assert_eq!(once, twice, "not idempotent for {:?}", raw);
        }
    }

    // ==================== parse_tags tests ====================

    #[test]
    fn test_parse_tags_drops_empty_segments() {
        assert_eq!(parse_tags("a, b ,, c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_tags_empty_input() {
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ,").is_empty());
    }

    #[test]
    fn test_parse_tags_keeps_order_and_case() {
        assert_eq!(parse_tags("Night,Aurora"), vec!["Night", "Aurora"]);
    }

    // ==================== clean_path_input tests ====================

    #[test]
    fn test_clean_path_input_strips_quotes() {
        assert_eq!(
            clean_path_input("  '/tmp/my theme'  "),
            PathBuf::from("/tmp/my theme")
        );
        assert_eq!(
            clean_path_input("\"/tmp/preview.png\"\n"),
            PathBuf::from("/tmp/preview.png")
        );
    }

    #[test]
    fn test_clean_path_input_strips_single_quote_per_side() {
        assert_eq!(clean_path_input("''x''"), PathBuf::from("'x'"));
        assert_eq!(clean_path_input("\"only-leading"), PathBuf::from("only-leading"));
    }

    #[test]
    fn test_clean_path_input_plain() {
        assert_eq!(clean_path_input("/a/b"), PathBuf::from("/a/b"));
    }

    // ==================== naming tests ====================

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("1920x1080"), "1920x1080");
        assert_eq!(sanitize_label("Dark Mode (v2)"), "Dark_Mode__v2_");
        assert_eq!(sanitize_label("a.b-c_d"), "a.b-c_d");
        assert_eq!(sanitize_label("ü"), "_");
    }

    #[test]
    fn test_archive_file_name() {
        let id = ThemeId::normalize("aurora-blast").unwrap();
        assert_eq!(
            archive_file_name(&id, "1920x1080"),
            "aurora-blast_1920x1080.zip"
        );
        assert_eq!(archive_file_name(&id, "Big Sur"), "aurora-blast_Big_Sur.zip");
    }

    #[test]
    fn test_preview_file_name() {
        let id = ThemeId::normalize("aurora-blast").unwrap();
        assert_eq!(preview_file_name(&id, ".png"), "aurora-blast_preview.png");
        assert_eq!(preview_file_name(&id, ""), "aurora-blast_preview");
    }
}
