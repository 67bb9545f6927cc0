//! # Theme Publisher
//!
//! Interactive publishing tool for wallpaper and clock themes kept in a
//! git-hosted content repository.
//!
//! One run asks the operator about a theme, zips its source folder into the
//! repository, copies its preview image, merges a versioned entry into the
//! JSON catalog for its item type and commits and pushes the result.
//!
//! ## Features
//!
//! - Per-resolution version counters in the catalog
//! - Stash and restore of unrelated uncommitted changes
//! - Corrupt catalog files backed up before being replaced
//! - Interruptible archive builds
//!
//! ## Usage
//!
//! ```ignore
//! use theme_publisher::catalog::{Catalog, WallpaperFields};
//!
//! let (catalog, source) = Catalog::<WallpaperFields>::load(&repo_root.join("update.json"))?;
//! ```

/// Source folder archiving
pub mod archive;

/// JSON catalog model and merge rules
pub mod catalog;

/// CLI configuration and argument parsing
pub mod config;

/// Error types for publishing operations
pub mod error;

/// Version-control operations
pub mod git;

/// Path and file helpers
pub mod paths;

/// Interactive question flow
pub mod prompt;

/// Publishing orchestration
pub mod publisher;

/// Item types, theme ids and naming rules
pub mod theme;

/// Terminal status output
pub mod ui;
