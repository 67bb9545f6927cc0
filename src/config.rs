//! CLI configuration and runtime settings for publishing.

use clap::Parser;
use std::path::{Path, PathBuf};

use crate::paths::relative_posix;
use crate::theme::{archive_file_name, preview_file_name, ItemType, ThemeId};

/// Interactive publisher for wallpaper and clock themes
#[derive(Parser, Debug)]
#[command(name = "theme-publisher")]
#[command(version)]
#[command(about = "Publish wallpaper and clock themes to a content repository")]
pub struct Cli {
    /// Content repository root
    #[arg(default_value = ".")]
    pub repo_root: PathBuf,

    /// GitHub account owning the content repository
    #[arg(long, default_value = "Adaxhhh")]
    pub github_user: String,

    /// GitHub repository name
    #[arg(long, default_value = "Depthify-Wallpaper-Repo")]
    pub github_repo: String,

    /// Remote tracking branch to pull from and push to
    #[arg(short, long, default_value = "main")]
    pub branch: String,

    /// Git remote name
    #[arg(short, long, default_value = "origin")]
    pub remote: String,

    /// Base URL for published files (overrides the raw.githubusercontent.com URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Runtime configuration parsed from CLI
#[derive(Debug, Clone)]
pub struct Config {
    /// Content repository root
    pub repo_root: PathBuf,
    /// Prefix of every published URL, always ending in `/`
    pub base_url: String,
    /// Git remote name
    pub remote: String,
    /// Remote tracking branch
    pub branch: String,
    /// Enable verbose output
    pub verbose: bool,
}

impl Config {
    /// Create Config from CLI arguments
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let repo_root = cli.repo_root.canonicalize().unwrap_or(cli.repo_root);

        if cli.branch.trim().is_empty() {
            anyhow::bail!("branch name cannot be empty");
        }
        if cli.remote.trim().is_empty() {
            anyhow::bail!("remote name cannot be empty");
        }

        let base_url = match cli.base_url {
            Some(url) if url.trim().is_empty() => anyhow::bail!("base URL cannot be empty"),
            Some(url) => url.trim().to_string(),
            None => format!(
                "https://raw.githubusercontent.com/{}/{}/{}/",
                cli.github_user, cli.github_repo, cli.branch
            ),
        };

        Ok(Config {
            repo_root,
            base_url: with_trailing_slash(base_url),
            remote: cli.remote,
            branch: cli.branch,
            verbose: cli.verbose,
        })
    }

    /// Catalog file for an item type
    pub fn catalog_path(&self, item: &ItemType) -> PathBuf {
        self.repo_root.join(item.catalog_file())
    }

    /// `<root>/<wallpapers|clocks>/<id>/<id>_<label>.zip`
    pub fn archive_path(&self, item: &ItemType, id: &ThemeId, label: &str) -> PathBuf {
        self.repo_root
            .join(item.archive_dir())
            .join(id.as_str())
            .join(archive_file_name(id, label))
    }

    /// `<root>/<previews|clock_previews>/<id>_preview<ext>`
    pub fn preview_path(&self, item: &ItemType, id: &ThemeId, extension: &str) -> PathBuf {
        self.repo_root
            .join(item.preview_dir())
            .join(preview_file_name(id, extension))
    }

    /// Ignore file at the repository root
    pub fn ignore_file(&self) -> PathBuf {
        self.repo_root.join(".gitignore")
    }

    /// Public URL of a file inside the repository
    pub fn remote_url(&self, path: &Path) -> String {
        format!("{}{}", self.base_url, relative_posix(&self.repo_root, path))
    }
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_cli(base_url: Option<&str>, branch: &str, verbose: bool) -> Cli {
        Cli {
            repo_root: PathBuf::from("/nonexistent/repo"),
            github_user: "Adaxhhh".to_string(),
            github_repo: "Depthify-Wallpaper-Repo".to_string(),
            branch: branch.to_string(),
            remote: "origin".to_string(),
            base_url: base_url.map(str::to_string),
            verbose,
        }
    }

    // ==================== Cli tests ====================

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["theme-publisher"]);
        assert_eq!(cli.repo_root, PathBuf::from("."));
        assert_eq!(cli.branch, "main");
        assert_eq!(cli.remote, "origin");
        assert!(cli.base_url.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "theme-publisher",
            "/srv/themes",
            "--branch",
            "release",
            "--base-url",
            "https://cdn.example.com/themes",
            "-v",
        ]);
        assert_eq!(cli.repo_root, PathBuf::from("/srv/themes"));
        assert_eq!(cli.branch, "release");
        assert_eq!(cli.base_url.as_deref(), Some("https://cdn.example.com/themes"));
        assert!(cli.verbose);
    }

    // ==================== Config::from_cli tests ====================

    #[test]
    fn test_config_from_cli_default_base_url() {
        let config = Config::from_cli(make_cli(None, "main", false)).unwrap();

        assert_eq!(
            config.base_url,
            "https://raw.githubusercontent.com/Adaxhhh/Depthify-Wallpaper-Repo/main/"
        );
        assert_eq!(config.remote, "origin");
        assert_eq!(config.branch, "main");
        assert!(!config.verbose);
    }

    #[test]
    fn test_config_from_cli_base_url_gets_trailing_slash() {
        let config =
            Config::from_cli(make_cli(Some("https://cdn.example.com/t"), "main", true)).unwrap();

        assert_eq!(config.base_url, "https://cdn.example.com/t/");
        assert!(config.verbose);
    }

    #[test]
    fn test_config_from_cli_keeps_uncanonicalizable_root() {
        let config = Config::from_cli(make_cli(None, "main", false)).unwrap();
        assert_eq!(config.repo_root, PathBuf::from("/nonexistent/repo"));
    }

    #[test]
    fn test_config_from_cli_empty_branch() {
        assert!(Config::from_cli(make_cli(None, " ", false)).is_err());
    }

    #[test]
    fn test_config_from_cli_empty_base_url() {
        assert!(Config::from_cli(make_cli(Some(""), "main", false)).is_err());
    }

    // ==================== layout tests ====================

    #[test]
    fn test_config_wallpaper_layout() {
        let config = Config::from_cli(make_cli(None, "main", false)).unwrap();
        let id = ThemeId::normalize("aurora-blast").unwrap();
        let item = ItemType::Wallpaper;

        assert_eq!(
            config.catalog_path(&item),
            PathBuf::from("/nonexistent/repo/update.json")
        );
        let archive = config.archive_path(&item, &id, "1920x1080");
        assert_eq!(
            archive,
            PathBuf::from("/nonexistent/repo/wallpapers/aurora-blast/aurora-blast_1920x1080.zip")
        );
        assert_eq!(
            config.remote_url(&archive),
            "https://raw.githubusercontent.com/Adaxhhh/Depthify-Wallpaper-Repo/main/wallpapers/aurora-blast/aurora-blast_1920x1080.zip"
        );
    }

    #[test]
    fn test_config_clock_layout() {
        let config = Config::from_cli(make_cli(Some("https://x.test/"), "main", false)).unwrap();
        let id = ThemeId::normalize("minimal").unwrap();
        let item = ItemType::Clock { customizable: true };

        let preview = config.preview_path(&item, &id, ".webp");
        assert_eq!(
            preview,
            PathBuf::from("/nonexistent/repo/clock_previews/minimal_preview.webp")
        );
        assert_eq!(
            config.remote_url(&preview),
            "https://x.test/clock_previews/minimal_preview.webp"
        );
        assert_eq!(
            config.catalog_path(&item),
            PathBuf::from("/nonexistent/repo/updateClock.json")
        );
        assert_eq!(config.ignore_file(), PathBuf::from("/nonexistent/repo/.gitignore"));
    }

    #[test]
    fn test_config_clone() {
        let config = Config::from_cli(make_cli(None, "main", true)).unwrap();
        let cloned = config.clone();
        assert_eq!(config.base_url, cloned.base_url);
        assert_eq!(config.repo_root, cloned.repo_root);
        assert_eq!(config.verbose, cloned.verbose);
    }
}
