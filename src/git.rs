//! Version-control bridge over the `git` command line.
//!
//! Every operation runs synchronously in the repository root and either
//! returns trimmed stdout or fails with [`PublishError::CommandFailed`]
//! carrying the captured stderr. Nothing is retried.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::PublishError;

/// Commit message used when the tool creates the ignore file
pub const IGNORE_COMMIT_MESSAGE: &str = "chore: Add .gitignore for tools";

/// Version-control operations used by the publisher
pub trait Vcs {
    /// `git status --porcelain [pathspec]`
    fn status(&self, pathspec: Option<&str>) -> Result<String, PublishError>;
    fn add(&self, pathspecs: &[&str]) -> Result<String, PublishError>;
    fn commit(&self, message: &str) -> Result<String, PublishError>;
    /// Pull the remote tracking branch
    fn pull(&self) -> Result<String, PublishError>;
    /// Push to the remote tracking branch
    fn push(&self) -> Result<String, PublishError>;
    /// Stash tracked and untracked changes. Returns whether an entry was created.
    fn stash(&self) -> Result<bool, PublishError>;
    fn stash_pop(&self) -> Result<String, PublishError>;
}

impl<T: Vcs + ?Sized> Vcs for &T {
    fn status(&self, pathspec: Option<&str>) -> Result<String, PublishError> {
        (**self).status(pathspec)
    }

    fn add(&self, pathspecs: &[&str]) -> Result<String, PublishError> {
        (**self).add(pathspecs)
    }

    fn commit(&self, message: &str) -> Result<String, PublishError> {
        (**self).commit(message)
    }

    fn pull(&self) -> Result<String, PublishError> {
        (**self).pull()
    }

    fn push(&self) -> Result<String, PublishError> {
        (**self).push()
    }

    fn stash(&self) -> Result<bool, PublishError> {
        (**self).stash()
    }

    fn stash_pop(&self) -> Result<String, PublishError> {
        (**self).stash_pop()
    }
}

/// `git` executable driven through `std::process::Command`
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
    remote: String,
    branch: String,
    verbose: bool,
}

impl GitCli {
    pub fn new(root: &Path, remote: &str, branch: &str, verbose: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            remote: remote.to_string(),
            branch: branch.to_string(),
            verbose,
        }
    }

    /// Run `git <args>` in the repository root
    fn run(&self, args: &[&str]) -> Result<String, PublishError> {
        let command = format!("git {}", args.join(" "));
        if self.verbose {
            eprintln!("$ {command}");
        }

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|source| PublishError::CommandSpawn {
                command: command.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if self.verbose {
            if !stdout.is_empty() {
                eprintln!("{stdout}");
            }
            if !stderr.is_empty() {
                eprintln!("{stderr}");
            }
        }

        if output.status.success() {
            Ok(stdout)
        } else {
            Err(PublishError::CommandFailed {
                command,
                code: output.status.code().unwrap_or(-1),
                stderr,
            })
        }
    }

    /// Commit id of the newest stash entry, if any
    fn stash_head(&self) -> Result<Option<String>, PublishError> {
        match self.run(&["rev-parse", "-q", "--verify", "refs/stash"]) {
            Ok(id) => Ok(Some(id)),
            Err(PublishError::CommandFailed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Vcs for GitCli {
    fn status(&self, pathspec: Option<&str>) -> Result<String, PublishError> {
        match pathspec {
            Some(path) => self.run(&["status", "--porcelain", "--", path]),
            None => self.run(&["status", "--porcelain"]),
        }
    }

    fn add(&self, pathspecs: &[&str]) -> Result<String, PublishError> {
        let mut args = vec!["add", "--"];
        args.extend_from_slice(pathspecs);
        self.run(&args)
    }

    fn commit(&self, message: &str) -> Result<String, PublishError> {
        self.run(&["commit", "-m", message])
    }

    fn pull(&self) -> Result<String, PublishError> {
        self.run(&["pull", &self.remote, &self.branch])
    }

    fn push(&self) -> Result<String, PublishError> {
        self.run(&["push", &self.remote, &self.branch])
    }

    fn stash(&self) -> Result<bool, PublishError> {
        let before = self.stash_head()?;
        self.run(&["stash", "push", "--include-untracked"])?;
        let after = self.stash_head()?;
        Ok(after.is_some() && after != before)
    }

    fn stash_pop(&self) -> Result<String, PublishError> {
        self.run(&["stash", "pop"])
    }
}

/// Porcelain status line marks an untracked path
pub fn is_untracked(status: &str) -> bool {
    status.starts_with("??")
}

/// `Publish <ItemType>: <name> - <label> (v<version>)`
pub fn publish_commit_message(item: &str, name: &str, label: &str, version: u32) -> String {
    format!("Publish {item}: {name} - {label} (v{version})")
}
