//! Publishing orchestration.
//!
//! Runs the fixed sequence:
//!
//! ```text
//! CheckRepoStatus -> (Pull) -> CollectAnswers -> BuildArchive -> CopyPreview
//!   -> MergeCatalog -> WriteCatalog -> CommitAndPush -> (always) RestoreStash
//! ```
//!
//! Declining to stash a dirty working tree ends in [`Outcome::Aborted`]
//! before anything is written. Any later error ends in [`Outcome::Failed`];
//! files written by earlier steps are left in place. Either way, changes
//! stashed at the start are popped again before [`Publisher::run`] returns.

use std::error::Error as StdError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::{ProgressBar, ProgressStyle};

use crate::archive::build_archive;
use crate::catalog::{
    Catalog, CatalogSource, ClockFields, MergeReport, ResolutionChange, ThemeChange, ThemeKind,
    ThemeUpdate, WallpaperFields,
};
use crate::config::Config;
use crate::error::PublishError;
use crate::git::{is_untracked, publish_commit_message, Vcs, IGNORE_COMMIT_MESSAGE};
use crate::paths::{copy_file, extension_with_dot, relative_posix};
use crate::prompt::{collect_answers, Answers, Prompter};
use crate::theme::{ItemType, ThemeId};
use crate::ui::{self, Symbol};

/// Entries written to a freshly created ignore file
pub const IGNORE_FILE_CONTENTS: &str = "target/\n";

const PUBLISH_STEPS: usize = 4;

/// Step of the publishing sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CheckRepoStatus,
    Pull,
    CollectAnswers,
    BuildArchive,
    CopyPreview,
    MergeCatalog,
    WriteCatalog,
    CommitAndPush,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::CheckRepoStatus => "checking repository status",
            Stage::Pull => "pulling latest changes",
            Stage::CollectAnswers => "collecting answers",
            Stage::BuildArchive => "building archive",
            Stage::CopyPreview => "copying preview image",
            Stage::MergeCatalog => "updating catalog",
            Stage::WriteCatalog => "writing catalog",
            Stage::CommitAndPush => "committing and pushing",
        }
    }
}

/// What a completed publish produced
#[derive(Debug, Clone)]
pub struct PublishSummary {
    pub item: ItemType,
    pub id: ThemeId,
    pub resolution: String,
    pub version: u32,
    pub size_mb: f64,
    pub archive: PathBuf,
    pub preview: PathBuf,
    pub catalog: PathBuf,
    pub commit_message: String,
}

/// Terminal state of a publish run
#[derive(Debug)]
pub enum Outcome {
    Completed(PublishSummary),
    /// Dirty working tree and the operator declined to stash
    Aborted,
    /// Interrupted by the operator
    Cancelled { stage: Stage },
    Failed { stage: Stage, error: PublishError },
}

/// Result of popping changes stashed before publishing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StashRestore {
    NotStashed,
    Restored,
    /// Needs a manual `git stash pop`
    Failed(String),
}

#[derive(Debug)]
pub struct PublishReport {
    pub outcome: Outcome,
    pub stash: StashRestore,
}

impl PublishReport {
    /// Process exit code for this report
    pub fn exit_code(&self) -> u8 {
        match self.outcome {
            Outcome::Completed(_) => 0,
            Outcome::Aborted => 1,
            Outcome::Failed { .. } => 2,
            Outcome::Cancelled { .. } => 130,
        }
    }
}

type StageResult<T> = Result<T, (Stage, PublishError)>;

/// Attach the failing stage to an error
fn at(stage: Stage) -> impl Fn(PublishError) -> (Stage, PublishError) {
    move |error| (stage, error)
}

pub struct Publisher<'a, V: Vcs, P: Prompter> {
    config: &'a Config,
    vcs: V,
    prompter: P,
    shutdown: &'a AtomicBool,
}

impl<'a, V: Vcs, P: Prompter> Publisher<'a, V, P> {
    pub fn new(config: &'a Config, vcs: V, prompter: P, shutdown: &'a AtomicBool) -> Self {
        Self {
            config,
            vcs,
            prompter,
            shutdown,
        }
    }

    /// Run the whole sequence, always restoring stashed changes at the end
    pub fn run(&mut self) -> PublishReport {
        ui::banner();

        let mut stashed = false;
        let outcome = match self.publish(&mut stashed) {
            Ok(summary) => {
                ui::section("🎉 PUBLISHING COMPLETE! 🎉");
                Outcome::Completed(summary)
            }
            Err((_, PublishError::Aborted)) => Outcome::Aborted,
            Err((stage, PublishError::Cancelled)) => {
                ui::error(&format!("Publishing interrupted while {}.", stage.as_str()));
                Outcome::Cancelled { stage }
            }
            Err((stage, error)) => {
                report_failure(stage, &error);
                Outcome::Failed { stage, error }
            }
        };

        let stash = if stashed {
            self.restore_stash()
        } else {
            StashRestore::NotStashed
        };

        PublishReport { outcome, stash }
    }

    fn publish(&mut self, stashed: &mut bool) -> StageResult<PublishSummary> {
        *stashed = self
            .prepare_repository()
            .map_err(at(Stage::CheckRepoStatus))?;

        self.checkpoint(Stage::Pull)?;
        let pull = self
            .prompter
            .confirm("Pull the latest changes from GitHub first? (Recommended)", true)
            .map_err(at(Stage::Pull))?;
        if pull {
            ui::info(&format!(
                "\nPulling latest changes from {}/{}...",
                self.config.remote, self.config.branch
            ));
            self.vcs.pull().map_err(at(Stage::Pull))?;
            ui::success("Pull complete.\n");
        }

        self.checkpoint(Stage::CollectAnswers)?;
        let answers = collect_answers(&mut self.prompter).map_err(at(Stage::CollectAnswers))?;

        match answers.item {
            ItemType::Wallpaper => self.publish_answers::<WallpaperFields>(&answers),
            ItemType::Clock { .. } => self.publish_answers::<ClockFields>(&answers),
        }
    }

    /// Commit a new ignore file on its own, then stash or abort on a dirty tree.
    /// Returns whether changes were stashed.
    fn prepare_repository(&mut self) -> Result<bool, PublishError> {
        ui::info(&format!(
            "{} Checking repository status...",
            Symbol::Magnify.as_str()
        ));
        self.ensure_ignore_file()?;

        let status = self.vcs.status(None)?;
        if status.is_empty() {
            ui::success("Repository is clean.");
            return Ok(false);
        }

        ui::warn("\nYour repository has other uncommitted changes:");
        ui::detail(&status);
        let stash = self
            .prompter
            .confirm("Do you want to temporarily stash these changes to proceed?", true)?;
        if !stash {
            ui::error("Publishing cancelled. Please commit or stash your changes manually.");
            return Err(PublishError::Aborted);
        }

        ui::info("Stashing changes...");
        if !self.vcs.stash()? {
            ui::error("Nothing could be stashed. Please commit or stash your changes manually.");
            return Err(PublishError::Aborted);
        }
        Ok(true)
    }

    fn ensure_ignore_file(&mut self) -> Result<(), PublishError> {
        let path = self.config.ignore_file();
        if !path.exists() {
            let create = self.prompter.confirm(
                ".gitignore file not found. It's recommended to create one to ignore build output. Create it now?",
                true,
            )?;
            if create {
                fs::write(&path, IGNORE_FILE_CONTENTS)?;
                ui::success(".gitignore created and configured.");
            }
        }

        // Must land before the cleanliness check so it does not count as a change
        let status = self.vcs.status(Some(".gitignore"))?;
        if is_untracked(&status) {
            ui::info("Adding new .gitignore file to version control...");
            self.vcs.add(&[".gitignore"])?;
            self.vcs.commit(IGNORE_COMMIT_MESSAGE)?;
            ui::success("Committed .gitignore.");
        }
        Ok(())
    }

    fn publish_answers<K: ThemeKind>(&mut self, answers: &Answers) -> StageResult<PublishSummary> {
        let config = self.config;
        let root = &config.repo_root;
        ui::section(&format!(
            "{} Starting Publishing Process...",
            Symbol::Package.as_str()
        ));

        // 1. Archive
        self.checkpoint(Stage::BuildArchive)?;
        let archive = config.archive_path(&answers.item, &answers.id, &answers.resolution);
        ui::step(
            1,
            PUBLISH_STEPS,
            &format!("Zipping folder: {}", answers.source_folder.display()),
        );
        let progress = config.verbose.then(archive_progress_bar);
        let size_mb = build_archive(
            &answers.source_folder,
            &archive,
            self.shutdown,
            progress.as_ref(),
        )
        .map_err(at(Stage::BuildArchive))?;
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        ui::done(
            Symbol::Check,
            &format!(
                "Zip created at: {} ({} MB)",
                relative_posix(root, &archive),
                size_mb
            ),
        );

        // 2. Preview
        self.checkpoint(Stage::CopyPreview)?;
        ui::step(2, PUBLISH_STEPS, "Copying preview image...");
        let extension = extension_with_dot(&answers.preview_image);
        let preview = config.preview_path(&answers.item, &answers.id, &extension);
        copy_file(&answers.preview_image, &preview).map_err(at(Stage::CopyPreview))?;
        ui::done(
            Symbol::Check,
            &format!("Preview saved to: {}", relative_posix(root, &preview)),
        );

        // 3. Catalog
        self.checkpoint(Stage::MergeCatalog)?;
        let catalog = config.catalog_path(&answers.item);
        ui::step(
            3,
            PUBLISH_STEPS,
            &format!("Updating catalog file: {}", answers.item.catalog_file()),
        );
        let report = self.update_catalog::<K>(&catalog, answers, &archive, &preview, size_mb)?;

        // 4. Git
        self.checkpoint(Stage::CommitAndPush)?;
        ui::step(4, PUBLISH_STEPS, "Committing and pushing to GitHub...");
        let commit_message = publish_commit_message(
            answers.item.as_str(),
            &answers.name,
            &answers.resolution,
            report.version,
        );
        self.commit_and_push(&commit_message)
            .map_err(at(Stage::CommitAndPush))?;

        Ok(PublishSummary {
            item: answers.item,
            id: answers.id.clone(),
            resolution: answers.resolution.clone(),
            version: report.version,
            size_mb,
            archive,
            preview,
            catalog,
            commit_message,
        })
    }

    fn update_catalog<K: ThemeKind>(
        &mut self,
        path: &Path,
        answers: &Answers,
        archive: &Path,
        preview: &Path,
        size_mb: f64,
    ) -> StageResult<MergeReport> {
        let (mut catalog, source) = Catalog::<K>::load(path).map_err(at(Stage::MergeCatalog))?;
        match source {
            CatalogSource::Existing => {}
            CatalogSource::Missing => {
                ui::warn("Catalog file not found. A new one will be created.");
            }
            CatalogSource::Invalid { backup, reason } => {
                ui::warn(&format!(
                    "Catalog file is invalid ({reason}). A copy was saved to {} and a new one will be created.",
                    relative_posix(&self.config.repo_root, &backup)
                ));
            }
        }

        let item = answers.item;
        let label = item.as_str().to_lowercase();
        let report = catalog.merge(ThemeUpdate {
            id: answers.id.to_string(),
            name: answers.name.clone(),
            description: answers.description.clone(),
            author: answers.author.clone(),
            tags: answers.tags.clone(),
            preview_url: self.config.remote_url(preview),
            kind: K::from_item(&item),
            resolution: answers.resolution.clone(),
            download_url: self.config.remote_url(archive),
            size_mb,
        });

        match report.theme {
            ThemeChange::Added => ui::done(
                Symbol::Star,
                &format!("New {label} '{}' added to catalog.", answers.id),
            ),
            ThemeChange::MetadataUpdated => ui::done(
                Symbol::Recycle,
                &format!("Updating metadata for existing {label} '{}'.", answers.id),
            ),
        }
        match report.resolution {
            ResolutionChange::Added => ui::done(
                Symbol::Star,
                &format!("New resolution/variant '{}' added.", answers.resolution),
            ),
            ResolutionChange::Updated => ui::done(
                Symbol::Recycle,
                &format!(
                    "Updated resolution/variant '{}' to version {}.",
                    answers.resolution, report.version
                ),
            ),
        }

        self.checkpoint(Stage::WriteCatalog)?;
        catalog.save(path).map_err(at(Stage::WriteCatalog))?;
        ui::done(Symbol::Check, "Catalog file successfully written.");

        Ok(report)
    }

    fn commit_and_push(&mut self, message: &str) -> Result<(), PublishError> {
        // "." also picks up new archive and preview directories
        self.vcs.add(&["."])?;
        self.vcs.commit(message)?;
        ui::done(
            Symbol::Commit,
            &format!("Changes committed with message: \"{message}\""),
        );

        ui::done(
            Symbol::Clock,
            &format!(
                "Pushing to {}/{}...",
                self.config.remote, self.config.branch
            ),
        );
        self.vcs.push()?;
        ui::done(Symbol::Push, "Push complete.");
        Ok(())
    }

    fn restore_stash(&mut self) -> StashRestore {
        ui::info("\nRestoring your previously stashed changes...");
        match self.vcs.stash_pop() {
            Ok(_) => {
                ui::success("Stash restored successfully.");
                StashRestore::Restored
            }
            Err(e) => {
                ui::warn("Could not automatically restore stash. A merge conflict may have occurred.");
                ui::warn("Please run `git stash pop` manually to resolve it.");
                StashRestore::Failed(e.to_string())
            }
        }
    }

    fn checkpoint(&self, stage: Stage) -> StageResult<()> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err((stage, PublishError::Cancelled));
        }
        Ok(())
    }
}

fn archive_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

fn report_failure(stage: Stage, error: &PublishError) {
    ui::error("--- PUBLISHING FAILED ---");
    ui::error(&format!("An error occurred while {}:", stage.as_str()));
    ui::detail(&error_chain(error));
}

/// `error: cause: cause` over the whole source chain
pub fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
