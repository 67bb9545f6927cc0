//! Operator questions and their validators.
//!
//! The session is a fixed, ordered list of [`Question`]s. Each text answer
//! goes through the question's validator; a rejected answer is reported and
//! the same question is asked again, so validation errors never leave this
//! module. The terminal implementation uses `inquire`; tests drive the same
//! flow through a scripted [`Prompter`].

use std::path::PathBuf;

use inquire::{Confirm, InquireError, Select, Text};

use crate::error::PublishError;
use crate::theme::{clean_path_input, parse_tags, ItemType, ThemeId};
use crate::ui;

pub const DEFAULT_DESCRIPTION: &str = "A beautiful new theme for OxyGen.";
pub const DEFAULT_AUTHOR: &str = "OxyGen Team";

/// Source of operator answers
pub trait Prompter {
    /// Pick one of `options`, returning the chosen option
    fn select(&mut self, message: &str, options: &[&'static str]) -> Result<String, PublishError>;
    /// Free text; an empty answer yields `default` when one is given
    fn text(&mut self, message: &str, default: Option<&str>) -> Result<String, PublishError>;
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PublishError>;
    /// Tell the operator why an answer was rejected
    fn reject(&mut self, reason: &str);
}

impl<T: Prompter + ?Sized> Prompter for &mut T {
    fn select(&mut self, message: &str, options: &[&'static str]) -> Result<String, PublishError> {
        (**self).select(message, options)
    }

    fn text(&mut self, message: &str, default: Option<&str>) -> Result<String, PublishError> {
        (**self).text(message, default)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PublishError> {
        (**self).confirm(message, default)
    }

    fn reject(&mut self, reason: &str) {
        (**self).reject(reason)
    }
}

/// Interactive terminal prompts
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn select(&mut self, message: &str, options: &[&'static str]) -> Result<String, PublishError> {
        Select::new(message, options.to_vec())
            .prompt()
            .map(str::to_string)
            .map_err(prompt_error)
    }

    fn text(&mut self, message: &str, default: Option<&str>) -> Result<String, PublishError> {
        let mut text = Text::new(message);
        if let Some(default) = default {
            text = text.with_default(default);
        }
        text.prompt().map_err(prompt_error)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PublishError> {
        Confirm::new(message)
            .with_default(default)
            .prompt()
            .map_err(prompt_error)
    }

    fn reject(&mut self, reason: &str) {
        ui::error(reason);
    }
}

fn prompt_error(e: InquireError) -> PublishError {
    match e {
        InquireError::OperationInterrupted | InquireError::OperationCanceled => {
            PublishError::Cancelled
        }
        other => PublishError::Prompt(other.to_string()),
    }
}

/// Validated answer record
#[derive(Debug, Clone, PartialEq)]
pub struct Answers {
    pub item: ItemType,
    pub id: ThemeId,
    pub name: String,
    pub description: String,
    pub author: String,
    pub tags: Vec<String>,
    pub preview_image: PathBuf,
    /// Resolution (e.g. 1920x1080) or clock variant label
    pub resolution: String,
    pub source_folder: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question {
    ItemType,
    Id,
    Name,
    Description,
    Author,
    Tags,
    PreviewImage,
    Resolution,
    SourceFolder,
    Customizable,
}

impl Question {
    /// Asking order
    pub const ALL: [Question; 10] = [
        Question::ItemType,
        Question::Id,
        Question::Name,
        Question::Description,
        Question::Author,
        Question::Tags,
        Question::PreviewImage,
        Question::Resolution,
        Question::SourceFolder,
        Question::Customizable,
    ];

    pub fn message(self) -> &'static str {
        match self {
            Question::ItemType => "What are you publishing?",
            Question::Id => "Enter a unique Theme ID (e.g., aurora-blast):",
            Question::Name => "Enter the display name (e.g., Aurora Blast):",
            Question::Description => "Enter a short description:",
            Question::Author => "Enter the author's name:",
            Question::Tags => "Enter tags (comma-separated):",
            Question::PreviewImage => {
                "Drag and drop the preview image file here, then press Enter:"
            }
            Question::Resolution => {
                "Enter the Resolution (e.g., 1920x1080) or Clock Variant (e.g., Default):"
            }
            Question::SourceFolder => {
                "Drag and drop the theme's SOURCE FOLDER here, then press Enter:"
            }
            Question::Customizable => "Is this a customizable Clock theme?",
        }
    }

    fn default(self) -> Option<&'static str> {
        match self {
            Question::Description => Some(DEFAULT_DESCRIPTION),
            Question::Author => Some(DEFAULT_AUTHOR),
            _ => None,
        }
    }

    /// Only clock themes are asked about customization
    fn applies(self, draft: &Draft) -> bool {
        match self {
            Question::Customizable => draft.item.is_some_and(|item| item.is_clock()),
            _ => true,
        }
    }

    fn ask(self, prompter: &mut dyn Prompter, draft: &mut Draft) -> Result<(), PublishError> {
        match self {
            Question::ItemType => {
                let choice = prompter.select(self.message(), &ItemType::CHOICES)?;
                let item = ItemType::parse(&choice).ok_or_else(|| {
                    PublishError::Prompt(format!("unknown item type '{choice}'"))
                })?;
                draft.item = Some(item);
            }
            Question::Customizable => {
                let customizable = prompter.confirm(self.message(), false)?;
                draft.item = Some(ItemType::Clock { customizable });
            }
            _ => loop {
                let raw = prompter.text(self.message(), self.default())?;
                match self.accept(&raw, draft) {
                    Ok(()) => break,
                    Err(PublishError::Validation(reason)) => prompter.reject(&reason),
                    Err(e) => return Err(e),
                }
            },
        }
        Ok(())
    }

    /// Validate a text answer and record it in the draft
    fn accept(self, raw: &str, draft: &mut Draft) -> Result<(), PublishError> {
        match self {
            Question::Id => draft.id = Some(ThemeId::normalize(raw)?),
            Question::Name => {
                draft.name = Some(required(raw, "Display name cannot be empty.")?)
            }
            Question::Description => {
                draft.description = Some(or_default(raw, DEFAULT_DESCRIPTION))
            }
            Question::Author => draft.author = Some(or_default(raw, DEFAULT_AUTHOR)),
            Question::Tags => draft.tags = Some(parse_tags(raw)),
            Question::PreviewImage => draft.preview_image = Some(existing_file(raw)?),
            Question::Resolution => {
                draft.resolution = Some(required(raw, "This field cannot be empty.")?)
            }
            Question::SourceFolder => draft.source_folder = Some(existing_dir(raw)?),
            Question::ItemType | Question::Customizable => {}
        }
        Ok(())
    }
}

/// Answers collected so far
#[derive(Debug, Default)]
struct Draft {
    item: Option<ItemType>,
    id: Option<ThemeId>,
    name: Option<String>,
    description: Option<String>,
    author: Option<String>,
    tags: Option<Vec<String>>,
    preview_image: Option<PathBuf>,
    resolution: Option<String>,
    source_folder: Option<PathBuf>,
}

impl Draft {
    fn finish(self) -> Result<Answers, PublishError> {
        fn missing(what: &str) -> PublishError {
            PublishError::Prompt(format!("no answer for {what}"))
        }

        Ok(Answers {
            item: self.item.ok_or_else(|| missing("item type"))?,
            id: self.id.ok_or_else(|| missing("theme id"))?,
            name: self.name.ok_or_else(|| missing("display name"))?,
            description: self.description.ok_or_else(|| missing("description"))?,
            author: self.author.ok_or_else(|| missing("author"))?,
            tags: self.tags.ok_or_else(|| missing("tags"))?,
            preview_image: self.preview_image.ok_or_else(|| missing("preview image"))?,
            resolution: self.resolution.ok_or_else(|| missing("resolution"))?,
            source_folder: self.source_folder.ok_or_else(|| missing("source folder"))?,
        })
    }
}

/// Ask every applicable question in order and return the validated answers
pub fn collect_answers(prompter: &mut dyn Prompter) -> Result<Answers, PublishError> {
    let mut draft = Draft::default();
    for question in Question::ALL {
        if question.applies(&draft) {
            question.ask(prompter, &mut draft)?;
        }
    }
    draft.finish()
}

fn required(raw: &str, reason: &str) -> Result<String, PublishError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(PublishError::Validation(reason.to_string()));
    }
    Ok(value.to_string())
}

fn or_default(raw: &str, default: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Cleaned path that must name an existing file
pub fn existing_file(raw: &str) -> Result<PathBuf, PublishError> {
    let path = clean_path_input(raw);
    if path.is_file() {
        return Ok(path);
    }
    let reason = if path.exists() {
        format!("Not a file: {}", path.display())
    } else {
        format!("File does not exist: {}", path.display())
    };
    Err(PublishError::Validation(reason))
}

/// Cleaned path that must name an existing directory
pub fn existing_dir(raw: &str) -> Result<PathBuf, PublishError> {
    let path = clean_path_input(raw);
    if path.is_dir() {
        return Ok(path);
    }
    let reason = if path.exists() {
        format!("Path is not a directory: {}", path.display())
    } else {
        format!("Folder does not exist: {}", path.display())
    };
    Err(PublishError::Validation(reason))
}


#[cfg(test)]
mod tests {
    use super::script::{text, Reply, ScriptedPrompter};
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        preview: String,
        source: String,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let preview = temp.path().join("shot.png");
        fs::write(&preview, b"png").unwrap();
        let source = temp.path().join("theme src");
        fs::create_dir_all(&source).unwrap();
        Fixture {
            preview: preview.display().to_string(),
            source: source.display().to_string(),
            _temp: temp,
        }
    }

    fn wallpaper_script(f: &Fixture) -> Vec<Reply> {
        vec![
            Reply::Select("Wallpaper"),
            text("Aurora Blast"),
            text("Aurora Blast"),
            text(""),
            text(""),
            text("a, b ,, c"),
            text(&format!("'{}'", f.preview)),
            text("1920x1080"),
            text(&format!("\"{}\" ", f.source)),
        ]
    }

    // ==================== collect_answers tests ====================

    #[test]
    fn test_collect_wallpaper_answers() {
        let f = fixture();
        let mut prompter = ScriptedPrompter::new(wallpaper_script(&f));

        let answers = collect_answers(&mut prompter).unwrap();

        assert_eq!(answers.item, ItemType::Wallpaper);
        assert_eq!(answers.id.as_str(), "aurora-blast");
        assert_eq!(answers.name, "Aurora Blast");
        assert_eq!(answers.description, DEFAULT_DESCRIPTION);
        assert_eq!(answers.author, DEFAULT_AUTHOR);
        assert_eq!(answers.tags, vec!["a", "b", "c"]);
        assert_eq!(answers.preview_image, PathBuf::from(&f.preview));
        assert_eq!(answers.resolution, "1920x1080");
        assert_eq!(answers.source_folder, PathBuf::from(&f.source));
        assert_eq!(prompter.remaining(), 0);
        // No customization question for wallpapers
        assert_eq!(prompter.asked.len(), 9);
    }

    #[test]
    fn test_collect_clock_answers_asks_customizable() {
        let f = fixture();
        let mut script = wallpaper_script(&f);
        script[0] = Reply::Select("Clock");
        script.push(Reply::Confirm(true));
        let mut prompter = ScriptedPrompter::new(script);

        let answers = collect_answers(&mut prompter).unwrap();

        assert_eq!(answers.item, ItemType::Clock { customizable: true });
        assert_eq!(
            prompter.asked.last().map(String::as_str),
            Some(Question::Customizable.message())
        );
    }

    #[test]
    fn test_invalid_answers_are_asked_again() {
        let f = fixture();
        let script = vec![
            Reply::Select("Wallpaper"),
            text("!!!"),
            text("neon city"),
            text("   "),
            text("Neon City"),
            text("desc"),
            text("me"),
            text(""),
            text("/definitely/not/here.png"),
            text(&f.preview),
            text(" "),
            text("Default"),
            text(&f.preview),
            text(&f.source),
        ];
        let mut prompter = ScriptedPrompter::new(script);

        let answers = collect_answers(&mut prompter).unwrap();

        assert_eq!(answers.id.as_str(), "neon-city");
        assert_eq!(answers.name, "Neon City");
        assert!(answers.tags.is_empty());
        assert_eq!(answers.resolution, "Default");
        assert_eq!(prompter.rejections.len(), 5);
        assert_eq!(prompter.rejections[0], "Theme ID cannot be empty.");
        assert!(prompter.rejections[2].contains("/definitely/not/here.png"));
        assert!(prompter.rejections[4].starts_with("Path is not a directory"));
    }

    #[test]
    fn test_collect_answers_script_exhausted() {
        let mut prompter = ScriptedPrompter::new(vec![Reply::Select("Wallpaper")]);
        let result = collect_answers(&mut prompter);
        assert!(matches!(result, Err(PublishError::Prompt(_))));
    }

    // ==================== validator tests ====================

    #[test]
    fn test_existing_file_missing() {
        let err = existing_file("  '/no/such/file.png'  ").unwrap_err();
        match err {
            PublishError::Validation(reason) => assert!(reason.contains("/no/such/file.png")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_existing_dir_missing() {
        let err = existing_dir("/no/such/folder").unwrap_err();
        assert!(matches!(err, PublishError::Validation(ref r) if r.starts_with("Folder does not exist")));
    }

    #[test]
    fn test_required_trims() {
        assert_eq!(required("  Aurora ", "x").unwrap(), "Aurora");
        assert!(required("   ", "x").is_err());
    }

    #[test]
    fn test_or_default() {
        assert_eq!(or_default("", DEFAULT_AUTHOR), DEFAULT_AUTHOR);
        assert_eq!(or_default(" Jane ", DEFAULT_AUTHOR), "Jane");
    }

    #[test]
    fn test_prompt_error_mapping() {
        assert!(matches!(
            prompt_error(InquireError::OperationInterrupted),
            PublishError::Cancelled
        ));
        assert!(matches!(
            prompt_error(InquireError::NotTTY),
            PublishError::Prompt(_)
        ));
    }
}
