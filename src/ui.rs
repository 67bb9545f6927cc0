//! Terminal status output.
//!
//! Emoji symbols fall back to ASCII on Windows consoles.

use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Rocket,
    Magnify,
    Cross,
    Check,
    Warn,
    Package,
    Commit,
    Push,
    Star,
    Recycle,
    Clock,
}

impl Symbol {
    pub fn as_str(self) -> &'static str {
        if cfg!(windows) {
            self.ascii()
        } else {
            self.emoji()
        }
    }

    fn emoji(self) -> &'static str {
        match self {
            Symbol::Rocket => "🚀",
            Symbol::Magnify => "🔍",
            Symbol::Cross => "❌",
            Symbol::Check => "✅",
            Symbol::Warn => "⚠️",
            Symbol::Package => "📦",
            Symbol::Commit => "📝",
            Symbol::Push => "📤",
            Symbol::Star => "✨",
            Symbol::Recycle => "♻️",
            Symbol::Clock => "⏳",
        }
    }

    fn ascii(self) -> &'static str {
        match self {
            Symbol::Cross => "[x]",
            Symbol::Check => "[v]",
            Symbol::Warn => "[!]",
            Symbol::Package => "[P]",
            Symbol::Star => "*",
            Symbol::Rocket
            | Symbol::Magnify
            | Symbol::Commit
            | Symbol::Push
            | Symbol::Recycle
            | Symbol::Clock => ">>",
        }
    }
}

pub fn banner() {
    println!("====================================");
    println!(
        "{}",
        format!("{} Welcome to the OxyGen Publisher!", Symbol::Rocket.as_str())
            .cyan()
            .bold()
    );
    println!("====================================\n");
}

/// Section header between the repository checks and the publishing steps
pub fn section(title: &str) {
    println!("{}", "\n---------------------------------".cyan());
    println!("{}", title.cyan().bold());
    println!("{}", "---------------------------------\n".cyan());
}

/// `[n/total] message`
pub fn step(n: usize, total: usize, message: &str) {
    println!("{}", format!("\n[{n}/{total}] {message}").blue());
}

pub fn info(message: &str) {
    println!("{}", message.blue());
}

/// Indented success line with a leading symbol
pub fn done(symbol: Symbol, message: &str) {
    println!("{}", format!("      {} {message}", symbol.as_str()).green());
}

pub fn success(message: &str) {
    println!("{}", format!("{} {message}", Symbol::Check.as_str()).green());
}

pub fn warn(message: &str) {
    eprintln!("{}", format!("{} {message}", Symbol::Warn.as_str()).yellow());
}

pub fn error(message: &str) {
    eprintln!("{}", format!("{} {message}", Symbol::Cross.as_str()).red());
}

/// Dimmed block, e.g. porcelain status output
pub fn detail(message: &str) {
    println!("{}", message.dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_fallbacks_are_ascii() {
        for symbol in [
            Symbol::Rocket,
            Symbol::Magnify,
            Symbol::Cross,
            Symbol::Check,
            Symbol::Warn,
            Symbol::Package,
            Symbol::Commit,
            Symbol::Push,
            Symbol::Star,
            Symbol::Recycle,
            Symbol::Clock,
        ] {
            assert!(symbol.ascii().is_ascii());
            assert!(!symbol.emoji().is_ascii());
        }
    }

    #[test]
    fn test_symbol_as_str_matches_platform() {
        let expected = if cfg!(windows) { "[v]" } else { "✅" };
        assert_eq!(Symbol::Check.as_str(), expected);
    }
}
