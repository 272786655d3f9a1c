//! Terminal colors for human output.
//!
//! Colors are semantic (scope, status, score, diff) and are dropped entirely
//! when the terminal or environment does not want them.

use std::io::IsTerminal;

use colored::{ColoredString, Colorize};

use crate::core::Scope;
use crate::similarity::DiffLineType;
use crate::sync::SyncAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSupport {
    /// `NO_COLOR`, `TERM=dumb` or piped output.
    None,
    Basic,
}

impl ColorSupport {
    /// Detect from the environment; `NO_COLOR` wins over `FORCE_COLOR`.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_env(
            |key| std::env::var(key).ok(),
            std::io::stdout().is_terminal(),
        )
    }

    pub fn from_env<F>(lookup: F, is_tty: bool) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if lookup("NO_COLOR").is_some() {
            return Self::None;
        }
        if lookup("FORCE_COLOR").is_some() {
            return Self::Basic;
        }
        if !is_tty || lookup("TERM").is_some_and(|term| term == "dumb") {
            return Self::None;
        }
        Self::Basic
    }

    #[must_use]
    pub const fn has_color(self) -> bool {
        matches!(self, Self::Basic)
    }
}

impl Default for ColorSupport {
    fn default() -> Self {
        Self::detect()
    }
}

/// Pre-built styles used by the commands.
pub struct Styles;

impl Styles {
    pub fn success<S: AsRef<str>>(text: S) -> ColoredString {
        text.as_ref().green().bold()
    }

    pub fn error<S: AsRef<str>>(text: S) -> ColoredString {
        text.as_ref().red().bold()
    }

    pub fn warning<S: AsRef<str>>(text: S) -> ColoredString {
        text.as_ref().yellow()
    }

    pub fn muted<S: AsRef<str>>(text: S) -> ColoredString {
        text.as_ref().bright_black()
    }

    pub fn skill_name<S: AsRef<str>>(text: S) -> ColoredString {
        text.as_ref().cyan().bold()
    }

    pub fn path<S: AsRef<str>>(text: S) -> ColoredString {
        text.as_ref().underline()
    }

    pub fn scope<S: AsRef<str>>(text: S, scope: Scope) -> ColoredString {
        let text = text.as_ref();
        match scope {
            Scope::Repo => text.yellow(),
            Scope::User => text.magenta(),
            Scope::Plugin => text.cyan(),
            Scope::System | Scope::Admin | Scope::Builtin => text.blue(),
        }
    }

    /// Green at 0.8 and above, yellow from 0.5, red below.
    pub fn score<S: AsRef<str>>(text: S, value: f64) -> ColoredString {
        let text = text.as_ref();
        if value >= 0.8 {
            text.green()
        } else if value >= 0.5 {
            text.yellow()
        } else {
            text.red()
        }
    }

    pub fn diff<S: AsRef<str>>(text: S, line_type: DiffLineType) -> ColoredString {
        let text = text.as_ref();
        match line_type {
            DiffLineType::Added => text.green(),
            DiffLineType::Removed => text.red(),
            DiffLineType::Context => text.normal(),
        }
    }

    pub fn action(action: SyncAction) -> ColoredString {
        let text = action.as_str();
        match action {
            SyncAction::Create => text.green(),
            SyncAction::Overwrite | SyncAction::BackupOverwrite => text.yellow(),
            SyncAction::MergeWrite => text.magenta(),
            SyncAction::Skip => text.bright_black(),
        }
    }
}

/// Apply `style` only when colors are supported.
pub fn styled<S, F>(text: S, style: F, support: ColorSupport) -> String
where
    S: AsRef<str>,
    F: FnOnce(S) -> ColoredString,
{
    if support.has_color() {
        style(text).to_string()
    } else {
        text.as_ref().to_string()
    }
}

/// Keep a prebuilt colored string only when colors are supported.
#[must_use]
pub fn with_color(colored: ColoredString, support: ColorSupport) -> String {
    if support.has_color() {
        colored.to_string()
    } else {
        colored.input.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn detection_rules() {
        assert_eq!(ColorSupport::from_env(env(&[("NO_COLOR", "1")]), true), ColorSupport::None);
        assert_eq!(
            ColorSupport::from_env(env(&[("NO_COLOR", "1"), ("FORCE_COLOR", "1")]), true),
            ColorSupport::None
        );
        assert_eq!(ColorSupport::from_env(env(&[("FORCE_COLOR", "1")]), false), ColorSupport::Basic);
        assert_eq!(ColorSupport::from_env(env(&[("TERM", "dumb")]), true), ColorSupport::None);
        assert_eq!(ColorSupport::from_env(env(&[]), false), ColorSupport::None);
        assert_eq!(ColorSupport::from_env(env(&[]), true), ColorSupport::Basic);
    }

    #[test]
    fn plain_when_unsupported() {
        assert_eq!(styled("ok", Styles::success, ColorSupport::None), "ok");
        assert_eq!(with_color(Styles::action(SyncAction::Create), ColorSupport::None), "create");
    }
}
