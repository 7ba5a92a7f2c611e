//! Input sanitizing strategies
//!
//! A formatter turns the raw text of the input field into the search term the
//! controller works with. Formatters are pure and total; the controller only
//! depends on the [`Formatter`] trait so each widget can plug in its own.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

/// Strategy applied to every raw input value before it reaches the controller
pub trait Formatter: Send + Sync {
    fn format(&self, raw: &str) -> String;
}

impl<F> Formatter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn format(&self, raw: &str) -> String {
        self(raw)
    }
}

/// Strips leading whitespace and collapses runs of two or more whitespace
/// characters into a single space.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatter;

impl Formatter for DefaultFormatter {
    fn format(&self, raw: &str) -> String {
        tidy_whitespace(raw)
    }
}

/// Like [`DefaultFormatter`], but first drops everything that is not a
/// letter, digit, whitespace or hyphen.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphanumericFormatter;

impl Formatter for AlphanumericFormatter {
    fn format(&self, raw: &str) -> String {
        let filtered: String = raw
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
            .collect();
        tidy_whitespace(&filtered)
    }
}

/// Formatter selection as it appears in configuration files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterKind {
    #[default]
    Default,
    Alphanumeric,
}

impl FormatterKind {
    pub fn build(self) -> Arc<dyn Formatter> {
        match self {
            FormatterKind::Default => Arc::new(DefaultFormatter),
            FormatterKind::Alphanumeric => Arc::new(AlphanumericFormatter),
        }
    }
}

static LEADING_WHITESPACE: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_RUN: OnceLock<Regex> = OnceLock::new();

/// Drop leading whitespace, then replace every run of two or more whitespace
/// characters with one space. A lone whitespace character is kept as-is.
fn tidy_whitespace(text: &str) -> String {
    let leading = LEADING_WHITESPACE.get_or_init(|| Regex::new(r"^\s+").expect("literal pattern"));
    let run = WHITESPACE_RUN.get_or_init(|| Regex::new(r"\s{2,}").expect("literal pattern"));

    let trimmed = leading.replace(text, "");
    run.replace_all(&trimmed, " ").into_owned()
}
