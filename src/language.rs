//! Static catalog of the languages offered to the user.

use serde::Serialize;

use crate::error::{Result, TranslateError};

/// A selectable language: what the user sees and the code used in model keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub name: &'static str,
    pub code: &'static str,
}

const CATALOG: &[Language] = &[
    Language { name: "English", code: "en" },
    Language { name: "French", code: "fr" },
    Language { name: "Spanish", code: "es" },
    Language { name: "German", code: "de" },
    Language { name: "Italian", code: "it" },
    Language { name: "Dutch", code: "nl" },
    Language { name: "Russian", code: "ru" },
    Language { name: "Chinese", code: "zh" },
    Language { name: "Japanese", code: "ja" },
    Language { name: "Hindi", code: "hi" },
];

/// All entries in presentation order
pub fn entries() -> &'static [Language] {
    CATALOG
}

/// Display names in presentation order
pub fn names() -> Vec<&'static str> {
    CATALOG.iter().map(|l| l.name).collect()
}

/// Code for an exact display name
pub fn code_for(name: &str) -> Result<&'static str> {
    CATALOG
        .iter()
        .find(|l| l.name == name)
        .map(|l| l.code)
        .ok_or_else(|| TranslateError::UnknownLanguage(name.to_string()))
}

/// Display name for a code
pub fn name_for(code: &str) -> Result<&'static str> {
    CATALOG
        .iter()
        .find(|l| l.code == code)
        .map(|l| l.name)
        .ok_or_else(|| TranslateError::UnknownLanguage(code.to_string()))
}

/// Lenient lookup for typed input: display name in any case, or a code.
pub fn lookup(input: &str) -> Result<Language> {
    let input = input.trim();
    CATALOG
        .iter()
        .find(|l| l.name.eq_ignore_ascii_case(input) || l.code == input)
        .copied()
        .ok_or_else(|| TranslateError::UnknownLanguage(input.to_string()))
}
