//! Event handler behind every user-facing surface.
//!
//! A [`TranslationForm`] carries the current selections; [`Shell::handle`]
//! validates them, resolves the model, translates and returns a [`Render`].
//! Every failure becomes a message, so callers never see an error value.

use std::fmt;
use tracing::{info, warn};

use crate::error::{Result, TranslateError};
use crate::language;
use crate::model::ModelResolver;
use crate::translate::translate;

/// Current form values, languages given by display name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationForm {
    pub source: String,
    pub target: String,
    pub text: String,
}

/// What the surface should show after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Render {
    Idle,
    Success { language: String, text: String },
    Warning(String),
    Error(String),
}

impl Render {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Warnings and errors; the command line exits non-zero on these
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Warning(_) | Self::Error(_))
    }
}

impl fmt::Display for Render {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => Ok(()),
            Self::Success { language, text } => write!(f, "Translated Text ({}):\n{}", language, text),
            Self::Warning(message) => write!(f, "Warning: {}", message),
            Self::Error(message) => write!(f, "Error: {}", message),
        }
    }
}

pub struct Shell {
    resolver: ModelResolver,
}

impl Shell {
    pub fn new(resolver: ModelResolver) -> Self {
        Self { resolver }
    }

    /// Immediate check while languages are being chosen, before any text is entered
    pub fn check_selection(&self, source: &str, target: &str) -> Render {
        match selection_codes(source, target) {
            Ok(_) => Render::Idle,
            Err(e) => Render::Error(e.to_string()),
        }
    }

    /// Handle the translate action for the given form
    pub async fn handle(&self, form: &TranslationForm) -> Render {
        let (source_code, target_code) = match selection_codes(&form.source, &form.target) {
            Ok(codes) => codes,
            Err(e) => return Render::Error(e.to_string()),
        };

        if form.text.trim().is_empty() {
            return Render::Warning(TranslateError::EmptyInput.to_string());
        }

        match self.run(source_code, target_code, &form.text).await {
            Ok(text) => {
                info!("Translated {} -> {}", form.source, form.target);
                Render::Success {
                    language: form.target.clone(),
                    text,
                }
            }
            Err(e) => {
                warn!("Translation {} -> {} failed: {}", form.source, form.target, e);
                Render::Error(format!("Error in translation: {}", e))
            }
        }
    }

    async fn run(&self, source_code: &str, target_code: &str, text: &str) -> Result<String> {
        let handle = self.resolver.resolve(source_code, target_code).await?;
        translate(text, &handle).await
    }
}

fn selection_codes(source: &str, target: &str) -> Result<(&'static str, &'static str)> {
    let source_code = language::code_for(source)?;
    let target_code = language::code_for(target)?;
    if source_code == target_code {
        return Err(TranslateError::SameLanguagePair);
    }
    Ok((source_code, target_code))
}
