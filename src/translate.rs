use tracing::{debug, warn};

use crate::error::{Result, TranslateError};
use crate::model::ModelHandle;

/// Markers that must never reach the user even if the decoder leaves them in
const CONTROL_TOKENS: &[&str] = &["<pad>", "</s>", "<s>", "<unk>"];

/// Translate `text` with an already resolved model.
///
/// Generation runs on the blocking pool; decoding parameters are whatever the
/// model library defaults to.
pub async fn translate(text: &str, handle: &ModelHandle) -> Result<String> {
    let model = handle.model.clone();
    let input = text.to_string();
    debug!("Translating {} chars with {}", input.chars().count(), handle.key);

    let raw = tokio::task::spawn_blocking(move || model.generate(&input))
        .await
        .map_err(|e| TranslateError::Inference(format!("Inference worker failed: {}", e)))??;

    let cleaned = strip_control_tokens(&raw);
    if cleaned.is_empty() {
        warn!("Model {} returned an empty translation", handle.key);
        return Err(TranslateError::Inference("Model returned an empty translation".to_string()));
    }

    Ok(cleaned)
}

/// Remove special tokens left at either end of the output.
/// Markers inside the text are content and line breaks are kept.
pub fn strip_control_tokens(raw: &str) -> String {
    let mut text = raw.trim();
    loop {
        let before = text.len();
        for token in CONTROL_TOKENS {
            if let Some(rest) = text.strip_prefix(token) {
                text = rest.trim_start();
            }
            if let Some(rest) = text.strip_suffix(token) {
                text = rest.trim_end();
            }
        }
        if text.len() == before {
            return text.to_string();
        }
    }
}
