use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Source and target languages must be different.")]
    SameLanguagePair,

    #[error("Please enter some text to translate.")]
    EmptyInput,

    #[error("No pretrained model is published for {0}")]
    ModelUnavailable(String),

    #[error("Failed to load model: {0}")]
    Load(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TranslateError>;
