//! opus-translate - Interactive Machine Translation
//!
//! A thin front-end over pretrained OPUS-MT Marian models: pick a source and
//! target language, enter text, and get a translation back.

pub mod cli;
pub mod config;
pub mod error;
pub mod interactive;
pub mod language;
pub mod model;
pub mod shell;
pub mod translate;
