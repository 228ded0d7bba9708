use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate a piece of text once
    Translate {
        /// Source language (display name or code)
        #[arg(short, long)]
        from: String,

        /// Target language (display name or code)
        #[arg(short, long)]
        to: String,

        /// Text to translate
        #[arg(long, conflicts_with = "input")]
        text: Option<String>,

        /// Read the text from a file instead (stdin when neither is given)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Interactive translator: choose languages, enter text, repeat
    Interactive,

    /// List supported languages
    Languages {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which pretrained model serves a language pair
    Model {
        /// Source language (display name or code)
        #[arg(short, long)]
        from: String,

        /// Target language (display name or code)
        #[arg(short, long)]
        to: String,

        /// Ask the model hub whether the model is published
        #[arg(long)]
        check: bool,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write the default configuration
    Init {
        /// Destination file
        #[arg(short, long, default_value = "config.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_translate() {
        let args = Args::try_parse_from([
            "opus-translate", "-v", "translate", "--from", "English", "--to", "fr", "--text", "Hello",
        ])
        .unwrap();
        assert!(args.verbose);
        match args.command {
            Commands::Translate { from, to, text, input } => {
                assert_eq!(from, "English");
                assert_eq!(to, "fr");
                assert_eq!(text.as_deref(), Some("Hello"));
                assert!(input.is_none());
            }
            _ => panic!("expected translate"),
        }
    }

    #[test]
    fn test_text_and_input_conflict() {
        let result = Args::try_parse_from([
            "opus-translate", "translate", "-f", "en", "-t", "de", "--text", "x", "--input", "a.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_init_default_path() {
        let args = Args::try_parse_from(["opus-translate", "config", "init"]).unwrap();
        match args.command {
            Commands::Config { action: ConfigAction::Init { path, force } } => {
                assert_eq!(path, PathBuf::from("config.toml"));
                assert!(!force);
            }
            _ => panic!("expected config init"),
        }
    }
}
