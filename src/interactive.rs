use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::error::Result;
use crate::language;
use crate::shell::{Render, Shell, TranslationForm};

const QUIT: &str = ":q";

/// Terminal form: pick source and target from the catalog, enter text, see the result.
pub struct InteractiveSession<'a, R, W> {
    shell: &'a Shell,
    input: R,
    output: W,
}

impl<'a, R, W> InteractiveSession<'a, R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(shell: &'a Shell, input: R, output: W) -> Self {
        Self { shell, input, output }
    }

    /// Run until the user quits or input ends. Returns the number of translate actions handled.
    pub async fn run(&mut self) -> Result<usize> {
        self.write("Language Translator\n\n").await?;
        self.print_menu().await?;

        let mut actions = 0;
        loop {
            let Some(source) = self.select("Select source language: ").await? else {
                break;
            };
            let Some(target) = self.select("Select target language: ").await? else {
                break;
            };

            let render = self.shell.check_selection(source, target);
            if render != Render::Idle {
                self.show(&render).await?;
                continue;
            }

            self.write("Enter text to translate (finish with an empty line):\n").await?;
            let Some(text) = self.read_text().await? else {
                break;
            };

            let form = TranslationForm {
                source: source.to_string(),
                target: target.to_string(),
                text,
            };
            let render = self.shell.handle(&form).await;
            self.show(&render).await?;
            actions += 1;
        }

        self.write("Bye.\n").await?;
        Ok(actions)
    }

    async fn print_menu(&mut self) -> Result<()> {
        let mut menu = String::new();
        for (idx, entry) in language::entries().iter().enumerate() {
            menu.push_str(&format!("  {:>2}. {:<10} ({})\n", idx + 1, entry.name, entry.code));
        }
        menu.push_str(&format!("Type {} to quit.\n\n", QUIT));
        self.write(&menu).await
    }

    /// Prompt until a catalog entry is chosen; `None` on quit or end of input
    async fn select(&mut self, prompt: &str) -> Result<Option<&'static str>> {
        loop {
            self.write(prompt).await?;
            let Some(line) = self.read_line().await? else {
                return Ok(None);
            };
            let choice = line.trim();
            if choice == QUIT {
                return Ok(None);
            }
            match parse_choice(choice) {
                Some(name) => return Ok(Some(name)),
                None => {
                    debug!("Rejected language choice {:?}", choice);
                    self.write(&format!("Unknown language: {}\n", choice)).await?;
                }
            }
        }
    }

    /// Lines up to the first empty one; `None` when input ends before anything was typed
    async fn read_text(&mut self) -> Result<Option<String>> {
        let mut lines: Vec<String> = Vec::new();
        loop {
            match self.read_line().await? {
                Some(line) if line.is_empty() => break,
                Some(line) => lines.push(line),
                None if lines.is_empty() => return Ok(None),
                None => break,
            }
        }
        Ok(Some(lines.join("\n")))
    }

    async fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    async fn show(&mut self, render: &Render) -> Result<()> {
        self.write(&format!("{}\n\n", render)).await
    }

    async fn write(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }
}

/// Menu number (1-based) or anything `language::lookup` accepts
fn parse_choice(choice: &str) -> Option<&'static str> {
    if let Ok(n) = choice.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| language::entries().get(i))
            .map(|l| l.name);
    }
    language::lookup(choice).ok().map(|l| l.name)
}
