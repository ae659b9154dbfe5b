use std::sync::LazyLock;

use color_print::cformat;
use regex::{Captures, Regex};
use rustyline::{Config, Editor, Result};

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*|\b__(.*?)__\b").expect("bold pattern"));

static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.*?)\*|\b_(.*?)_\b").expect("italic pattern"));

pub fn generate_prompt(custom_prompt: Option<&str>) -> String {
    custom_prompt.unwrap_or("> ").to_string()
}

pub fn rl() -> Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();
    Editor::with_config(config)
}

/// Render `**bold**` / `__bold__` and `*italic*` / `_italic_` for the terminal.
pub fn render_markdown(text: &str) -> String {
    let bold = BOLD.replace_all(text, |caps: &Captures| {
        let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        cformat!("<bold>{}</bold>", inner)
    });
    ITALIC
        .replace_all(&bold, |caps: &Captures| {
            let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            cformat!("<i>{}</i>", inner)
        })
        .into_owned()
}
