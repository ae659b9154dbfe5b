use std::sync::LazyLock;

use regex::Regex;

static THINKING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("thinking-tag pattern"));

static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("blank-line pattern"));

/// Prepare a raw completion for display: drop `<think>` blocks, squeeze blank
/// line runs to a single blank line and trim.
pub fn clean(raw: &str) -> String {
    let without_thinking = THINKING.replace_all(raw, "");
    let squeezed = BLANK_RUN.replace_all(&without_thinking, "\n\n");
    squeezed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_thinking_block() {
        assert_eq!(clean("<think>ignore this</think>Hello there"), "Hello there");
    }

    #[test]
    fn strips_multiline_and_repeated_thinking_blocks() {
        let raw = "<think>\nstep one\nstep two\n</think>\nHi!\n<think>more</think> Bye.";
        assert_eq!(clean(raw), "Hi!\n Bye.");
    }

    #[test]
    fn collapses_blank_line_runs() {
        assert_eq!(clean("first\n\n\n\nsecond"), "first\n\nsecond");
        assert_eq!(clean("first\n  \n\t\n\nsecond"), "first\n\nsecond");
    }

    #[test]
    fn keeps_single_newlines_and_single_blank_lines() {
        assert_eq!(clean("a\nb\n\nc"), "a\nb\n\nc");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(clean("  \n\n <think>x</think>\n\n  ok \n"), "ok");
    }
}
