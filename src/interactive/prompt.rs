//! Terminal prompts
//!
//! Selections are numbered lists answered by typing the number. Ctrl-C or
//! Ctrl-D at any prompt cancels it.

use crossterm::{execute, style::{Color, Print, ResetColor, SetForegroundColor, Stylize}};
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::io::{self, Write};

use crate::error::{LedgerError, Result};

/// Source of user answers for the menu
#[cfg_attr(test, mockall::automock)]
pub trait Prompter {
    /// Pick one of `items`; returns its index
    fn select(&mut self, label: &str, items: &[String]) -> Result<usize>;

    /// One line of free text, trimmed
    fn input(&mut self, label: &str) -> Result<String>;
}

/// Prompter reading from the terminal through rustyline
pub struct LinePrompter {
    editor: Editor<(), DefaultHistory>,
}

impl LinePrompter {
    pub fn new() -> Result<Self> {
        let config = rustyline::Config::builder()
            .edit_mode(rustyline::EditMode::Emacs)
            .auto_add_history(false)
            .build();
        let editor = Editor::with_config(config)?;

        Ok(Self { editor })
    }
}

impl Prompter for LinePrompter {
    fn select(&mut self, label: &str, items: &[String]) -> Result<usize> {
        if items.is_empty() {
            return Err(LedgerError::Prompt(format!("nothing to choose for '{}'", label)));
        }

        print_colored(&mut io::stdout(), &format!("\n{}\n", label), Color::Cyan);
        for (i, item) in items.iter().enumerate() {
            println!("  {:>2}) {}", i + 1, item);
        }

        let prompt = format!("{} ", "❯".green());
        loop {
            let line = self.editor.readline(&prompt)?;
            match parse_choice(&line, items.len()) {
                Some(index) => return Ok(index),
                None => print_colored(
                    &mut io::stdout(),
                    &format!("  Enter a number from 1 to {}\n", items.len()),
                    Color::DarkGrey,
                ),
            }
        }
    }

    fn input(&mut self, label: &str) -> Result<String> {
        let line = self.editor.readline(&format!("{}: ", label))?;
        Ok(line.trim().to_string())
    }
}

fn print_colored<W: Write>(out: &mut W, text: &str, color: Color) {
    let _ = execute!(
        out,
        SetForegroundColor(color),
        Print(text),
        ResetColor
    );
}

/// 1-based answer to a 0-based index, if in range
fn parse_choice(line: &str, count: usize) -> Option<usize> {
    match line.trim().parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Some(n - 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("1", 3), Some(0));
        assert_eq!(parse_choice(" 3 ", 3), Some(2));
        assert_eq!(parse_choice("0", 3), None);
        assert_eq!(parse_choice("4", 3), None);
        assert_eq!(parse_choice("two", 3), None);
        assert_eq!(parse_choice("", 3), None);
    }

    #[test]
    fn test_print_colored_wraps_text_in_color_and_reset() {
        let mut out = Vec::new();
        print_colored(&mut out, "  Enter a number from 1 to 3\n", Color::DarkGrey);

        let mut expected = Vec::new();
        let _ = execute!(
            expected,
            SetForegroundColor(Color::DarkGrey),
            Print("  Enter a number from 1 to 3\n"),
            ResetColor
        );
        assert_eq!(out, expected);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Enter a number from 1 to 3"));
        assert!(text.ends_with("\x1b[0m"));
    }
}
