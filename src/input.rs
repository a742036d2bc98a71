//! Prompt assembly from command line arguments.
//!
//! Arguments that name an existing file are replaced by the file's contents,
//! so both `askai notes.txt` and `askai "some text"` work.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Default system prompt.
pub const DEFAULT_INSTRUCTION: &str = "You are a helpful AI assistant.";

/// How long the answer should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    Short,
    Shortest,
    Long,
}

impl Length {
    fn directive(self) -> &'static str {
        match self {
            Length::Short => "Give a short reply only answering the question.",
            Length::Shortest => "Give a single word answer to the question.",
            Length::Long => "Give a detailed reply.",
        }
    }
}

const REASON_DIRECTIVE: &str = "Include your reasoning in the answer.";

/// Return the contents of `arg` if it names a file, otherwise `arg` itself.
pub fn text_or_file(arg: &str) -> Result<String> {
    let path = Path::new(arg);
    if path.is_file() {
        debug!("Reading {} from file", path.display());
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))
    } else {
        Ok(arg.to_string())
    }
}

/// Resolve the main input. Missing, empty and `-` read all of `stdin`.
pub fn resolve_input<R: Read>(arg: Option<&str>, stdin: R) -> Result<String> {
    match arg {
        None | Some("") | Some("-") => read_all(stdin),
        Some(arg) => text_or_file(arg),
    }
}

fn read_all<R: Read>(mut reader: R) -> Result<String> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .context("Failed to read input from stdin")?;
    Ok(text)
}

/// Put a question in front of the input it is about.
pub fn frame_question(question: Option<&str>, input: String) -> String {
    match question {
        Some(question) => format!("Question: {}\n\nInput:\n{}", question, input),
        None => input,
    }
}

/// Append answer-style directives to the instruction, one per line.
pub fn build_instruction(base: String, length: Option<Length>, reason: bool) -> String {
    let mut instruction = base;
    if let Some(length) = length {
        instruction.push('\n');
        instruction.push_str(length.directive());
    }
    if reason {
        instruction.push('\n');
        instruction.push_str(REASON_DIRECTIVE);
    }
    instruction
}
