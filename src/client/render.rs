//! Rendering of answers to the terminal.
//!
//! Reasoning and answer text are separated by `Thinking:` and `Answer:`
//! headers. Streamed output is tracked by [`RenderState`] so each header is
//! written at most once per response.

use crate::protocol::{Delta, ResponseMessage};
use std::io::{self, Write};

const THINKING_HEADER: &str = "Thinking:";
const ANSWER_HEADER: &str = "Answer:";

/// Write a header followed by a dashed separator of the same width and a blank line.
fn write_header<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    write!(out, "{}\n{}\n\n", title, "-".repeat(title.len()))
}

/// Phase of a streamed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing rendered yet.
    #[default]
    Idle,
    /// The `Thinking:` header has been written.
    Reasoning,
    /// Answer text is being written.
    Answering,
}

/// Tracks which section of a streamed response is being written.
///
/// Each header is written at most once. Empty fragments, such as the
/// `"content": ""` many servers open a stream with, never change the phase.
#[derive(Debug)]
pub struct RenderState {
    phase: Phase,
    hide_reasoning: bool,
    thinking_written: bool,
}

impl RenderState {
    pub fn new(hide_reasoning: bool) -> Self {
        Self {
            phase: Phase::Idle,
            hide_reasoning,
            thinking_written: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Write one streamed delta, emitting section headers on phase changes.
    pub fn render_delta<W: Write>(&mut self, out: &mut W, delta: &Delta) -> io::Result<()> {
        let reasoning = delta.reasoning_content.as_deref().filter(|r| !r.is_empty());
        if let Some(reasoning) = reasoning.filter(|_| !self.hide_reasoning) {
            if !self.thinking_written {
                if self.phase == Phase::Answering {
                    write!(out, "\n\n")?;
                }
                write_header(out, THINKING_HEADER)?;
                self.thinking_written = true;
                self.phase = Phase::Reasoning;
            }
            write!(out, "{}", reasoning)?;
            out.flush()?;
        }

        if let Some(content) = delta.content.as_deref().filter(|c| !c.is_empty()) {
            if self.phase == Phase::Reasoning {
                write!(out, "\n\n")?;
                write_header(out, ANSWER_HEADER)?;
            }
            self.phase = Phase::Answering;
            write!(out, "{}", content)?;
            out.flush()?;
        }

        Ok(())
    }

    /// Terminate the streamed output.
    pub fn finish<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        writeln!(out)?;
        out.flush()
    }
}

/// Write a complete (non-streamed) answer.
pub fn render_message<W: Write>(
    out: &mut W,
    message: &ResponseMessage,
    hide_reasoning: bool,
) -> io::Result<()> {
    let content = message.content.as_deref().unwrap_or_default().trim();
    let reasoning = message
        .reasoning_content
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty() && !hide_reasoning);

    if let Some(reasoning) = reasoning {
        write_header(out, THINKING_HEADER)?;
        write!(out, "{}\n\n", reasoning)?;
        write_header(out, ANSWER_HEADER)?;
    }
    writeln!(out, "{}", content)?;
    out.flush()
}
