//! askai - ask an LLM inference server a single question from the terminal.
//!
//! Sends one prompt to an OpenAI-compatible `/v1/chat/completions` endpoint
//! and prints the answer, streaming it as it is generated when possible.

mod client;
mod config;
mod input;
mod protocol;

use anyhow::{Context, Result};
use clap::Parser;
use client::{ChatCompletionClient, Prompt, StreamDecoder};
use config::Config;
use input::Length;
use protocol::Sampling;
use std::future::Future;
use std::io::Write;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const STREAMING: bool = cfg!(feature = "streaming");

const STREAMING_HINT: Option<&str> = if STREAMING {
    None
} else {
    Some("Streaming output is not available in this build. Rebuild with the `streaming` feature to enable it.")
};

#[derive(Parser)]
#[command(name = "askai")]
#[command(author, version, about = "Ask a local or remote LLM a single question")]
#[command(long_about = "Sends a prompt to an OpenAI-compatible chat completion server and prints the answer.\n\nThe server is read from LLM_API_BASEURL (default: http://localhost:5000).")]
#[command(after_help = STREAMING_HINT)]
struct Cli {
    /// Input text or file; read from stdin when missing or "-"
    #[arg(value_name = "INPUT")]
    input: Option<String>,

    /// Instruction text or file [default: "You are a helpful AI assistant."]
    #[arg(short = 'i', long, value_name = "TEXT|FILE")]
    instruction: Option<String>,

    /// Question about the input, text or file
    #[arg(short = 'q', long, value_name = "TEXT|FILE")]
    question: Option<String>,

    /// Instruction template like Alpaca or ChatML
    #[arg(short = 't', long, value_name = "NAME")]
    template: Option<String>,

    /// Request a short answer
    #[arg(short = 's', long, conflicts_with_all = ["shortest", "long"])]
    short: bool,

    /// Request a very short answer
    #[arg(short = 'S', long, conflicts_with = "long")]
    shortest: bool,

    /// Request a long answer
    #[arg(short = 'l', long)]
    long: bool,

    /// Request an answer with reasoning
    #[arg(short = 'r', long)]
    reason: bool,

    /// Start of the answer; the model continues from it
    #[arg(short = 'p', long, value_name = "TEXT")]
    prefix: Option<String>,

    /// Wait for the complete answer instead of streaming it
    #[arg(short = 'n', long, hide = !STREAMING)]
    no_streaming: bool,

    /// Do not print the model's reasoning
    #[arg(long)]
    hide_reasoning: bool,

    /// Maximum number of tokens to generate
    #[arg(long, value_name = "N")]
    max_tokens: Option<u32>,

    /// Sampling temperature
    #[arg(long, value_name = "T")]
    temperature: Option<f64>,

    /// Nucleus sampling cutoff
    #[arg(long, value_name = "P")]
    top_p: Option<f64>,

    /// Log request details to stderr
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    fn length(&self) -> Option<Length> {
        if self.short {
            Some(Length::Short)
        } else if self.shortest {
            Some(Length::Shortest)
        } else if self.long {
            Some(Length::Long)
        } else {
            None
        }
    }

    fn sampling(&self, defaults: Sampling) -> Sampling {
        Sampling {
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            top_p: self.top_p.unwrap_or(defaults.top_p),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match until_interrupted(run(cli), tokio::signal::ctrl_c()).await {
        Some(result) => result,
        None => {
            // Interrupted: end the current line and leave quietly
            println!();
            std::process::exit(0);
        }
    }
}

/// Drive `work` to completion unless `interrupt` fires first, in which case
/// `work` is dropped (closing any open connection) and `None` is returned.
async fn until_interrupted<T, I>(work: impl Future<Output = T>, interrupt: I) -> Option<T>
where
    I: Future,
{
    tokio::select! {
        result = work => Some(result),
        _ = interrupt => None,
    }
}

/// Initialize logging to stderr so stdout carries only the answer.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "askai=debug" } else { "askai=warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(level.parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();
    Ok(())
}

/// Build the prompt, ask the server and print the answer.
async fn run(cli: Cli) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    let text = read_input(cli.input.clone()).await?;
    let text = match cli.question.as_deref() {
        Some(question) => input::frame_question(Some(input::text_or_file(question)?.as_str()), text),
        None => text,
    };

    let instruction = cli
        .instruction
        .clone()
        .or_else(|| config.request.instruction.clone())
        .unwrap_or_else(|| input::DEFAULT_INSTRUCTION.to_string());
    let instruction = input::build_instruction(
        input::text_or_file(&instruction)?,
        cli.length(),
        cli.reason,
    );
    let template = cli.template.clone().or_else(|| config.request.template.clone());

    let decoder = StreamDecoder::detect();
    let endpoint = config::endpoint_url(&config.base_url());
    let client = ChatCompletionClient::new(endpoint, cli.sampling(config.sampling()), decoder)
        .context("Failed to create HTTP client")?;
    info!(
        endpoint = client.endpoint(),
        streaming = client.can_stream(),
        "Client ready"
    );

    let prompt = Prompt {
        text: &text,
        system_prompt: &instruction,
        template: template.as_deref(),
        prefix: cli.prefix.as_deref(),
        stream: !cli.no_streaming,
        hide_reasoning: cli.hide_reasoning,
    };

    let mut out = std::io::stdout();
    if let Err(e) = client.complete(&prompt, &mut out).await {
        debug!("Completion failed: {}", e);
        writeln!(out, "{}", e.user_message())?;
        std::process::exit(1);
    }

    Ok(())
}

/// Resolve the main input, reading stdin off the runtime thread so an
/// interrupt is still noticed while waiting for it.
async fn read_input(arg: Option<String>) -> Result<String> {
    let from_stdin = matches!(arg.as_deref(), None | Some("") | Some("-"));
    if from_stdin && atty::is(atty::Stream::Stdin) {
        eprintln!("Reading input from stdin, finish with Ctrl-D.");
    }

    tokio::task::spawn_blocking(move || input::resolve_input(arg.as_deref(), std::io::stdin().lock()))
        .await
        .context("Input reader stopped unexpectedly")?
}
