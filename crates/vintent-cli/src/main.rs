//! vintent - chat client for Vietnamese intent analysis

mod commands;
mod config;
mod output;
mod ui;

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use vintent_client::NluClient;
use vintent_session::{AnalysisView, ChatSession, SubmitRejected};

use commands::{CommandResult, execute_command, unknown_message};
use output::{OutputFormat, entry_line, render_outcome, render_view_text};

/// vintent - Vietnamese intent analysis chat
#[derive(Parser, Debug)]
#[command(name = "vintent")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// NLU service base URL (overrides VINTENT_API_BASE_URL and the config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Analyze a single utterance and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Output format for --command
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Disable TUI mode (use simple stdin/stdout)
    #[arg(long)]
    no_tui: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    "vintent=debug,vintent_client=debug,vintent_session=debug".into()
                }),
            )
            .with_writer(io::stderr)
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // Merge config with CLI args (CLI takes precedence)
    let cfg = config::Config::load();
    let base_url = cfg.resolve_base_url(
        args.api_url,
        std::env::var(config::BASE_URL_ENV).ok(),
    );
    tracing::debug!(
        %base_url,
        threshold = cfg.threshold.unwrap_or(config::DEFAULT_THRESHOLD),
        "configuration loaded"
    );

    let client = NluClient::new(base_url)?;
    let session = ChatSession::new(Arc::new(client), cfg.session_config());

    // Non-interactive mode
    if let Some(command) = args.command {
        return run_command(session, &command, args.format).await;
    }

    let use_tui = !args.no_tui && cfg.tui.unwrap_or(true);
    if use_tui {
        return ui::run_tui(session).await;
    }

    run_interactive(session).await
}

/// One-shot mode: health check, one analysis, print, exit
async fn run_command(
    mut session: ChatSession,
    utterance: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let state = session.check_health().await.clone();
    if !state.is_connected() {
        eprintln!("{}: {}", state.label(), SubmitRejected::Disconnected);
        std::process::exit(1);
    }

    let submission = match session.begin_submission(utterance) {
        Ok(submission) => submission,
        Err(SubmitRejected::Empty) => {
            eprintln!("Error: nothing to analyze");
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let outcome = session.dispatcher().analyze(submission.utterance()).await;
    println!("{}", render_outcome(format, submission.utterance(), &outcome));

    let failed = outcome.is_err();
    session.finish(submission, outcome);
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Line mode: stdin/stdout chat
async fn run_interactive(mut session: ChatSession) -> anyhow::Result<()> {
    // Show minimal startup info (only if TTY)
    let tty = io::IsTerminal::is_terminal(&io::stderr());
    let state = session.check_health().await;
    if tty {
        eprintln!("vintent ({})", state.label());
        eprintln!("Type /help for commands.");
        eprintln!();
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            // EOF
            break;
        };
        let input = line?;
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(result) = execute_command(input) {
            match result {
                CommandResult::Clear => {
                    session.clear();
                    println!("Cleared conversation.");
                }
                CommandResult::CheckHealth => {
                    println!("{}", session.check_health().await.label());
                }
                CommandResult::Message(msg) => println!("{}", msg),
                CommandResult::Unknown(name) => println!("{}", unknown_message(&name)),
                CommandResult::Exit => break,
            }
            continue;
        }

        if !session.is_connected() {
            // no timer in line mode: a failed check is retried before the next submission
            session.check_health().await;
        }

        let before = session.conversation().len();
        let succeeded = match session.submit(input).await {
            Ok(succeeded) => succeeded,
            Err(SubmitRejected::Disconnected) => false,
            Err(SubmitRejected::Empty) | Err(SubmitRejected::Busy) => continue,
        };

        for entry in session.conversation().entries().iter().skip(before) {
            println!("{}", entry_line(entry));
        }
        if let Some(view) = session.view().filter(|_| succeeded) {
            print_view(view);
        }
    }

    Ok(())
}

fn print_view(view: &AnalysisView) {
    println!();
    print!("{}", render_view_text(view));
    println!();
}
