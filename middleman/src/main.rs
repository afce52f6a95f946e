//! Middleman: talk to a command shell through a language model.
//!
//! Reads operator lines from stdin, asks the model what to say or run, runs
//! commands through the configured shell, and feeds the results back until the
//! model ends the session or stdin closes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use middleman::exit_codes;
use middleman::io::completion::ChatCompletionsClient;
use middleman::io::config::{DEFAULT_CONFIG_PATH, MiddlemanConfig, load_config};
use middleman::io::operator::TerminalOperator;
use middleman::io::prompt::render_system_prompt;
use middleman::io::shell::SystemShell;
use middleman::logging;
use middleman::looping::run_loop;
use middleman::session::Session;

#[derive(Parser)]
#[command(
    name = "middleman",
    version,
    about = "Interactive language-model middleman for the command line"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the model name from the config file.
    #[arg(long)]
    model: Option<String>,

    /// Override the API base URL from the config file.
    #[arg(long)]
    base_url: Option<String>,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::for_error(&err));
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let cfg = resolve_config(&cli)?;
    let api_key = cfg.api_key()?;

    let client = ChatCompletionsClient::new(&cfg.base_url, api_key, &cfg.model)?;
    let shell = SystemShell::new(&cfg.shell);
    let system_prompt = render_system_prompt(shell.program())?;
    let mut session = Session::new(system_prompt);
    let mut operator = TerminalOperator::stdio();

    run_loop(&mut session, &client, &shell, &mut operator, |state| {
        tracing::trace!(state = state.name(), "entered state");
    })
    .context("session ended abnormally")?;
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<MiddlemanConfig> {
    let mut cfg = load_config(&cli.config)
        .with_context(|| format!("load config {}", cli.config.display()))?;
    if let Some(model) = &cli.model {
        cfg.model = model.clone();
    }
    if let Some(base_url) = &cli.base_url {
        cfg.base_url = base_url.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}
