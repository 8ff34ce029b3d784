mod config;
mod interactive;
mod render;

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;

use thesis_advisor_agent::{AgentConfig, GeminiAgent};
use thesis_advisor_core::{CriteriaSet, DebateRunner, SessionOutcome, SessionState};
use thesis_advisor_literature::{
    Library, LiteratureError, PubMedConnector, PubMedOptions, Router, ScholarConnector,
};
use thesis_advisor_logging::{init_tracing, LogEvent, LogFormat, Logger};

use config::{Credentials, FileConfig, Settings};
use interactive::NextStep;

/// Exit code for configuration and other setup failures
const SETUP_FAILURE: i32 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "thesis-advisor",
    about = "Stress-test a thesis idea with a five-round PRO/CON debate and a judge",
    version,
    author
)]
struct Cli {
    /// Thesis statement (prompted for when omitted)
    #[arg(short, long)]
    thesis: Option<String>,

    /// Three criteria, comma-separated: menu numbers, labels or custom:<text>
    #[arg(short, long)]
    criteria: Option<String>,

    /// Working directory holding thesis-advisor.toml and .env (default: current directory)
    #[arg(short = 'd', long)]
    working_dir: Option<PathBuf>,

    /// Model for every role, overriding config files
    #[arg(short, long)]
    model: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Append session events as JSON lines to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Diagnostic log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Output final result as JSON
    #[arg(long)]
    json_output: bool,

    /// Dry run: show resolved settings without calling any service
    #[arg(long)]
    dry_run: bool,

    /// Continue straight to the debate after the references are shown
    #[arg(short, long)]
    yes: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".bright_red().bold(), e);
            SETUP_FAILURE
        }
    };
    std::process::exit(code);
}

/// Load a `.env` file. A missing file is fine; anything else is reported.
fn load_dotenv(path: &Path) -> Option<String> {
    match dotenvy::from_path(path) {
        Ok(()) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(format!("ignoring {}: {}", path.display(), e)),
    }
}

async fn run(cli: Cli) -> Result<i32> {
    // Determine working directory
    let working_dir = match cli.working_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    // .env is optional; real environment variables win
    if let Some(warning) = load_dotenv(&working_dir.join(".env")) {
        eprintln!("{} {}", "Warning:".yellow().bold(), warning);
    }

    let log_format: LogFormat = cli.log_format.into();
    let _tracing_guard = init_tracing(
        &cli.log_level,
        log_format,
        cli.log_file.as_deref().and_then(|p| p.parent()).filter(|p| !p.as_os_str().is_empty()),
    );

    let global = FileConfig::load_global().context("Failed to load global configuration")?;
    let project = FileConfig::load_project(&working_dir)
        .context("Failed to load project configuration")?;
    let settings = Settings::resolve(global, project, cli.model.as_deref());
    let credentials = Credentials::from_env();

    // Validate --criteria before any network call
    let preset_criteria = cli
        .criteria
        .as_deref()
        .map(CriteriaSet::parse_list)
        .transpose()
        .context("Invalid --criteria")?;

    if cli.dry_run {
        print_dry_run(&cli, &working_dir, &settings, &credentials, preset_criteria.as_ref());
        return Ok(0);
    }

    let logger = match cli.log_file {
        Some(ref path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };
    let logger = Arc::new(logger);

    // Create agents
    let gemini_key = credentials
        .gemini_api_key
        .clone()
        .context("GEMINI_API_KEY is not set (export it or add it to .env)")?;
    let agent_config = |model: &str| {
        let mut config = AgentConfig::new(model).with_api_key(gemini_key.clone());
        if let Some(ref url) = settings.endpoints.gemini {
            config = config.with_base_url(url.clone());
        }
        if let Some(t) = settings.temperature {
            config = config.with_temperature(t);
        }
        config
    };
    let router_agent = GeminiAgent::new(agent_config(&settings.router_model))?;
    let debater_agent = GeminiAgent::new(agent_config(&settings.debater_model))?;
    let judge_agent = GeminiAgent::new(agent_config(&settings.judge_model))?;

    // Create connectors
    let mut pubmed = PubMedConnector::new(PubMedOptions {
        api_key: credentials.ncbi_api_key.clone(),
        email: credentials.ncbi_email.clone(),
    });
    if let Some(ref url) = settings.endpoints.pubmed {
        pubmed = pubmed.with_base_url(url.clone());
    }
    let mut scholar = ScholarConnector::new(credentials.serpapi_api_key.clone());
    if let Some(ref url) = settings.endpoints.scholar {
        scholar = scholar.with_base_url(url.clone());
    }
    let library = Library::new(Arc::new(pubmed), Arc::new(scholar));
    let router = Router::new(&router_agent, &library);

    let mut session = SessionState::new();
    let mut thesis_input = cli.thesis.clone();
    let mut announced = false;

    // Thesis -> route -> Quit / Refine / Continue
    loop {
        let raw = match thesis_input.take() {
            Some(t) => t,
            None => interactive::prompt_thesis()?,
        };
        let thesis = match session.set_thesis(&raw) {
            Ok(thesis) => thesis.to_string(),
            Err(e) if cli.thesis.is_some() && cli.yes => anyhow::bail!("{}", e),
            Err(e) => {
                eprintln!("  {} {}", "✗".bright_red(), e);
                continue;
            }
        };

        if !announced {
            logger.log(&LogEvent::SessionStarted {
                session_id: session.id().to_string(),
                thesis: thesis.clone(),
            });
            announced = true;
        }

        let have_references = match router.route(&thesis).await {
            Ok(search) => {
                logger.log(&LogEvent::RouteSelected {
                    connector: search.decision.connector.to_string(),
                    fallback: search.decision.fallback,
                    reason: search.decision.reason.clone(),
                });
                logger.log(&LogEvent::ReferencesFetched {
                    connector: search.decision.connector.to_string(),
                    count: search.records.len(),
                });
                if !cli.json_output {
                    render::print_references(search.decision.connector, &search.records);
                }
                session.record_search(search);
                true
            }
            Err(e) => {
                report_search_failure(&logger, &e);
                false
            }
        };

        if cli.yes {
            if have_references {
                break;
            }
            anyhow::bail!("No references to debate; refine the thesis and try again");
        }

        match interactive::prompt_next_step(have_references)? {
            NextStep::Continue => break,
            NextStep::Refine => continue,
            NextStep::Quit => {
                let outcome = SessionOutcome::declined("user quit before the debate");
                return Ok(finish(&cli, &mut session, outcome));
            }
        }
    }

    // Criteria are frozen from here on
    let criteria = match preset_criteria {
        Some(criteria) => criteria,
        None => interactive::prompt_criteria()?,
    };
    logger.log(&LogEvent::CriteriaSelected {
        criteria: criteria.labels(),
    });
    session.set_criteria(criteria);
    let brief = session.brief()?;

    // Create debate runner
    let mut runner = DebateRunner::new(&debater_agent, &judge_agent, &library, logger.clone());
    if !cli.json_output {
        runner = runner.with_round_callback(Arc::new(render::print_round));
    }

    // Handle Ctrl+C gracefully
    let interrupt_handle = runner.interrupt_handle();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted. Finishing current round...");
        interrupt_handle.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    let outcome = runner.run(brief).await?;
    Ok(finish(&cli, &mut session, outcome))
}

/// Print the outcome and return the exit code
fn finish(cli: &Cli, session: &mut SessionState, outcome: SessionOutcome) -> i32 {
    let outcome = session.finish(outcome);
    if cli.json_output {
        match serde_json::to_string_pretty(outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize outcome: {}", e),
        }
    } else {
        render::print_outcome(outcome);
    }
    outcome.exit_code()
}

fn report_search_failure(logger: &Logger, error: &LiteratureError) {
    let (connector, no_results) = match error {
        LiteratureError::Retrieval { connector, .. } => (connector, false),
        LiteratureError::NoResults { connector, .. } => (connector, true),
    };
    logger.log(&LogEvent::SearchFailed {
        connector: connector.to_string(),
        error: error.to_string(),
        no_results,
    });

    eprintln!();
    if no_results {
        eprintln!(
            "{} {} found nothing for this thesis. Try a broader or differently worded statement.",
            "∅".bright_yellow(),
            connector
        );
    } else {
        eprintln!(
            "{} Could not reach {}: {}",
            "✗".bright_red(),
            connector,
            error
        );
        eprintln!("  Check your network connection and API keys, then refine or quit.");
    }
}

fn print_dry_run(
    cli: &Cli,
    working_dir: &Path,
    settings: &Settings,
    credentials: &Credentials,
    criteria: Option<&CriteriaSet>,
) {
    println!("=== Dry Run ===");
    match cli.thesis {
        Some(ref thesis) => println!("Thesis: {}", thesis),
        None => println!("Thesis: (prompted)"),
    }
    match criteria {
        Some(criteria) => println!("Criteria: {}", criteria.as_context()),
        None => println!("Criteria: (prompted)"),
    }
    println!("Working dir: {}", working_dir.display());
    println!("Router model: {}", settings.router_model);
    println!("Debater model: {}", settings.debater_model);
    println!("Judge model: {}", settings.judge_model);
    if let Some(t) = settings.temperature {
        println!("Temperature: {}", t);
    }
    println!("Credentials: {:?}", credentials);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dotenv_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_dotenv(&dir.path().join(".env")).is_none());
    }

    #[test]
    fn test_malformed_dotenv_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "this line has no equals sign\n").unwrap();

        let warning = load_dotenv(&path).unwrap();
        assert!(warning.starts_with("ignoring "));
        assert!(warning.contains(".env"));
    }
}
