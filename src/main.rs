use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use njoki::advisor::Advisor;
use njoki::advisor::gemini::GeminiAdvisor;
use njoki::advisor::response::Strictness;
use njoki::auth::{self, AuthStorage};
use njoki::banner::{BannerInfo, print_banner, print_session_summary};
use njoki::commands::{CommandRegistry, CommandResult, SessionInfo, StateChange};
use njoki::config::Config;
use njoki::consts::{API_KEY_ENV_VARS, DEFAULT_MODEL, PROVIDER, default_db_path};
use njoki::logging;
use njoki::render;
use njoki::retry::RetryPolicy;
use njoki::session::{Outcome, Rejection, Session, SessionConfig};
use njoki::spinner::{LISTENING, Spinner};

#[derive(Parser)]
#[command(
    name = "njoki",
    version,
    about = "Your health bestie: symptom information, never a diagnosis."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Gemini model ID (overrides the saved choice)
    #[arg(long)]
    model: Option<String>,

    /// SQLite database for settings and credentials
    #[arg(short, long)]
    db: Option<PathBuf>,

    /// Seconds to wait for a reply before giving up
    #[arg(short, long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Extra attempts after a network failure (never for malformed replies)
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// Reject replies that break the policy (missing disclaimer, vague without questions)
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Alternative API root, e.g. a proxy
    #[arg(long)]
    base_url: Option<String>,

    /// Debug logging to stderr (RUST_LOG overrides)
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Check one description and exit (non-interactive)
    #[arg(short, long)]
    run: Option<String>,

    /// With --run, print the raw result as JSON
    #[arg(long, default_value_t = false, requires = "run")]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Store a Gemini API key
    Login {
        /// The key; prompted for when omitted
        #[arg(long)]
        key: Option<String>,
    },
    /// Forget the stored API key
    Logout,
}

struct AdvisorSettings {
    db_path: String,
    base_url: Option<String>,
    strictness: Strictness,
}

fn build_advisor(model: &str, settings: &AdvisorSettings) -> anyhow::Result<Arc<dyn Advisor>> {
    let auth = AuthStorage::open(&settings.db_path)?;
    let mut advisor = GeminiAdvisor::new(Some(model.to_string()), auth)
        .context("failed to build HTTP client")?
        .with_strictness(settings.strictness);
    if let Some(url) = &settings.base_url {
        advisor = advisor.with_base_url(url.as_str());
    }
    Ok(Arc::new(advisor))
}

fn prepare_db_path(db: Option<PathBuf>) -> anyhow::Result<String> {
    let path = db.unwrap_or_else(default_db_path);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    path.to_str()
        .map(str::to_string)
        .context("database path is not valid UTF-8")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let db_path = prepare_db_path(cli.db.clone())?;

    if let Some(command) = &cli.command {
        return match command {
            Command::Login { key } => handle_login(&db_path, key.as_deref()),
            Command::Logout => {
                auth::logout(&db_path, PROVIDER)?;
                println!("✓ Stored Gemini key removed.");
                Ok(())
            }
        };
    }

    let config = Config::open(&db_path)?;
    let mut model = match cli.model.clone() {
        Some(m) => m,
        None => config
            .model()?
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
    };
    let mut auth_status = AuthStorage::open(&db_path)?.status(PROVIDER, API_KEY_ENV_VARS);

    let settings = AdvisorSettings {
        db_path: db_path.clone(),
        base_url: cli.base_url.clone(),
        strictness: if cli.strict {
            Strictness::Strict
        } else {
            Strictness::Lenient
        },
    };
    let session_config = SessionConfig {
        timeout: Duration::from_secs(cli.timeout),
        retry: RetryPolicy::with_retries(cli.retries),
    };
    let session = Session::new(build_advisor(&model, &settings)?, session_config);

    // Single description mode
    if let Some(text) = cli.run {
        session.edit(text).await;
        let outcome = run_submission(&session).await;
        if cli.json
            && let Outcome::Completed(result) = &outcome
        {
            println!("{}", serde_json::to_string_pretty(result)?);
        } else {
            print_outcome(&outcome);
            print_session_summary(session.usage().await);
        }
        if matches!(outcome, Outcome::Completed(_)) {
            return Ok(());
        }
        std::process::exit(1);
    }

    print_banner(&BannerInfo {
        model: &model,
        auth_status: &auth_status,
        timeout: session.config().timeout,
        retries: cli.retries,
        strict: cli.strict,
    });

    let registry = CommandRegistry::new();
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut amending = false;

    loop {
        print!("\nnjoki> ");
        io::stdout().flush()?;

        let line = tokio::select! {
            result = lines.next_line() => {
                match result {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        println!();
                        break;
                    }
                    Err(e) => {
                        eprintln!("input error: {}", e);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let info = SessionInfo {
            provider: PROVIDER,
            model: &model,
            auth_status: &auth_status,
            usage: session.usage().await,
            db_path: &db_path,
            strictness: settings.strictness,
            session: Some(&session),
        };

        match registry.dispatch(text, &info).await {
            CommandResult::NotACommand => {
                if amending {
                    let draft = session.snapshot().await.input;
                    session.edit(format!("{draft}{text}")).await;
                } else {
                    session.edit(text).await;
                }
                amending = false;
                print_outcome(&run_submission(&session).await);
            }
            CommandResult::Handled => {}
            CommandResult::Amended(_) => amending = true,
            CommandResult::Resubmit => {
                amending = false;
                print_outcome(&run_submission(&session).await);
            }
            CommandResult::StateChanged(StateChange::Auth(status)) => auth_status = status,
            CommandResult::StateChanged(StateChange::Model(id)) => {
                match build_advisor(&id, &settings) {
                    Ok(advisor) => {
                        session.set_advisor(advisor).await;
                        if let Err(e) = config.set_model(&id) {
                            eprintln!("  ✗ failed to save model choice: {e:#}");
                        }
                        model = id;
                    }
                    Err(e) => eprintln!("  ✗ failed to switch model: {e:#}"),
                }
            }
            CommandResult::Quit => break,
        }
    }

    print_session_summary(session.usage().await);
    Ok(())
}

/// Submit the current input with a spinner; Ctrl+C cancels the call, not the REPL.
async fn run_submission(session: &Session) -> Outcome {
    let spinner = Spinner::start(LISTENING);
    let submit = session.submit();
    tokio::pin!(submit);

    let outcome = tokio::select! {
        outcome = &mut submit => outcome,
        _ = tokio::signal::ctrl_c() => {
            session.cancel().await;
            submit.await
        }
    };

    spinner.stop().await;
    outcome
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Completed(result) => {
            print!("{}", render::render_result(result));
            println!();
            print!("{}", render::emergency_strip());
        }
        Outcome::Failed(failure) => {
            print!("{}", render::render_failure(failure));
            print!("{}", render::emergency_strip());
        }
        Outcome::Rejected(Rejection::EmptyInput) => {
            println!("  tell me how you're feeling first");
        }
        Outcome::Rejected(Rejection::Busy) => println!("  hang on, still checking the last one"),
        Outcome::Superseded => {}
    }
}

fn handle_login(db_path: &str, key: Option<&str>) -> anyhow::Result<()> {
    let key = match key {
        Some(k) => k.to_string(),
        None => {
            println!("Create a key at https://aistudio.google.com/apikey\n");
            print!("Paste your Gemini API key: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            line
        }
    };

    auth::login(db_path, PROVIDER, &key)?;
    println!("✓ Gemini key saved to {db_path}");
    Ok(())
}
