use std::env;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Notify;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pi_statusline::footer::{Footer, FooterCollector, RenderEnv, SessionView, render_footer_lines};
use pi_statusline::git::ProcessGitRunner;
use pi_statusline::refresh::{ChangeNotifier, Collector};
use pi_statusline::settings::{CompactionOverride, SettingsPaths};

const LOG_ENV: &str = "PI_STATUSLINE_LOG";
const DEFAULT_WIDTH: i32 = 80;

/// Print the two-line session footer for the JSON session read from stdin.
#[derive(Parser, Debug)]
#[command(name = "pi-statusline", version)]
struct Cli {
    /// Terminal width in columns. Defaults to the input's `width`, then the terminal size.
    #[arg(long, allow_negative_numbers = true)]
    width: Option<i32>,

    /// Keep refreshing and reprint on every change until Ctrl-C.
    #[arg(long)]
    watch: bool,

    /// Directory to inspect instead of the session's `cwd`.
    #[arg(long)]
    cwd: Option<PathBuf>,
}

#[derive(Deserialize, Default)]
struct Input {
    #[serde(flatten)]
    session: SessionView,
    #[serde(default)]
    width: Option<Value>,
    #[serde(default)]
    settings: Option<Value>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn read_input() -> Result<Input> {
    let mut raw = String::with_capacity(4096);
    io::stdin().read_to_string(&mut raw).context("reading session json from stdin")?;
    if raw.trim().is_empty() {
        return Ok(Input::default());
    }
    Ok(serde_json::from_str(&raw).unwrap_or_else(|err| {
        debug!(%err, "malformed session json, rendering defaults");
        Input::default()
    }))
}

fn resolve_width(cli: Option<i32>, input: Option<&Value>) -> i32 {
    if let Some(width) = cli {
        return width;
    }
    if let Some(width) = input.and_then(Value::as_f64).filter(|w| w.is_finite()) {
        return width.floor().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32;
    }
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| i32::from(w))
        .unwrap_or(DEFAULT_WIDTH)
}

fn write_lines(lines: &[String; 2]) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

async fn print_once(cwd: PathBuf, input: &Input, width: i32) -> Result<()> {
    let session = input.settings.as_ref().and_then(CompactionOverride::from_settings);
    let paths = SettingsPaths::from_env(&cwd);
    let collector = FooterCollector::new(
        ProcessGitRunner::default(),
        cwd,
        paths,
        Arc::new(Mutex::new(session)),
    );
    let snapshot = collector.collect().await;
    write_lines(&render_footer_lines(width, &input.session, &snapshot, &RenderEnv::current()))
}

/// Forward SIGUSR1 to the change signal so hooks can force a refresh.
#[cfg(unix)]
fn forward_user_signal(notifier: ChangeNotifier) -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut user1 = signal(SignalKind::user_defined1()).context("installing SIGUSR1 handler")?;
    tokio::spawn(async move {
        while user1.recv().await.is_some() {
            debug!("SIGUSR1, refreshing");
            notifier.notify();
        }
    });
    Ok(())
}

#[cfg(not(unix))]
fn forward_user_signal(_notifier: ChangeNotifier) -> Result<()> {
    Ok(())
}

async fn watch(cwd: PathBuf, input: &Input, width: i32) -> Result<()> {
    let notifier = ChangeNotifier::new();
    forward_user_signal(notifier.clone())?;

    let dirty = Arc::new(Notify::new());
    let wake = Arc::clone(&dirty);
    let mut footer = Footer::install(
        ProcessGitRunner::default(),
        &cwd,
        Some(&notifier),
        Arc::new(move || wake.notify_one()),
    );
    if let Some(doc) = &input.settings {
        footer.apply_session_settings(doc);
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            () = dirty.notified() => write_lines(&footer.render(width, &input.session))?,
            result = &mut shutdown => {
                result.context("waiting for ctrl-c")?;
                break;
            }
        }
    }

    footer.dispose();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut input = read_input()?;
    let width = resolve_width(cli.width, input.width.as_ref());

    let cwd = match cli.cwd {
        Some(dir) => dir,
        None if !input.session.cwd.is_empty() => PathBuf::from(&input.session.cwd),
        None => env::current_dir().context("resolving current directory")?,
    };
    if input.session.cwd.is_empty() {
        input.session.cwd = cwd.to_string_lossy().into_owned();
    }
    debug!(cwd = %cwd.display(), width, watch = cli.watch, "starting");

    if cli.watch {
        watch(cwd, &input, width).await
    } else {
        print_once(cwd, &input, width).await
    }
}
