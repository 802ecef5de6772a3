//! Chatwave - desktop shell for a web messaging client
//!
//! Holds the client's page in an in-process DOM, drives it from native
//! commands read on stdin, and writes notification and dock events to stdout.

mod ipc;
mod menu;

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context;
use chatwave_bridge::{Bridge, HttpIconFetcher};
use chatwave_core::{BridgeConfig, OutboundMessage, UserConfig};
use chatwave_dom::{Document, Window};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::ipc::commands::handle_message;
use crate::ipc::IpcMessage;

#[derive(Parser, Debug)]
#[command(name = "chatwave", version, about = "Desktop shell for a web messaging client")]
struct Cli {
    /// HTML snapshot of the embedded page
    #[arg(long, value_name = "FILE")]
    page: Option<PathBuf>,

    /// Settings file, instead of the one in the config directory
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Page title shown when nothing is unread
    #[arg(long)]
    idle_title: Option<String>,

    /// Log filter, e.g. `debug` or `chatwave_bridge=trace`
    #[arg(long)]
    log_level: Option<String>,

    /// Skip the delayed content-loaded tasks
    #[arg(long)]
    no_warmup: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    info!("Starting Chatwave...");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;
    runtime.block_on(run(cli))
}

/// Route `log` records through tracing and print everything to stderr.
fn init_logging(level: Option<&str>) -> anyhow::Result<()> {
    tracing_log::LogTracer::init().context("Failed to set log tracer")?;

    let filter = match level {
        Some(level) => EnvFilter::try_new(level).context("Invalid log level")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings_path = cli.config.clone().unwrap_or_else(UserConfig::default_path);
    let settings = UserConfig::load(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;
    info!(
        enabled = settings.spell_check_enabled,
        locale = %settings.effective_spell_check_locale(&system_locale()),
        "Spell check"
    );

    let mut config = BridgeConfig::default();
    if let Some(title) = cli.idle_title {
        config.idle_title = title;
    }
    let drain_timeout = config.icon_timeout();
    let no_warmup = cli.no_warmup;

    let document = load_page(cli.page.as_deref(), &config.idle_title)?;
    let fetcher = HttpIconFetcher::new(config.icon_timeout())?;
    let window = Rc::new(Window::new(Rc::new(document)));
    let (bridge, mut outbound) = Bridge::new(window, config, Arc::new(fetcher));
    bridge.install();

    let mut stdout = tokio::io::stdout();
    {
        let content_loaded = async {
            if !no_warmup {
                bridge.on_content_loaded().await;
            }
        };
        tokio::pin!(content_loaded);
        let mut content_loaded_done = false;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        info!("Chatwave ready");
        loop {
            tokio::select! {
                () = &mut content_loaded, if !content_loaded_done => {
                    content_loaded_done = true;
                    debug!("Content-loaded tasks finished");
                }
                line = lines.next_line() => match line.context("Failed to read stdin")? {
                    Some(line) => handle_line(&bridge, &line),
                    None => break,
                },
                Some(message) = outbound.recv() => write_message(&mut stdout, &message).await?,
            }
        }
    }

    // Icon loads still in flight get a last chance to report
    drop(bridge);
    let drained = tokio::time::timeout(drain_timeout, async {
        while let Some(message) = outbound.recv().await {
            write_message(&mut stdout, &message).await?;
        }
        Ok::<_, anyhow::Error>(())
    })
    .await;
    match drained {
        Ok(result) => result?,
        Err(_) => warn!("Pending notifications abandoned at shutdown"),
    }

    info!("Chatwave stopped");
    Ok(())
}

fn load_page(path: Option<&Path>, idle_title: &str) -> anyhow::Result<Document> {
    let html = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page {}", path.display()))?,
        None => format!(
            "<html><head><title>{}</title></head><body></body></html>",
            idle_title
        ),
    };
    Ok(Document::parse_html(&html)?)
}

fn handle_line(bridge: &Bridge, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }

    match IpcMessage::from_line(line).and_then(|message| handle_message(bridge, message)) {
        Ok(handled) => debug!(?handled, "Message handled"),
        Err(e) => warn!(error = %e, "Message rejected"),
    }
}

async fn write_message(stdout: &mut Stdout, message: &OutboundMessage) -> anyhow::Result<()> {
    let mut json = serde_json::to_string(message)?;
    json.push('\n');
    stdout.write_all(json.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

/// System locale as a BCP 47 tag, from the usual environment variables.
fn system_locale() -> String {
    let raw = ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.is_empty() && value != "C" && value != "POSIX");
    match raw {
        Some(value) => posix_to_bcp47(&value),
        None => "en-US".to_string(),
    }
}

fn posix_to_bcp47(value: &str) -> String {
    let base = value.split(['.', '@']).next().unwrap_or_default();
    base.replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "chatwave",
            "--page",
            "page.html",
            "--idle-title",
            "Chat",
            "--no-warmup",
        ]);
        assert_eq!(cli.page.as_deref(), Some(Path::new("page.html")));
        assert_eq!(cli.idle_title.as_deref(), Some("Chat"));
        assert!(cli.no_warmup);
        assert!(cli.config.is_none());
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_posix_locale() {
        assert_eq!(posix_to_bcp47("en_US.UTF-8"), "en-US");
        assert_eq!(posix_to_bcp47("de_DE@euro"), "de-DE");
        assert_eq!(posix_to_bcp47("fr"), "fr");
    }

    #[test]
    fn test_load_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(
            &path,
            "<html><head><title>(2) Messenger</title></head><body id=\"facebook\"></body></html>",
        )
        .unwrap();

        let document = load_page(Some(&path), "Messenger").unwrap();
        assert_eq!(document.title(), "(2) Messenger");
        assert!(document.get_element_by_id("facebook").is_some());

        let blank = load_page(None, "Chat").unwrap();
        assert_eq!(blank.title(), "Chat");

        assert!(load_page(Some(&dir.path().join("missing.html")), "Chat").is_err());
    }
}
