//! Entry point for the read-aloud tool.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user settings from `conf/settings.toml`.
//! - Parse the saved HTML page and resolve the selection anchors.
//! - Run one reading session against the local speech server.

mod audio;
mod config;
mod dom;
mod error;
mod highlight;
mod input;
mod playback;
mod presenter;
mod reader;
mod segmenter;
mod session;

use crate::audio::AudioClient;
use crate::config::{DEFAULT_SETTINGS_PATH, SettingsHandle, load_or_init_settings};
use crate::dom::{PageDocument, SelectionRange};
use crate::input::KeyCombo;
use crate::playback::RodioOutput;
use crate::presenter::ActionRequest;
use crate::reader::ReadingController;
use crate::session::ReaderHandle;
use anyhow::{Context, Result, anyhow};
use std::env;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

struct Args {
    page_path: PathBuf,
    start_selector: String,
    end_selector: String,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args()?;
    let settings = load_or_init_settings(Path::new(DEFAULT_SETTINGS_PATH));
    set_log_level(reload_handle, settings.log_level.as_filter_str());
    info!(
        path = %args.page_path.display(),
        api_url = %settings.api_url,
        voice = %settings.voice,
        "Starting read-aloud session"
    );

    let client = AudioClient::new()?;
    if !client.health(&settings.api_url) {
        warn!(api_url = %settings.api_url, "Speech server did not answer the health probe");
    }

    let html = std::fs::read_to_string(&args.page_path)
        .with_context(|| format!("Failed to read page: {}", args.page_path.display()))?;
    let doc = PageDocument::parse(&html);
    let start = doc
        .select_first(&args.start_selector)
        .ok_or_else(|| anyhow!("No element matches selector: {}", args.start_selector))?;
    let end = doc
        .select_first(&args.end_selector)
        .ok_or_else(|| anyhow!("No element matches selector: {}", args.end_selector))?;
    let range = SelectionRange::between(&doc, start, end);
    if range.trimmed_text().is_empty() {
        return Err(anyhow!("Selection contains no readable text"));
    }

    let keybind = settings.keybind.clone();
    let settings = SettingsHandle::new(settings);
    let mut controller = ReadingController::new(settings, client, RodioOutput::new());
    let stop_handle = controller.handle();
    ctrlc::set_handler(move || {
        info!("Stop requested");
        stop_handle.stop();
    })
    .context("Failed to install the Ctrl-C handler")?;
    spawn_keybind_listener(keybind, controller.handle());

    controller
        .presenter_mut()
        .selection_changed(range.trimmed_text());
    let request = controller.presenter().toggle_request();
    match request {
        Some(ActionRequest::Start(_)) => {
            let outcome = controller.start(&doc, &range);
            info!(?outcome, "Session finished");
        }
        Some(ActionRequest::Stop) | None => {
            warn!("Nothing to read");
        }
    }
    controller.shutdown();
    Ok(())
}

/// Stand-in for the global key listener: each stdin line is parsed as a
/// combo and, when it matches the configured keybind, toggles the running
/// session off. The thread ends with stdin.
fn spawn_keybind_listener(keybind: String, reader: ReaderHandle) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let Some(combo) = KeyCombo::parse(line.trim()) else {
                continue;
            };
            if combo.matches(&keybind) && reader.is_reading() {
                info!(combo = %combo, "Keybind stop");
                reader.stop();
            }
        }
    });
}

fn parse_args() -> Result<Args> {
    let mut args = env::args().skip(1);
    let page_path = args
        .next()
        .ok_or_else(|| anyhow!("Usage: readaloud <page.html> [start-selector] [end-selector]"))?;
    let page_path = PathBuf::from(page_path);
    if !page_path.exists() {
        return Err(anyhow!("File not found: {}", page_path.display()));
    }
    let start_selector = args.next().unwrap_or_else(|| String::from("body"));
    let end_selector = args.next().unwrap_or_else(|| start_selector.clone());
    Ok(Args {
        page_path,
        start_selector,
        end_selector,
    })
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with settings.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from settings: {err}");
    } else {
        info!(%level, "Applied log level from settings");
    }
}
