//! Headless driver: load a polar-response payload, build every viewport
//! against an in-memory geometry sink and log what would be drawn.
//!
//! ```text
//! scatterview <payload.json> [options.toml]
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use scatterview::error::ScatterError;
use scatterview::options::Options;
use scatterview::scene::{ComparisonView, HeadlessSink, PolarResponse};

fn run(payload: &Path, options: Option<&Path>) -> Result<(), ScatterError> {
    let options = match options {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };
    let text = std::fs::read_to_string(payload)?;
    let response = PolarResponse::from_json(&text)?;
    response.require_results()?;

    let mut sink = HeadlessSink::new();
    let mut view = ComparisonView::open(&response, options, &mut sink);

    for entry in view.legend() {
        let status = if entry.has_data { "mesh" } else { "no data" };
        log::info!("{}: {status}", entry.label);
    }
    for viewport in view.viewports() {
        if let Some(message) = viewport.error_message() {
            log::warn!("{}: {message}", viewport.label());
        }
    }
    if let Some(label) = view.frequency_label() {
        log::info!("Frequency {label}");
    }
    for label in view.source_labels() {
        log::debug!("{label}");
    }
    log::info!(
        "{} buffers live ({} bytes)",
        sink.live_count(),
        sink.live_bytes()
    );

    view.teardown(&mut sink);
    if sink.live_count() > 0 {
        log::warn!("{} buffers leaked on teardown", sink.live_count());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(payload) = args.next() else {
        log::error!("Usage: scatterview <payload.json> [options.toml]");
        return ExitCode::FAILURE;
    };
    let options = args.next().map(PathBuf::from);

    match run(Path::new(&payload), options.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
