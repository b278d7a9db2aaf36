//! Dreamgen - text-to-image CLI adapter.
//!
//! Prints exactly one JSON line on stdout and exits 0 on success, 1 on any failure.

mod adapters;
mod cassette;
mod cli;
mod config;
mod context;
mod credentials;
mod error;
mod generation;
mod logging;
mod output;
mod ports;
mod report;
mod signing;

use std::path::Path;
use std::process;

use clap::Parser;
use tracing::{debug, info, warn};

use crate::cli::Cli;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::AdapterError;
use crate::generation::{ImageGenerationAdapter, OutputArtifact};
use crate::report::ResultReport;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let report = match Cli::try_parse() {
        Ok(cli) => {
            logging::init(cli.verbose);
            ResultReport::from(run(cli).await)
        }
        Err(e) if cli::is_informational(&e) => e.exit(),
        Err(e) => ResultReport::failure(&cli::usage_error(&e)),
    };

    if let Err(e) = report.emit(&mut std::io::stdout().lock()) {
        eprintln!("Error: failed to write result: {e}");
        process::exit(1);
    }
    process::exit(report.exit_code());
}

async fn run(cli: Cli) -> Result<OutputArtifact, AdapterError> {
    let invocation = cli.invocation()?;

    // Load config
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(AdapterError::Setup)?;
    let endpoint = config.endpoint();
    debug!(host = %endpoint.host, region = %endpoint.region, "endpoint resolved");

    // Create context based on mode (live / recording / replaying)
    let replay_path = std::env::var("DREAMGEN_REPLAY").ok();
    let is_recording = std::env::var("DREAMGEN_REC").is_ok_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        debug!("replaying from {cassette_path}");
        (ServiceContext::replaying(Path::new(cassette_path))?, None)
    } else if is_recording {
        debug!("recording mode enabled");
        let (ctx, session) = ServiceContext::recording(invocation.credentials, endpoint);
        (ctx, Some(session))
    } else {
        (ServiceContext::live(invocation.credentials, endpoint), None)
    };

    let adapter = ImageGenerationAdapter::new(ctx.service);
    let result = adapter.run(&invocation.prompt, &invocation.output_dir).await;
    drop(adapter);

    match &result {
        Ok(artifact) => info!(path = %artifact.path.display(), "image saved"),
        Err(e) => debug!("generation failed: {e}"),
    }

    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => info!("cassette saved: {}", path.display()),
            Err(e) => warn!("failed to save cassette: {e}"),
        }
    }

    result
}
