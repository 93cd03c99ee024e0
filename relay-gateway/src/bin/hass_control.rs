//! `hass-control <url> <entity_id> <value>...`
//!
//! Pushes a control sequence to the hub outside of any inbound request.
//! The token, cap and delay come from the options file. Ctrl-C cancels the
//! run at its next wait.

use relay_client::{CommandSequencer, HttpDispatcher};
use relay_gateway::{telemetry, ServerOptions};
use tokio_util::sync::CancellationToken;

const USAGE: &str = "usage: hass-control <url> <entity_id> <value>...";

#[tokio::main]
async fn main() {
    telemetry::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [url, entity_id, raw_values @ ..] = args.as_slice() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let values = match raw_values.iter().map(|v| v.parse::<f64>()).collect::<Result<Vec<_>, _>>() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("invalid value: {e}\n{USAGE}");
            std::process::exit(2);
        }
    };

    let options = match ServerOptions::load(&ServerOptions::path_from_env()) {
        Ok(o) => o,
        Err(e) => {
            tracing::error!(error = %e, "failed to load options");
            std::process::exit(1);
        }
    };

    let cancel = CancellationToken::new();
    let sequencer = CommandSequencer::with_cancellation(
        HttpDispatcher::new(options.client_config()),
        options.sequencer_config(),
        cancel.clone(),
    );

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let report = sequencer.run(url, entity_id, options.hass_token.as_deref(), &values).await;

    tracing::info!(
        %entity_id,
        attempted = report.records.len(),
        accepted = report.accepted_count(),
        cancelled = report.cancelled,
        "control sequence finished"
    );
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "failed to encode report"),
    }

    if !report.completed() {
        std::process::exit(1);
    }
}
