use std::sync::Arc;

use clap::Parser;
use locmap::config::{MapConfig, ENDPOINT_ENV, TOKEN_ENV};
use locmap::location::{LocationResolver, ResolutionOutcome};
use locmap::map::{MapCall, MountTarget, RecordingBackend};
use locmap::widget::MapWidget;
use serde::Serialize;

/// locmap: center a map on your approximate IP location
///
/// Mounts the map widget headlessly, performs one ipinfo.io lookup and prints
/// the resulting draw calls as JSON. With --serve, hosts a Leaflet page that
/// replays a fresh session in the browser.
///
/// Examples:
///   locmap --token abc123
///   IPINFO_TOKEN=abc123 locmap --container widget
///   locmap --serve --port 8080
#[derive(Parser)]
#[command(name = "locmap", version, about, long_about = None)]
struct Cli {
    /// ipinfo.io access token.
    #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    /// Lookup endpoint override (http or https URL).
    #[arg(long, env = ENDPOINT_ENV)]
    endpoint: Option<String>,

    /// Id of the container the map mounts into.
    #[arg(long, default_value = "map")]
    container: String,

    /// Serve the map page over HTTP instead of printing one session.
    #[arg(long)]
    serve: bool,

    /// Bind address for --serve.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port for --serve.
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

#[derive(Serialize)]
struct SessionOutput {
    state: String,
    outcome: Option<ResolutionOutcome>,
    calls: Vec<MapCall>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = MapConfig::new(cli.token.clone(), cli.endpoint.clone()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    if config.ipinfo_token.is_none() {
        tracing::warn!("no ipinfo token configured; lookup will be unauthenticated");
    }
    let resolver = LocationResolver::new(&config);

    if cli.serve {
        locmap::server::start(&cli.host, cli.port, resolver).await;
        return;
    }

    let target = MountTarget::new(cli.container.as_str()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let backend = RecordingBackend::new();
    let widget = MapWidget::run(backend.clone(), &target, Arc::new(resolver))
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    // ── Banner ──────────────────────────────────────────────────

    if let Some(placement) = widget.placement() {
        eprintln!("  \u{1F4CD} [{:.4}, {:.4}]", placement.at.lat, placement.at.lng);
        eprintln!("  {}", placement.popup.replace("<br>", " "));
    }

    let output = SessionOutput {
        state: widget.state().to_string(),
        outcome: widget.outcome(),
        calls: backend.calls(),
    };
    widget.unmount();

    // JSON to stdout
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
