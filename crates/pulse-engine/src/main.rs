//! Engine binary for the Pulse event generator.
//!
//! This is the main entry point that wires together the broker adapter,
//! the generator controller, the event broadcaster, and the observer
//! server, then runs until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `pulse-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Connect to NATS (or fall back to a disconnected publisher)
//! 4. Create the event broadcaster and generator controller
//! 5. Start the Observer API server
//! 6. Start the topic consumer
//! 7. Wait for `Ctrl-C`, then shut everything down in order

mod consumer;
mod error;
mod nats_broker;

use std::path::Path;
use std::sync::Arc;

use pulse_core::config::{LogFormat, LoggingConfig, PulseConfig};
use pulse_core::controller::{ControllerSettings, GeneratorController};
use pulse_core::publish::{BrokerPublisher, DisconnectedPublisher};
use pulse_observer::broadcaster::EventBroadcaster;
use pulse_observer::server::ServerConfig;
use pulse_observer::startup::spawn_observer;
use pulse_observer::state::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::nats_broker::NatsBroker;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "pulse-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the observer server
/// cannot bind, or the shutdown signal cannot be awaited.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration (first, so logging can honour it).
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("pulse-engine starting");
    info!(
        topic = config.generator.topic,
        default_interval_ms = config.generator.default_interval_ms,
        seeded = config.generator.seed.is_some(),
        nats_url = config.broker.nats_url,
        port = config.server.port,
        "Configuration loaded"
    );

    // 3. Connect to NATS.
    let (publisher, nats_client): (Arc<dyn BrokerPublisher>, Option<async_nats::Client>) =
        match NatsBroker::connect(&config.broker.nats_url).await {
            Ok(broker) => {
                let client = broker.client();
                (Arc::new(broker), Some(client))
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "Broker unavailable, every publish will report an error"
                );
                (Arc::new(DisconnectedPublisher::new(e.to_string())), None)
            }
        };

    // 4. Create broadcaster and controller.
    let broadcaster = Arc::new(EventBroadcaster::new(config.observers.queue_capacity));
    let controller = Arc::new(GeneratorController::new(
        ControllerSettings::from(&config.generator),
        Arc::clone(&publisher),
        Arc::clone(&broadcaster) as Arc<dyn pulse_core::notify::EventSink>,
    ));
    info!(
        queue_capacity = config.observers.queue_capacity,
        "Generator controller initialized (stopped)"
    );

    // 5. Start Observer API server.
    let app_state = Arc::new(AppState::new(
        Arc::clone(&controller),
        broadcaster,
        publisher,
    ));
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        allowed_origins: config.server.allowed_origins.clone(),
    };
    let observer_handle = spawn_observer(&server_config, Arc::clone(&app_state))
        .await
        .map_err(|e| EngineError::Observer {
            message: format!("{e}"),
        })?;
    info!(port = server_config.port, "Observer API server started");

    // 6. Start the topic consumer.
    let consumer_handle = match nats_client {
        Some(client) if config.broker.consume => Some(consumer::spawn_consumer(
            client,
            config.generator.topic.clone(),
            app_state.shutdown.clone(),
        )),
        _ => {
            info!("Topic consumer disabled");
            None
        }
    };

    // 7. Wait for Ctrl-C.
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| EngineError::Signal {
            message: format!("{e}"),
        })?;
    info!("Shutdown requested");

    controller.close().await;
    app_state.shutdown.cancel();
    if let Err(e) = observer_handle.await {
        warn!(error = %e, "Observer server task failed");
    }
    if let Some(handle) = consumer_handle {
        if let Err(e) = handle.await {
            warn!(error = %e, "Topic consumer task failed");
        }
    }

    info!("pulse-engine shutdown complete");
    Ok(())
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Load configuration from `pulse-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
/// Without one, defaults apply (still subject to env overrides).
fn load_config() -> Result<PulseConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(PulseConfig::from_file(config_path)?)
    } else {
        // Logging is not up yet.
        eprintln!("{CONFIG_PATH} not found, using defaults");
        Ok(PulseConfig::parse("")?)
    }
}
