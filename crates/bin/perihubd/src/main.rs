//! # perihubd — perihub daemon
//!
//! Composition root that wires the radio, the peripheral engine and the
//! HTTP control-plane together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize `tracing`
//! - Start the radio backend and the event router that owns the peripheral
//! - Build the axum router, injecting the peripheral handle and event bus
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGINT), powering the radio off first
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use perihub_adapter_http_axum::state::AppState;
use perihub_adapter_loopback::{LoopbackConfig, LoopbackController};
use perihub_app::event_bus::InProcessEventBus;
use perihub_app::router::{EventRouter, PeripheralHandle};
use perihub_domain::peripheral::PeripheralState;

use crate::config::{Config, RadioBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.logging.filter);

    // Peripheral
    let event_bus = Arc::new(InProcessEventBus::new(config.peripheral.event_bus_capacity));
    let (peripheral, mailbox) = PeripheralHandle::channel(config.peripheral.mailbox_capacity);

    let (radio, controller, forwarder) = match config.radio.backend {
        RadioBackend::Loopback => perihub_adapter_loopback::start(
            LoopbackConfig {
                max_payload: config.radio.max_payload,
                history: config.radio.history,
            },
            peripheral.radio_sink(),
        ),
    };
    let router_task = EventRouter::new(radio, Arc::clone(&event_bus)).spawn(mailbox);
    if config.radio.power_on_at_startup {
        controller
            .set_power(PeripheralState::PoweredOn)
            .await
            .context("failed to power on loopback radio")?;
    }

    // HTTP
    let app = perihub_adapter_http_axum::router::build(AppState::new(
        peripheral.clone(),
        event_bus,
    ));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(%bind_addr, backend = ?config.radio.backend, "perihubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    power_down(&controller, &peripheral).await;
    router_task.abort();
    forwarder.abort();
    tracing::info!("perihubd stopped");
    Ok(())
}

/// Report the radio off so advertising ends with the daemon. The status
/// round-trip returns once the router has applied it.
async fn power_down(controller: &LoopbackController, peripheral: &PeripheralHandle) {
    match controller.set_power(PeripheralState::PoweredOff).await {
        Ok(()) => {
            if let Err(err) = peripheral.status().await {
                tracing::warn!(error = %err, "router stopped before power off");
            }
        }
        Err(err) => tracing::warn!(error = %err, "failed to power off loopback radio"),
    }
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?} ({err}), falling back to info");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_stop_advertising_when_powering_down() {
        let (peripheral, mailbox) = PeripheralHandle::channel(16);
        let (radio, controller, _forwarder) =
            perihub_adapter_loopback::start(LoopbackConfig::default(), peripheral.radio_sink());
        EventRouter::new(radio, Arc::new(InProcessEventBus::new(16))).spawn(mailbox);
        controller
            .set_power(PeripheralState::PoweredOn)
            .await
            .unwrap();
        perihub_app::presets::quick_start(&peripheral, "Strap")
            .await
            .unwrap();

        power_down(&controller, &peripheral).await;

        let status = peripheral.status().await.unwrap();
        assert_eq!(status.state, PeripheralState::PoweredOff);
        assert!(!status.advertising);
        assert!(controller.advertisement().is_none());
    }
}
