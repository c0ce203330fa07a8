//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

mod config;
mod transport;

use std::collections::BTreeMap;
use std::sync::Arc;

use clap::{App, Arg};
use config::{Config, LinkTransport, LoggingFileRotation, LoggingFmtStyle};
use holo_lsr::adjacency::{Adjacency, AdjacencyState};
use holo_lsr::error::Error;
use holo_lsr::instance::{Instance, InstanceChannelsRx};
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::Layer;
use tracing_subscriber::prelude::*;
use transport::LinkSocket;

fn init_tracing(config: &config::Logging) {
    // Enable logging to a file.
    let file = config.file.enabled.then(|| {
        let file_appender = match config.file.rotation {
            LoggingFileRotation::Never => {
                rolling::never(&config.file.dir, &config.file.name)
            }
            LoggingFileRotation::Hourly => {
                rolling::hourly(&config.file.dir, &config.file.name)
            }
            LoggingFileRotation::Daily => {
                rolling::daily(&config.file.dir, &config.file.name)
            }
        };

        let log_level_filter = LevelFilter::from_level(tracing::Level::TRACE);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(false)
            .with_thread_ids(config.file.fmt.show_thread_id)
            .with_file(config.file.fmt.show_source)
            .with_line_number(config.file.fmt.show_source)
            .with_ansi(config.file.fmt.colors);
        let layer = match config.file.fmt.style {
            LoggingFmtStyle::Compact => layer.compact().boxed(),
            LoggingFmtStyle::Full => layer.boxed(),
            LoggingFmtStyle::Json => layer.json().boxed(),
            LoggingFmtStyle::Pretty => layer.pretty().boxed(),
        };
        layer.with_filter(log_level_filter)
    });

    // Enable logging to stdout.
    let stdout = config.stdout.enabled.then(|| {
        let log_level_filter = LevelFilter::from_level(tracing::Level::TRACE);
        let layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(config.stdout.fmt.show_thread_id)
            .with_file(config.stdout.fmt.show_source)
            .with_line_number(config.stdout.fmt.show_source)
            .with_ansi(config.stdout.fmt.colors);
        let layer = match config.stdout.fmt.style {
            LoggingFmtStyle::Compact => layer.compact().boxed(),
            LoggingFmtStyle::Full => layer.boxed(),
            LoggingFmtStyle::Json => layer.json().boxed(),
            LoggingFmtStyle::Pretty => layer.pretty().boxed(),
        };
        layer.with_filter(log_level_filter)
    });

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("holo=debug"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(file)
        .with(stdout)
        .init();
}

fn signal_listener() -> mpsc::Receiver<()> {
    let (signal_tx, signal_rx) = mpsc::channel(1);

    tokio::task::spawn(async move {
        let (mut sigint, mut sigterm) = match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
            (Err(error), _) | (_, Err(error)) => {
                error!(%error, "failed to install signal handlers");
                return;
            }
        };

        tokio::select! {
            _ = sigint.recv() => {
                info!("received SIGINT");
                let _ = signal_tx.send(()).await;
            },
            _ = sigterm.recv() => {
                info!("received SIGTERM");
                let _ = signal_tx.send(()).await;
            }
        }
    });

    signal_rx
}

// Opens the socket of a link and brings up its static adjacency.
fn link_start(
    instance: &Arc<Instance>,
    transport: &LinkTransport,
) -> Result<Arc<LinkSocket>, Error> {
    let link = instance
        .link(&transport.link)
        .ok_or_else(|| Error::LinkNotFound(transport.link.clone()))?;
    let socket = transport::socket(transport.local)?;

    if let Some(neighbor) = transport.neighbor_system_id {
        let mut adj = Adjacency::new(link.config.metric);
        adj.state = AdjacencyState::Up;
        adj.neighbor_system_id = Some(neighbor);
        adj.neighbor_ip = transport.neighbor_addr;
        instance.adjacency_change(&transport.link, adj)?;
    }

    Ok(Arc::new(LinkSocket {
        socket: Arc::new(socket),
        remote: transport.remote,
    }))
}

async fn run(config: Config) {
    let (instance, rx) = Instance::new(config.instance);
    let InstanceChannelsRx {
        spf_trigger,
        net_tx,
        mut route_install,
    } = rx;
    let tasks = instance.start(spf_trigger);
    let mut handles: Vec<JoinHandle<()>> = vec![];

    // Start the link transports.
    let mut link_sockets = BTreeMap::new();
    for transport in &config.transport {
        let Some(lsp_updatep) = tasks.lsp_update_tx(&transport.link) else {
            Error::LinkNotFound(transport.link.clone()).log();
            continue;
        };
        let link_socket = match link_start(&instance, transport) {
            Ok(link_socket) => link_socket,
            Err(error) => {
                error.log();
                continue;
            }
        };

        link_sockets.insert(transport.link.clone(), link_socket.clone());
        handles.push(tokio::spawn(transport::read_loop(
            transport.link.clone(),
            link_socket,
            lsp_updatep.clone(),
        )));
    }
    handles.push(tokio::spawn(transport::write_loop(link_sockets, net_tx)));

    // Report routing table updates.
    handles.push(tokio::spawn(async move {
        while let Some(msg) = route_install.recv().await {
            info!(count = msg.routes.len(), "routing table updated");
            for route in &msg.routes {
                info!(
                    prefix = %route.prefix,
                    metric = route.metric,
                    link = %route.nexthop.link,
                    nexthop = %route.nexthop.system_id,
                    "route"
                );
            }
        }
    }));

    // Run until a termination signal is received.
    let mut signal_rx = signal_listener();
    let _ = signal_rx.recv().await;

    // Dump the final protocol state.
    match serde_json::to_string(&instance.info()) {
        Ok(state) => info!(%state, "final state"),
        Err(error) => error!(%error, "failed to serialize final state"),
    }

    tasks.shutdown();
    for handle in handles {
        handle.abort();
    }
}

// ===== main =====

fn main() {
    // Parse command-line parameters.
    let matches = App::new("Holo link-state routing daemon")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("file")
                .help("Specify an alternative configuration file."),
        )
        .get_matches();

    // Read configuration file.
    let config_file = matches.value_of("config");
    let config = Config::load(config_file);

    // Initialize tracing.
    init_tracing(&config.logging);

    // We're ready to go!
    info!("starting up");

    // Main loop.
    match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime.block_on(run(config)),
        Err(error) => {
            error!(%error, "failed to create async runtime");
            std::process::exit(1);
        }
    }

    info!("exiting");
}
