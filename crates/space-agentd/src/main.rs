mod config;

use std::{net::SocketAddr, path::Path, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tokio::{
    net::{TcpListener, UnixListener},
    signal::unix::{SignalKind, signal},
};
use tokio_stream::wrappers::UnixListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tracing::{info, warn};

use space_api::{DraNodeService, NodeAgentAdapter, NodeServer, OpsApi};
use space_cdi::{ClaimArtifactDir, SpecDir};
use space_core::agent::SpaceNodeAgent;
use space_observe::{
    LoggerTimeZone, TZ_SYNC_PERIOD, init_local_offset, init_logger, run_timezone_sync,
};
use space_prometheus::PrometheusMetrics;

use crate::config::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 1) logger; the local offset can only be detected while single-threaded
    let log = args.logger_config();
    if log.tz == LoggerTimeZone::Local {
        init_local_offset();
    }
    init_logger(&log)?;

    // 2) runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("unable to start the tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: Args) -> anyhow::Result<()> {
    info!(node = %args.node_name, "starting space-agentd");
    let shutdown = CancellationToken::new();

    // 3) metrics + stores
    let metrics = PrometheusMetrics::new().context("unable to register metrics")?;
    let specs = Arc::new(
        SpecDir::open(&args.cdi_root)
            .await
            .context("unable to open the CDI spec directory")?,
    );
    let artifacts = Arc::new(
        ClaimArtifactDir::open(&args.artifacts_root)
            .await
            .context("unable to open the claim artifact directory")?,
    );

    // 4) agent; nothing is served until the common spec is in place
    let agent = SpaceNodeAgent::new(specs, artifacts, args.cluster_endpoint.clone())
        .with_metrics(Arc::new(metrics.clone()));
    agent.write_common_spec().await?;

    // 5) background tasks
    if args.log_tz == LoggerTimeZone::Local {
        tokio::spawn(run_timezone_sync(TZ_SYNC_PERIOD, shutdown.clone()));
    }
    tokio::spawn(watch_signals(shutdown.clone()));

    let ops = match args.ops_addr {
        Some(addr) => {
            let api = OpsApi::new(shutdown.clone()).with_metrics(metrics);
            Some(tokio::spawn(serve_ops(addr, api, shutdown.clone())))
        }
        None => None,
    };

    // 6) kubelet plugin socket
    let listener = bind_plugin_socket(&args.plugin_socket).await?;
    let service = DraNodeService::new(Arc::new(NodeAgentAdapter::new(agent, shutdown.clone())));
    info!(socket = %args.plugin_socket.display(), "serving DRA node service");

    let served = Server::builder()
        .add_service(NodeServer::new(service))
        .serve_with_incoming_shutdown(
            UnixListenerStream::new(listener),
            shutdown.clone().cancelled_owned(),
        )
        .await;

    // 7) teardown
    shutdown.cancel();
    if let Some(ops) = ops {
        match ops.await {
            Ok(Err(e)) => warn!(error = %e, "ops server failed"),
            Err(e) => warn!(error = %e, "ops server task panicked"),
            Ok(Ok(())) => {}
        }
    }
    if let Err(e) = tokio::fs::remove_file(&args.plugin_socket).await {
        warn!(socket = %args.plugin_socket.display(), error = %e, "unable to remove plugin socket");
    }

    served.context("DRA node service failed")?;
    info!("space-agentd stopped");
    Ok(())
}

/// Bind the plugin socket, replacing a socket left behind by a previous run.
async fn bind_plugin_socket(path: &Path) -> anyhow::Result<UnixListener> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("unable to create {}", dir.display()))?;
    }
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!(socket = %path.display(), "removed stale plugin socket"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| format!("unable to remove {}", path.display()));
        }
    }
    UnixListener::bind(path).with_context(|| format!("unable to bind {}", path.display()))
}

async fn serve_ops(
    addr: SocketAddr,
    api: OpsApi,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("unable to bind {addr}"))?;
    info!(%addr, "serving ops endpoints");

    axum::serve(listener, api.router())
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    Ok(())
}

/// Cancel `shutdown` on Ctrl-C or SIGTERM. In-flight claim operations are
/// aborted and leave their claims retryable.
async fn watch_signals(shutdown: CancellationToken) {
    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            warn!(error = %e, "unable to listen for SIGTERM");
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("received shutdown signal");
            }
            shutdown.cancel();
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("received shutdown signal"),
        _ = term.recv() => info!("received SIGTERM"),
        _ = shutdown.cancelled() => return,
    }
    shutdown.cancel();
}
