use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use space_observe::{LoggerConfig, LoggerFormat, LoggerLevel, LoggerTimeZone};

/// Kubelet plugin of the space DRA driver.
#[derive(Debug, Parser)]
#[command(name = "space-agentd")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory scanned by the container runtime for CDI specs.
    #[arg(long, env = "CDI_ROOT", default_value = "/etc/cdi")]
    pub cdi_root: PathBuf,

    /// Directory holding one artifact directory per prepared claim.
    #[arg(
        long,
        env = "CLAIM_ARTIFACTS_ROOT",
        default_value = "/var/run/space-dra/claims"
    )]
    pub artifacts_root: PathBuf,

    /// Unix socket the kubelet connects to.
    #[arg(
        long,
        env = "PLUGIN_SOCKET",
        default_value = "/var/lib/kubelet/plugins/space.resource.example.com/plugin.sock"
    )]
    pub plugin_socket: PathBuf,

    /// Name of the node this plugin runs on.
    #[arg(long, env = "NODE_NAME")]
    pub node_name: String,

    /// API server address handed to workloads.
    #[arg(
        long,
        env = "CLUSTER_ENDPOINT",
        default_value = "https://kubernetes.default.svc"
    )]
    pub cluster_endpoint: String,

    /// Serve /healthz and /metrics on this address.
    #[arg(long, env = "OPS_ADDR")]
    pub ops_addr: Option<SocketAddr>,

    /// Log output: text, json or journald.
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: LoggerFormat,

    /// Log filter directives, e.g. `info,space_core=debug`.
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<LoggerLevel>,

    /// Timezone of log timestamps: utc or local.
    #[arg(long, env = "LOG_TZ", default_value = "utc")]
    pub log_tz: LoggerTimeZone,
}

impl Args {
    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            format: self.log_format,
            level: self.log_level.clone().unwrap_or_default(),
            tz: self.log_tz,
            ..LoggerConfig::default()
        }
    }
}
