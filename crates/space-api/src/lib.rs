//! Kubelet-facing surface of the node agent.
//!
//! - [`NodeHandler`] abstracts the backend; [`NodeAgentAdapter`] delegates to
//!   [`space_core::agent::SpaceNodeAgent`].
//! - `grpc` feature: [`DraNodeService`], the `v1alpha3.Node` service the
//!   kubelet calls over the plugin socket.
//! - `http` feature: [`OpsApi`], an axum router with `/healthz` and `/metrics`.
mod adapter;
pub use adapter::NodeAgentAdapter;

mod error;
pub use error::ApiError;

mod handler;
pub use handler::{NodeHandler, PrepareResults, UnprepareResults};

#[cfg(feature = "grpc")]
pub mod proto {
    tonic::include_proto!("v1alpha3");
}

#[cfg(feature = "grpc")]
mod convert;

#[cfg(feature = "grpc")]
mod grpc;
#[cfg(feature = "grpc")]
pub use grpc::DraNodeService;
#[cfg(feature = "grpc")]
pub use proto::node_server::NodeServer;

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::OpsApi;
