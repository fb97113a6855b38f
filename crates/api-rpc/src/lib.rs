//! JSON-RPC API Layer
//!
//! Exposes listing submission, job queries and transport recompute over JSON-RPC 2.0.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use handler::RpcHandler;
pub use server::{RpcServer, RpcServerConfig};
