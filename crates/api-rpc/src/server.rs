//! JSON-RPC Server
//!
//! Serves the listing and transport methods over HTTP on localhost.

use crate::error::validation_error;
use crate::handler::RpcHandler;
use crate::types::{DeleteParams, DoneParams, GetParams, LikeParams, SubmitParams};
use flatscout_core::application::RecomputeRequest;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::{ErrorObjectOwned, Params};
use jsonrpsee::RpcModule;
use serde::de::DeserializeOwned;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 9531;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

/// Missing params mean "all defaults"; malformed params are a validation error
fn parse_params<T: DeserializeOwned + Default>(params: &Params<'_>) -> Result<T, ErrorObjectOwned> {
    if params.as_str().is_none() {
        return Ok(T::default());
    }
    params
        .parse()
        .map_err(|e: ErrorObjectOwned| validation_error(format!("invalid params: {}", e.message())))
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, handler: RpcHandler) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    /// Start the JSON-RPC server
    ///
    /// Returns the bound address (port 0 picks a free one) and the server handle.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let mut module = RpcModule::new(());

        // Listings
        let handler = self.handler.clone();
        module
            .register_async_method("listing.submit.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: SubmitParams = parse_params(&params)?;
                    handler.submit(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("listing.get.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: GetParams = parse_params(&params)?;
                    handler.get(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("listing.list.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { handler.list().await }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("listing.like.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: LikeParams = parse_params(&params)?;
                    handler.like(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("listing.done.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: DoneParams = parse_params(&params)?;
                    handler.done(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("listing.delete.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: DeleteParams = parse_params(&params)?;
                    handler.delete(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        // Transport
        let handler = self.handler.clone();
        module
            .register_async_method("transport.recompute.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: RecomputeRequest = parse_params(&params)?;
                    handler.recompute(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("transport.recompute_all.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { handler.recompute_all().await }
            })
            .map_err(|e| e.to_string())?;

        // Admin
        let handler = self.handler.clone();
        module
            .register_async_method("admin.stats.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { handler.stats().await }
            })
            .map_err(|e| e.to_string())?;

        info!(addr = %local_addr, "JSON-RPC server started");

        let handle = server.start(module);
        Ok((local_addr, handle))
    }
}
