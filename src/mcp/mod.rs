//! MCP (Model Context Protocol) server implementation.
//!
//! This module provides an MCP server that exposes the invoice session operations as tools
//! for AI agent integration. The server communicates via JSON-RPC over stdio.

/// Checks if the server has been initialized and returns an error if not.
macro_rules! require_init {
    ($self:expr) => {
        if !$self.check_initialized().await {
            return Self::uninitialized();
        }
    };
}

mod mcp_utils;
mod tools;

use crate::export::Renderer;
use crate::{Config, Session};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::model::{
    CallToolResult, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::transport::stdio;
use rmcp::ErrorData as McpError;
use rmcp::{tool_handler, ServerHandler, ServiceExt};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// The invoice MCP server.
///
/// The server owns a single invoice session for as long as it runs. Tool calls are handled one at
/// a time against that session.
#[derive(Clone)]
pub struct InvoiceServer {
    initialized: Arc<Mutex<bool>>,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    renderer: Arc<dyn Renderer>,
    tool_router: ToolRouter<InvoiceServer>,
}

impl InvoiceServer {
    /// Creates a new InvoiceServer with a fresh session and the given renderer.
    pub fn new(config: Config, renderer: Arc<dyn Renderer>) -> Self {
        let session = Session::new(config.session_settings());
        Self {
            initialized: Arc::new(Mutex::new(false)),
            config: Arc::new(config),
            session: Arc::new(Mutex::new(session)),
            renderer,
            tool_router: Self::tool_router(),
        }
    }

    async fn check_initialized(&self) -> bool {
        *self.initialized.lock().await
    }

    fn uninitialized() -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::error(vec![rmcp::model::Content::text(
            "You have not yet initialized the service. Please call __initialize_service__ first.",
        )]))
    }
}

#[tool_handler]
impl ServerHandler for InvoiceServer {
    /// Returns server information sent to the MCP client during initialization.
    ///
    /// Agents tend to treat `instructions` as optional reading, so the full usage instructions
    /// are returned by the `initialize_service` tool, which must be called before anything else.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "invoice".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(include_str!("docs/INTRO.md").into()),
        }
    }
}

/// Transport type for the MCP server.
#[derive(Debug, Default)]
pub(crate) enum Io {
    #[default]
    Stdio,
    /// Mock transport for testing - holds one end of a duplex channel.
    #[cfg(test)]
    Mock(tokio::io::DuplexStream),
}

/// Runs the MCP server with the PDF renderer from `config`. This function starts the MCP server
/// and blocks until the client disconnects or an error occurs.
pub(crate) async fn run_server(config: Config, io: Io) -> crate::Result<()> {
    let renderer = Arc::new(config.renderer());
    run_server_with(config, renderer, io).await
}

/// Runs the MCP server with stdio transport or mock transport.
///
/// # Arguments
/// - `config`: The `Config` object
/// - `renderer`: What `export_pdf` renders with
/// - `io`: Whether we are using stdio as the transport or using mock io for testing
///
pub(crate) async fn run_server_with(
    config: Config,
    renderer: Arc<dyn Renderer>,
    io: Io,
) -> crate::Result<()> {
    use crate::error::{ErrorType, IntoResult};
    let server = InvoiceServer::new(config, renderer);
    info!("Starting MCP server...");

    let service = match io {
        Io::Stdio => server
            .serve(stdio())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {e}"))
            .pub_result(ErrorType::Service)?,
        #[cfg(test)]
        Io::Mock(stream) => server
            .serve(stream)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {e}"))
            .pub_result(ErrorType::Service)?,
    };

    info!("MCP server running, waiting for requests...");

    // Wait for the server to complete (client disconnects or error)
    service
        .waiting()
        .await
        .map_err(|e| anyhow::anyhow!("MCP server error: {e}"))
        .pub_result(ErrorType::Service)?;

    info!("MCP server shut down");
    Ok(())
}
