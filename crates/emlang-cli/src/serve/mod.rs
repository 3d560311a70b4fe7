//! HTTP servers for previewing models in a browser.
//!
//! [`live`] serves one model file and reloads the page whenever the file's
//! content changes. [`repl`] serves an editor that renders, lints and
//! formats whatever is typed into it. Both run until Ctrl+C.

pub mod live;
pub mod repl;

use std::{future::Future, io};

use log::{info, warn};
use tokio::net::TcpListener;

use emlang::config::ServeConfig;

/// Address used when neither a flag nor the configuration sets one.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1";

/// Where a server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listen {
    address: String,
    port: u16,
}

impl Listen {
    /// Resolve the listen address. Flags win over configuration, which wins
    /// over the defaults.
    pub fn resolve(
        address: Option<&str>,
        port: Option<u16>,
        config: &ServeConfig,
        default_port: u16,
    ) -> Self {
        Self {
            address: address
                .or(config.address())
                .unwrap_or(DEFAULT_ADDRESS)
                .to_string(),
            port: port.or(config.port()).unwrap_or(default_port),
        }
    }

    /// URL shown to the user. Wildcard addresses are shown as `localhost`.
    pub fn url(&self) -> String {
        let host = match self.address.as_str() {
            "" | "0.0.0.0" => "localhost",
            address => address,
        };
        format!("http://{host}:{}", self.port)
    }

    async fn bind(&self) -> io::Result<TcpListener> {
        let host = match self.address.as_str() {
            "" => "0.0.0.0",
            address => address,
        };
        let listener = TcpListener::bind((host, self.port)).await?;
        info!(address = host, port = self.port; "Server listening");
        Ok(listener)
    }
}

/// Run a future to completion on a new multi-threaded runtime.
fn block_on<F: Future>(future: F) -> io::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}

/// Resolves once the process receives Ctrl+C.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(err = err.to_string(); "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutting down server");
}
