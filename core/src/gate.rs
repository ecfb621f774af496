/// Wallet gate. Keeps widgets out of reach until the host says a wallet is connected.
use std::sync::Arc;

use tracing::debug;

/// Host-owned wallet connection. The core only reads `is_connected` and
/// fires `connect`; whatever connecting means (and toggling back) is up to
/// the host, which reflects the result in its next `is_connected` answer.
pub trait WalletConnector: Send + Sync {
    fn is_connected(&self) -> bool;

    /// Fire-and-forget request to connect. Nothing is returned to the core.
    fn connect(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    /// Widgets are usable.
    Open,
    /// Only the connect affordance should be shown.
    ConnectRequired,
}

/// Decides whether a guarded widget may be used. Without a connector the
/// gate is always open.
#[derive(Clone, Default)]
pub struct WalletGate {
    connector: Option<Arc<dyn WalletConnector>>,
}

impl std::fmt::Debug for WalletGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletGate")
            .field("has_connector", &self.connector.is_some())
            .field("status", &self.status())
            .finish()
    }
}

impl WalletGate {
    /// Gate with no connection requirement.
    pub fn open() -> Self {
        Self { connector: None }
    }

    pub fn new(connector: Arc<dyn WalletConnector>) -> Self {
        Self {
            connector: Some(connector),
        }
    }

    pub fn has_connector(&self) -> bool {
        self.connector.is_some()
    }

    pub fn status(&self) -> GateStatus {
        match &self.connector {
            Some(c) if !c.is_connected() => GateStatus::ConnectRequired,
            _ => GateStatus::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status() == GateStatus::Open
    }

    /// The connect affordance. Calls the host's `connect` exactly once and
    /// changes nothing locally. Returns `false` if there is no connector.
    pub fn connect(&self) -> bool {
        match &self.connector {
            Some(c) => {
                debug!("requesting wallet connection from host");
                c.connect();
                true
            }
            None => false,
        }
    }

    /// Hand out the guarded widget only while the gate is open.
    pub fn pass<'a, T>(&self, guarded: &'a mut T) -> Option<&'a mut T> {
        if self.is_open() {
            Some(guarded)
        } else {
            None
        }
    }
}
