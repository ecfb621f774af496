//! Transaction lifecycle and wallet-gating core for embeddable token widgets.
//!
//! A host builds one [`TransactionService`] from the user's [`Credentials`]
//! and an [`EndpointConfig`], then drives widgets from it:
//! [`TransactionController`] for a single deposit or withdraw form,
//! [`CompositeSelector`] for a deposit/withdraw switcher, and [`BalanceView`]
//! for the balance readout. Rendering is left to the host.

pub mod amount;
pub mod balance;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod gate;
pub mod network;
pub mod selector;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use amount::{validate, ValidatedAmount, INVALID_AMOUNT_MESSAGE};
pub use balance::{BalanceCompletion, BalancePhase, BalanceView, PendingBalance};
pub use config::{Credentials, EndpointConfig, DEFAULT_BASE_URL};
pub use controller::{
    PendingTransaction, Phase, Submission, Ticket, TransactionCompletion,
    TransactionController, ViewState,
};
pub use error::WidgetError;
pub use gate::{GateStatus, WalletConnector, WalletGate};
pub use network::{
    FailureKind, Operation, RequestOutcome, TransactionApi, TransactionClient, TransactionKind,
};
pub use selector::CompositeSelector;
pub use service::TransactionService;
