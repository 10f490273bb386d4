//! Payments Module
//!
//! Channel adapters (COD, QR transfer, card, e-wallet) and the
//! reconciliation resolver that maps ledger rows back to orders.

pub mod card;
pub mod cash;
pub mod channel;
pub mod qr;
pub mod reconcile;
pub mod wallet;

pub use channel::{ChannelRegistry, PaymentChannel, PaymentContext};
pub use reconcile::ReconciliationResolver;
