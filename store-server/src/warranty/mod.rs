//! Warranty Module
//!
//! Per-unit warranty provisioning, triggered when an order completes.

pub mod provisioner;

pub use provisioner::{provision_for_order, spawn_provisioning};
