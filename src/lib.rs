//! Mortgage Ledger - loan amortization schedules sealed into a hash-linked,
//! append-only ledger
//!
//! # Architecture
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the append-only chain, verification, shared handle
//! - [`payment`] - Block payloads and the monthly payment record
//! - [`canonical`] - Sorted-key JSON encoding hashed into every block
//! - [`crypto`] - SHA-256 digest helpers
//!
//! ## Collaborators
//! - [`amortization`] - Annuity payment and schedule generation
//! - [`export`] - JSON record list and CSV display table
//!
//! ## Integration
//! - [`api`] - REST API (feature `api`)
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//! - [`cli`] - CLI utilities

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod canonical;
pub mod crypto;
pub mod payment;

// ============================================================================
// Collaborators
// ============================================================================
pub mod amortization;
pub mod export;

// ============================================================================
// Integration
// ============================================================================
#[cfg(feature = "api")]
pub mod api;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod cli;
pub mod config;
pub mod error;

pub use blockchain::{Block, Ledger, SharedLedger};
pub use error::{LedgerError, Result};
pub use payment::{Payload, PaymentRecord};
