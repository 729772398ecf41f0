// Thin re-export module: implementation is in `blockchain/core.rs`, split into
// block construction, chain management and verification.

pub mod core;
pub use core::*;
