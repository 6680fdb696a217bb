//! AgriTrace Custody Ledger
//!
//! Append-only chain-of-custody ledger for agricultural products moving
//! through a fixed three-stage pipeline: producer → intermediary → seller.
//!
//! # Architecture
//!
//! - **Append-only log**: every handoff is recorded as an immutable event
//! - **Forward-only state machine**: `Registered` → `InTransit` →
//!   `Available`, no skips, no regressions, no repeats
//! - **Keyed locking**: operations on one product linearize; unrelated
//!   products proceed in parallel
//! - **Exact arithmetic**: prices are fixed-point scaled integers, never
//!   floating point
//! - **Tamper evidence**: each event is SHA-256 hashed and chained to its
//!   predecessor
//!
//! # Invariants
//!
//! - `current_price == base_price + Σ(added costs)`, never decreasing
//! - Each stage executes at most once per product, fixing its actor forever
//! - Aggregates are updated in the same atomic step as the mutation they
//!   summarize
//! - Failed operations leave the ledger unchanged

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod config;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod price;
pub mod types;
pub mod verify;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use metrics::Metrics;
pub use price::{Price, PriceUnit, DEFAULT_PRICE_DECIMALS, MAX_PRICE_DECIMALS};
pub use types::{
    ActorId, Caller, LedgerStats, Product, ProductId, ProductStatus, Receipt, Registration, Role,
    TraceAction, TraceEvent,
};
pub use verify::{chain_is_intact, CustodyReport};
