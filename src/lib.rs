//! Binary Market Program
//!
//! Two-outcome (YES/NO) prediction markets with a pooled, pro-rata payout.
//!
//! ## Architecture
//!
//! - `Registry`: single factory account holding the market counter, the
//!   creation fee sink and the parameters stamped into new markets
//! - `Market`: one account per market; holds the pooled lamports
//! - `Position`: one account per (market, participant) with share balances
//! - `CreatorIndex`: per-creator list of market IDs
//!
//! ## Lifecycle
//!
//! Open (buys accepted until end time) -> Resolved (by the creator after the
//! end time, or by the administrator at any time) -> claims paid from the pool
//! less the redemption fee.

pub mod cpi;
pub mod error;
pub mod events;
pub mod instruction;
pub mod processor;
pub mod state;
pub mod utils;
pub mod views;

#[cfg(not(feature = "no-entrypoint"))]
pub mod entrypoint;

// Re-export commonly used items
pub use error::BinaryMarketError;
pub use instruction::BinaryMarketInstruction;
pub use state::*;

solana_program::declare_id!("BMkt1111111111111111111111111111111111111111");
