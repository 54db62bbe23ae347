//! Events for off-chain indexers
//!
//! Each state-changing instruction emits exactly one event. Events are
//! Borsh-encoded and written with `sol_log_data`, so they appear in the
//! transaction logs as `Program data: <base64>` lines: the first field is
//! `EVENT_TAG`, the second the encoded `MarketEvent`.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{log::sol_log_data, program_error::ProgramError, pubkey::Pubkey};

use crate::state::Outcome;

/// Marks log data written by this program
pub const EVENT_TAG: &[u8] = b"bmkt_evt";

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum MarketEvent {
    // --- REGISTRY ---
    RegistryInitialized {
        owner: Pubkey,
        market_admin: Pubkey,
        creation_fee: u64,
        share_price: u64,
        min_buy: u64,
        fee_bps: u16,
    },
    MarketCreated {
        market_id: u64,
        market: Pubkey,
        creator: Pubkey,
        question: String,
        end_time: i64,
        fee_paid: u64,
        refund: u64,
    },
    CreationFeeUpdated {
        old_fee: u64,
        new_fee: u64,
    },
    RegistryFeesWithdrawn {
        owner: Pubkey,
        amount: u64,
    },
    OwnershipTransferred {
        previous_owner: Pubkey,
        new_owner: Pubkey,
    },

    // --- TRADING ---
    TradeRecorded {
        market_id: u64,
        participant: Pubkey,
        outcome: Outcome,
        shares: u64,
        value: u64,
        timestamp: i64,
    },
    EndTimeExtended {
        market_id: u64,
        old_end_time: i64,
        new_end_time: i64,
    },

    // --- SETTLEMENT ---
    MarketResolved {
        market_id: u64,
        resolver: Pubkey,
        outcome: Outcome,
        resolution_time: i64,
        emergency: bool, // True if resolved through the administrator override
    },
    WinningsClaimed {
        market_id: u64,
        participant: Pubkey,
        gross: u64,
        fee: u64,
        net: u64,
    },
    MarketFeesWithdrawn {
        market_id: u64,
        administrator: Pubkey,
        amount: u64,
    },
}

impl MarketEvent {
    /// Write the event to the transaction log
    pub fn emit(&self) -> Result<(), ProgramError> {
        let data = self.try_to_vec()?;
        sol_log_data(&[EVENT_TAG, data.as_slice()]);
        Ok(())
    }

    /// Decode the fields of one `Program data:` line, if it is ours
    pub fn decode(fields: &[&[u8]]) -> Option<Self> {
        match fields {
            [tag, data] if *tag == EVENT_TAG => Self::try_from_slice(data).ok(),
            _ => None,
        }
    }
}
