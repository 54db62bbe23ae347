//! State definitions for the Binary Market Program
//!
//! All account structures used by the program, plus the ledger rules that
//! mutate them. Processors load an account, call one of the methods below
//! and write the account back; the methods never touch lamports.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::error::BinaryMarketError;
use crate::utils::{calculate_payout, calculate_probability, calculate_shares, Payout};

// ============================================================================
// Discriminators
// ============================================================================

pub const REGISTRY_DISCRIMINATOR: u64 = 0x5245474953545259; // "REGISTRY"
pub const MARKET_DISCRIMINATOR: u64 = 0x4D41524B45545F5F; // "MARKET__"
pub const POSITION_DISCRIMINATOR: u64 = 0x504F534954494F4E; // "POSITION"
pub const CREATOR_INDEX_DISCRIMINATOR: u64 = 0x43524541544F5258; // "CREATORX"

// ============================================================================
// PDA Seeds
// ============================================================================

pub const REGISTRY_SEED: &[u8] = b"registry";
pub const MARKET_SEED: &[u8] = b"market";
pub const POSITION_SEED: &[u8] = b"position";
pub const CREATOR_INDEX_SEED: &[u8] = b"creator_index";

// ============================================================================
// Constants
// ============================================================================

/// Maximum length of market question (bytes)
pub const MAX_QUESTION_LEN: usize = 256;

/// Maximum length of market description (bytes)
pub const MAX_DESCRIPTION_LEN: usize = 1024;

/// Maximum market duration accepted at creation
pub const MAX_DURATION_DAYS: u64 = 365;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Basis point denominator (10000 = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Upper bound for the redemption fee (1000 = 10%)
pub const MAX_FEE_BPS: u16 = 1_000;

/// Default price of one share (0.01 SOL)
pub const DEFAULT_SHARE_PRICE: u64 = 10_000_000;

/// Default minimum value accepted by a single buy (0.01 SOL)
pub const DEFAULT_MIN_BUY: u64 = 10_000_000;

/// Default redemption fee (2%)
pub const DEFAULT_FEE_BPS: u16 = 200;

/// Default market creation fee
pub const DEFAULT_CREATION_FEE: u64 = 0;

/// Most market handles a list view returns in one call.
/// Return data is capped at 1024 bytes: 4 (vec len) + 31 * 32 = 996.
pub const MAX_RETURNED_MARKETS: usize = 31;

// ============================================================================
// Enums
// ============================================================================

/// Outcome type (YES/NO). YES is "outcome A".
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Yes = 0,
    No = 1,
}

impl Outcome {
    /// Slot of this outcome in per-outcome share tables
    pub fn index(self) -> usize {
        self as usize
    }
}

// ============================================================================
// Account Structures
// ============================================================================

/// Market registry and factory configuration
///
/// PDA Seeds: ["registry"]
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct Registry {
    /// Account discriminator
    pub discriminator: u64,

    /// Registry owner (fee settings, fee withdrawal)
    pub owner: Pubkey,

    /// Administrator stamped into every new market (emergency resolution, fee sweep)
    pub market_admin: Pubkey,

    /// Fee charged per market creation (lamports)
    pub creation_fee: u64,

    /// Price of one share for new markets (lamports)
    pub share_price: u64,

    /// Minimum value accepted by a single buy for new markets (lamports)
    pub min_buy: u64,

    /// Redemption fee for new markets (basis points)
    pub fee_bps: u16,

    /// Markets created so far; also the next market ID
    pub market_count: u64,

    /// Creation fees held and not yet withdrawn
    pub fee_balance: u64,

    /// Creation fees collected over the registry's lifetime
    pub total_fees_collected: u64,

    /// Creation timestamp
    pub created_at: i64,

    /// PDA bump
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 64],
}

impl Registry {
    pub const SIZE: usize = 8   // discriminator
        + 32  // owner
        + 32  // market_admin
        + 8   // creation_fee
        + 8   // share_price
        + 8   // min_buy
        + 2   // fee_bps
        + 8   // market_count
        + 8   // fee_balance
        + 8   // total_fees_collected
        + 8   // created_at
        + 1   // bump
        + 64; // reserved

    /// PDA seeds
    pub fn seeds() -> Vec<Vec<u8>> {
        vec![REGISTRY_SEED.to_vec()]
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner: Pubkey,
        market_admin: Pubkey,
        creation_fee: u64,
        share_price: u64,
        min_buy: u64,
        fee_bps: u16,
        bump: u8,
        created_at: i64,
    ) -> Self {
        Self {
            discriminator: REGISTRY_DISCRIMINATOR,
            owner,
            market_admin,
            creation_fee,
            share_price,
            min_buy,
            fee_bps,
            market_count: 0,
            fee_balance: 0,
            total_fees_collected: 0,
            created_at,
            bump,
            reserved: [0u8; 64],
        }
    }

    /// Hand out the next market ID and advance the counter
    pub fn assign_market_id(&mut self) -> Result<u64, BinaryMarketError> {
        let market_id = self.market_count;
        self.market_count = market_id
            .checked_add(1)
            .ok_or(BinaryMarketError::ArithmeticOverflow)?;
        Ok(market_id)
    }

    /// Book a creation fee into the fee sink
    pub fn collect_fee(&mut self, fee: u64) -> Result<(), BinaryMarketError> {
        let fee_balance = self
            .fee_balance
            .checked_add(fee)
            .ok_or(BinaryMarketError::ArithmeticOverflow)?;
        let total_fees_collected = self
            .total_fees_collected
            .checked_add(fee)
            .ok_or(BinaryMarketError::ArithmeticOverflow)?;
        self.fee_balance = fee_balance;
        self.total_fees_collected = total_fees_collected;
        Ok(())
    }

    /// IDs of the last `count` markets, most recent first
    pub fn recent_market_ids(&self, count: u64) -> Vec<u64> {
        let count = count
            .min(self.market_count)
            .min(MAX_RETURNED_MARKETS as u64);
        (0..count).map(|i| self.market_count - 1 - i).collect()
    }

    /// Page of all market IDs in creation order
    pub fn market_ids_page(&self, offset: u64, limit: u64) -> Vec<u64> {
        let limit = limit.min(MAX_RETURNED_MARKETS as u64);
        let end = offset.saturating_add(limit).min(self.market_count);
        (offset.min(end)..end).collect()
    }
}

/// A single binary-outcome market
///
/// PDA Seeds: ["market", market_id.to_le_bytes()]
///
/// The account's lamports above its rent-exempt minimum are the market's
/// balance: the pool, less payouts, less sweeps.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct Market {
    /// Account discriminator
    pub discriminator: u64,

    /// Unique market ID (sequential, assigned by the registry)
    pub market_id: u64,

    /// Market creator, sole holder of ordinary resolution rights
    pub creator: Pubkey,

    /// Emergency resolution and fee sweep authority
    pub administrator: Pubkey,

    /// Question text (immutable)
    pub question: String,

    /// Description text (immutable)
    pub description: String,

    /// Trading closes at this Unix timestamp
    pub end_time: i64,

    /// Has the market been resolved? Never resets.
    pub resolved: bool,

    /// Unix timestamp of resolution (0 until resolved)
    pub resolution_time: i64,

    /// Winning outcome, set together with `resolved`
    pub winning_outcome: Option<Outcome>,

    /// Aggregate shares per outcome, indexed by `Outcome::index`
    pub total_shares: [u64; 2],

    /// Total value deposited by all buys (lamports)
    pub pool: u64,

    /// Price of one share (lamports)
    pub share_price: u64,

    /// Minimum value accepted by a single buy (lamports)
    pub min_buy: u64,

    /// Redemption fee (basis points)
    pub fee_bps: u16,

    /// Net payouts made to winners
    pub total_paid_out: u64,

    /// Lamports swept to the administrator
    pub total_fees_swept: u64,

    /// Number of successful claims
    pub claim_count: u64,

    /// Market creation timestamp
    pub created_at: i64,

    /// Last update timestamp
    pub updated_at: i64,

    /// PDA bump
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 32],
}

impl Market {
    pub const SIZE: usize = 8   // discriminator
        + 8   // market_id
        + 32  // creator
        + 32  // administrator
        + 4 + MAX_QUESTION_LEN    // question
        + 4 + MAX_DESCRIPTION_LEN // description
        + 8   // end_time
        + 1   // resolved
        + 8   // resolution_time
        + 1 + 1 // winning_outcome (Option<Outcome>)
        + 16  // total_shares
        + 8   // pool
        + 8   // share_price
        + 8   // min_buy
        + 2   // fee_bps
        + 8   // total_paid_out
        + 8   // total_fees_swept
        + 8   // claim_count
        + 8   // created_at
        + 8   // updated_at
        + 1   // bump
        + 32; // reserved

    /// PDA seeds
    pub fn seeds(market_id: u64) -> Vec<Vec<u8>> {
        vec![
            MARKET_SEED.to_vec(),
            market_id.to_le_bytes().to_vec(),
        ]
    }

    /// Build a fresh market from the registry's current parameters
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        market_id: u64,
        creator: Pubkey,
        registry: &Registry,
        question: String,
        description: String,
        end_time: i64,
        bump: u8,
        created_at: i64,
    ) -> Self {
        Self {
            discriminator: MARKET_DISCRIMINATOR,
            market_id,
            creator,
            administrator: registry.market_admin,
            question,
            description,
            end_time,
            resolved: false,
            resolution_time: 0,
            winning_outcome: None,
            total_shares: [0u64; 2],
            pool: 0,
            share_price: registry.share_price,
            min_buy: registry.min_buy,
            fee_bps: registry.fee_bps,
            total_paid_out: 0,
            total_fees_swept: 0,
            claim_count: 0,
            created_at,
            updated_at: created_at,
            bump,
            reserved: [0u8; 32],
        }
    }

    /// Open for trading: before end time and not resolved
    pub fn is_open(&self, current_time: i64) -> bool {
        current_time < self.end_time && !self.resolved
    }

    pub fn total_shares_for(&self, outcome: Outcome) -> u64 {
        self.total_shares[outcome.index()]
    }

    /// YES probability in whole percent; 50 when no shares exist
    pub fn probability(&self) -> u64 {
        calculate_probability(
            self.total_shares_for(Outcome::Yes),
            self.total_shares_for(Outcome::No),
        )
    }

    /// Record a buy of `value` lamports on `outcome`.
    ///
    /// The whole value joins the pool; the remainder of `value / share_price`
    /// is not refunded. Returns the number of shares bought.
    pub fn record_trade(
        &mut self,
        outcome: Outcome,
        value: u64,
        current_time: i64,
    ) -> Result<u64, BinaryMarketError> {
        if !self.is_open(current_time) {
            return Err(BinaryMarketError::MarketClosed);
        }
        if value < self.min_buy {
            return Err(BinaryMarketError::BelowMinimum);
        }
        // A value that floors to zero shares is below the minimum too
        let shares = calculate_shares(value, self.share_price)?;
        if shares == 0 {
            return Err(BinaryMarketError::BelowMinimum);
        }

        let total = self.total_shares[outcome.index()]
            .checked_add(shares)
            .ok_or(BinaryMarketError::ArithmeticOverflow)?;
        let pool = self
            .pool
            .checked_add(value)
            .ok_or(BinaryMarketError::ArithmeticOverflow)?;

        self.total_shares[outcome.index()] = total;
        self.pool = pool;
        self.updated_at = current_time;
        Ok(shares)
    }

    /// Ordinary resolution by the creator once the end time has passed
    pub fn resolve(
        &mut self,
        caller: &Pubkey,
        outcome: Outcome,
        current_time: i64,
    ) -> Result<(), BinaryMarketError> {
        if *caller != self.creator {
            return Err(BinaryMarketError::NotCreator);
        }
        if self.resolved {
            return Err(BinaryMarketError::AlreadyResolved);
        }
        if current_time < self.end_time {
            return Err(BinaryMarketError::EndTimeNotReached);
        }
        self.finalize_resolution(outcome, current_time);
        Ok(())
    }

    /// Administrator override: no end-time floor
    pub fn emergency_resolve(
        &mut self,
        caller: &Pubkey,
        outcome: Outcome,
        current_time: i64,
    ) -> Result<(), BinaryMarketError> {
        if *caller != self.administrator {
            return Err(BinaryMarketError::NotAdministrator);
        }
        if self.resolved {
            return Err(BinaryMarketError::AlreadyResolved);
        }
        self.finalize_resolution(outcome, current_time);
        Ok(())
    }

    fn finalize_resolution(&mut self, outcome: Outcome, current_time: i64) {
        self.resolved = true;
        self.winning_outcome = Some(outcome);
        self.resolution_time = current_time;
        self.updated_at = current_time;
    }

    /// Push the end time later while the market is still open
    pub fn extend_end_time(
        &mut self,
        caller: &Pubkey,
        new_end_time: i64,
        current_time: i64,
    ) -> Result<i64, BinaryMarketError> {
        if *caller != self.creator {
            return Err(BinaryMarketError::NotCreator);
        }
        if !self.is_open(current_time) {
            return Err(BinaryMarketError::MarketClosed);
        }
        if new_end_time <= self.end_time {
            return Err(BinaryMarketError::InvalidEndTime);
        }
        let old_end_time = self.end_time;
        self.end_time = new_end_time;
        self.updated_at = current_time;
        Ok(old_end_time)
    }

    /// Payout owed to `position` if it claimed now
    pub fn compute_claim(&self, position: &Position) -> Result<Payout, BinaryMarketError> {
        let outcome = match (self.resolved, self.winning_outcome) {
            (true, Some(outcome)) => outcome,
            _ => return Err(BinaryMarketError::NotResolved),
        };
        if position.market_id != self.market_id {
            return Err(BinaryMarketError::PositionNotFound);
        }
        if position.claimed {
            return Err(BinaryMarketError::AlreadyClaimed);
        }
        let winning_shares = position.shares_for(outcome);
        let total_winning_shares = self.total_shares_for(outcome);
        if winning_shares == 0 || total_winning_shares == 0 {
            return Err(BinaryMarketError::NoWinningShares);
        }
        calculate_payout(self.pool, winning_shares, total_winning_shares, self.fee_bps)
    }

    /// Settle a claim: marks the position claimed and books the payout.
    ///
    /// The caller transfers `Payout::net` only after both accounts are
    /// written back.
    pub fn settle_claim(
        &mut self,
        position: &mut Position,
        caller: &Pubkey,
        current_time: i64,
    ) -> Result<Payout, BinaryMarketError> {
        if !self.resolved {
            return Err(BinaryMarketError::NotResolved);
        }
        if position.owner != *caller {
            return Err(BinaryMarketError::PositionOwnerMismatch);
        }
        let payout = self.compute_claim(position)?;

        let total_paid_out = self
            .total_paid_out
            .checked_add(payout.net)
            .ok_or(BinaryMarketError::ArithmeticOverflow)?;
        let claim_count = self
            .claim_count
            .checked_add(1)
            .ok_or(BinaryMarketError::ArithmeticOverflow)?;

        position.claimed = true;
        position.payout = payout.net;
        position.updated_at = current_time;
        self.total_paid_out = total_paid_out;
        self.claim_count = claim_count;
        self.updated_at = current_time;
        Ok(payout)
    }

    /// Net payout `participant` would receive now, or 0 if not claimable
    pub fn preview_claim(&self, participant: &Pubkey, position: Option<&Position>) -> u64 {
        match position {
            Some(position) if position.owner == *participant => self
                .compute_claim(position)
                .map(|payout| payout.net)
                .unwrap_or(0),
            _ => 0,
        }
    }

    /// Book a sweep of `amount` lamports to the administrator
    pub fn record_fee_sweep(
        &mut self,
        caller: &Pubkey,
        amount: u64,
        current_time: i64,
    ) -> Result<(), BinaryMarketError> {
        if *caller != self.administrator {
            return Err(BinaryMarketError::NotAdministrator);
        }
        if amount == 0 {
            return Err(BinaryMarketError::NothingToWithdraw);
        }
        self.total_fees_swept = self
            .total_fees_swept
            .checked_add(amount)
            .ok_or(BinaryMarketError::ArithmeticOverflow)?;
        self.updated_at = current_time;
        Ok(())
    }
}

/// A participant's holdings in one market
///
/// PDA Seeds: ["position", market_id.to_le_bytes(), owner.key()]
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct Position {
    /// Account discriminator
    pub discriminator: u64,

    /// Market ID
    pub market_id: u64,

    /// Position owner
    pub owner: Pubkey,

    /// Shares per outcome, indexed by `Outcome::index`
    pub shares: [u64; 2],

    /// Has this position redeemed its winnings?
    pub claimed: bool,

    /// Net payout received on claim
    pub payout: u64,

    /// Creation timestamp
    pub created_at: i64,

    /// Last update timestamp
    pub updated_at: i64,

    /// PDA bump
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 32],
}

impl Position {
    pub const SIZE: usize = 8   // discriminator
        + 8   // market_id
        + 32  // owner
        + 16  // shares
        + 1   // claimed
        + 8   // payout
        + 8   // created_at
        + 8   // updated_at
        + 1   // bump
        + 32; // reserved

    /// PDA seeds
    pub fn seeds(market_id: u64, owner: &Pubkey) -> Vec<Vec<u8>> {
        vec![
            POSITION_SEED.to_vec(),
            market_id.to_le_bytes().to_vec(),
            owner.to_bytes().to_vec(),
        ]
    }

    /// Create a new empty position
    pub fn new(market_id: u64, owner: Pubkey, bump: u8, created_at: i64) -> Self {
        Self {
            discriminator: POSITION_DISCRIMINATOR,
            market_id,
            owner,
            shares: [0u64; 2],
            claimed: false,
            payout: 0,
            created_at,
            updated_at: created_at,
            bump,
            reserved: [0u8; 32],
        }
    }

    pub fn shares_for(&self, outcome: Outcome) -> u64 {
        self.shares[outcome.index()]
    }

    pub fn add_shares(
        &mut self,
        outcome: Outcome,
        shares: u64,
        current_time: i64,
    ) -> Result<(), BinaryMarketError> {
        self.shares[outcome.index()] = self.shares[outcome.index()]
            .checked_add(shares)
            .ok_or(BinaryMarketError::ArithmeticOverflow)?;
        self.updated_at = current_time;
        Ok(())
    }
}

/// Append-only list of the markets one creator has opened
///
/// PDA Seeds: ["creator_index", creator.key()]
///
/// The account grows by 8 bytes per market.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct CreatorIndex {
    /// Account discriminator
    pub discriminator: u64,

    /// Creator these markets belong to
    pub creator: Pubkey,

    /// PDA bump
    pub bump: u8,

    /// Market IDs in creation order
    pub market_ids: Vec<u64>,
}

impl CreatorIndex {
    pub const BASE_SIZE: usize = 8 // discriminator
        + 32 // creator
        + 1  // bump
        + 4; // market_ids length prefix

    /// Account size holding `count` market IDs
    pub fn space_for(count: usize) -> usize {
        Self::BASE_SIZE + count * 8
    }

    /// PDA seeds
    pub fn seeds(creator: &Pubkey) -> Vec<Vec<u8>> {
        vec![
            CREATOR_INDEX_SEED.to_vec(),
            creator.to_bytes().to_vec(),
        ]
    }

    pub fn new(creator: Pubkey, bump: u8) -> Self {
        Self {
            discriminator: CREATOR_INDEX_DISCRIMINATOR,
            creator,
            bump,
            market_ids: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.market_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.market_ids.is_empty()
    }

    pub fn page(&self, offset: u64, limit: u64) -> Vec<u64> {
        let limit = limit.min(MAX_RETURNED_MARKETS as u64) as usize;
        self.market_ids
            .iter()
            .skip(offset.min(usize::MAX as u64) as usize)
            .take(limit)
            .copied()
            .collect()
    }
}

// ============================================================================
// Address derivation
// ============================================================================

pub fn find_registry_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[REGISTRY_SEED], program_id)
}

pub fn find_market_address(program_id: &Pubkey, market_id: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[MARKET_SEED, &market_id.to_le_bytes()], program_id)
}

pub fn find_position_address(program_id: &Pubkey, market_id: u64, owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[POSITION_SEED, &market_id.to_le_bytes(), owner.as_ref()],
        program_id,
    )
}

pub fn find_creator_index_address(program_id: &Pubkey, creator: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CREATOR_INDEX_SEED, creator.as_ref()], program_id)
}

// ============================================================================
// Tests
// ============================================================================
