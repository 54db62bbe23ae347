//! Instruction definitions for the Binary Market Program

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::state::{
    find_creator_index_address, find_market_address, find_position_address,
    find_registry_address, Outcome,
};

/// All instructions supported by the Binary Market Program
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub enum BinaryMarketInstruction {
    // =========================================================================
    // Registry
    // =========================================================================

    /// Initialize the registry singleton
    ///
    /// Accounts:
    /// 0. `[signer, writable]` Owner (payer)
    /// 1. `[writable]` Registry PDA
    /// 2. `[]` System Program
    InitializeRegistry(InitializeRegistryArgs),

    /// Create a new market. The full `payment` moves to the registry;
    /// `payment - creation_fee` is refunded in the same instruction.
    ///
    /// Accounts:
    /// 0. `[signer, writable]` Creator
    /// 1. `[writable]` Registry
    /// 2. `[writable]` Market PDA (id = registry.market_count)
    /// 3. `[writable]` CreatorIndex PDA
    /// 4. `[]` System Program
    CreateMarket(CreateMarketArgs),

    // =========================================================================
    // Trading
    // =========================================================================

    /// Buy shares of one outcome
    ///
    /// Accounts:
    /// 0. `[signer, writable]` Participant
    /// 1. `[writable]` Market
    /// 2. `[writable]` Position PDA (created on first buy)
    /// 3. `[]` System Program
    Buy(BuyArgs),

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve after the end time (creator only)
    ///
    /// Accounts:
    /// 0. `[signer]` Creator
    /// 1. `[writable]` Market
    Resolve(ResolveArgs),

    /// Resolve at any time before resolution (administrator only)
    ///
    /// Accounts:
    /// 0. `[signer]` Administrator
    /// 1. `[writable]` Market
    EmergencyResolve(ResolveArgs),

    // =========================================================================
    // Settlement
    // =========================================================================

    /// Redeem winnings from a resolved market, once
    ///
    /// Accounts:
    /// 0. `[signer, writable]` Participant
    /// 1. `[writable]` Market
    /// 2. `[writable]` Position PDA
    Claim,

    // =========================================================================
    // Administration
    // =========================================================================

    /// Sweep every lamport above rent from the market to its administrator.
    ///
    /// Trust assumption: this is not gated on resolution. Called before all
    /// winners have claimed, it takes funds they expect; their later claims
    /// fail with `TransferFailed`.
    ///
    /// Accounts:
    /// 0. `[signer, writable]` Administrator
    /// 1. `[writable]` Market
    WithdrawMarketFees,

    /// Move the end time later while the market is open (creator only)
    ///
    /// Accounts:
    /// 0. `[signer]` Creator
    /// 1. `[writable]` Market
    ExtendEndTime(ExtendEndTimeArgs),

    /// Change the market creation fee (registry owner only)
    ///
    /// Accounts:
    /// 0. `[signer]` Owner
    /// 1. `[writable]` Registry
    SetCreationFee(SetCreationFeeArgs),

    /// Withdraw collected creation fees (registry owner only)
    ///
    /// Accounts:
    /// 0. `[signer, writable]` Owner
    /// 1. `[writable]` Registry
    WithdrawRegistryFees,

    /// Hand the registry to a new owner (registry owner only)
    ///
    /// Accounts:
    /// 0. `[signer]` Owner
    /// 1. `[writable]` Registry
    TransferOwnership(TransferOwnershipArgs),

    // =========================================================================
    // Views (read-only, result in return data)
    // =========================================================================

    /// Returns `MarketInfo`
    ///
    /// Accounts:
    /// 0. `[]` Market
    GetMarketInfo,

    /// Returns the net payout as `u64`, 0 when not claimable
    ///
    /// Accounts:
    /// 0. `[]` Market
    /// 1. `[]` Position PDA of `participant` (may not exist)
    PreviewClaim(PreviewClaimArgs),

    /// Returns the YES probability in percent as `u64`
    ///
    /// Accounts:
    /// 0. `[]` Market
    GetProbability,

    /// Returns `bool`
    ///
    /// Accounts:
    /// 0. `[]` Market
    IsMarketOpen,

    /// Returns `Vec<Pubkey>` of market handles in creation order
    ///
    /// Accounts:
    /// 0. `[]` Registry
    GetAllMarkets(PageArgs),

    /// Returns `Vec<Pubkey>` of one creator's market handles in creation order
    ///
    /// Accounts:
    /// 0. `[]` CreatorIndex PDA
    GetMarketsByCreator(PageArgs),

    /// Returns `Vec<Pubkey>` of the latest market handles, most recent first
    ///
    /// Accounts:
    /// 0. `[]` Registry
    GetRecentMarkets(RecentMarketsArgs),
}

// ============================================================================
// Instruction Arguments
// ============================================================================

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct InitializeRegistryArgs {
    /// Administrator stamped into every new market
    pub market_admin: Pubkey,
    /// Fee per market creation (lamports)
    pub creation_fee: u64,
    /// Price of one share (lamports)
    pub share_price: u64,
    /// Minimum value per buy (lamports)
    pub min_buy: u64,
    /// Redemption fee (basis points, max 1000)
    pub fee_bps: u16,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct CreateMarketArgs {
    pub question: String,
    pub description: String,
    /// Trading window in days (1..=365)
    pub duration_days: u64,
    /// Lamports offered; must cover the creation fee
    pub payment: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct BuyArgs {
    pub outcome: Outcome,
    /// Lamports to deposit
    pub value: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct ResolveArgs {
    pub outcome: Outcome,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct ExtendEndTimeArgs {
    pub new_end_time: i64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct SetCreationFeeArgs {
    pub creation_fee: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct TransferOwnershipArgs {
    pub new_owner: Pubkey,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct PreviewClaimArgs {
    pub participant: Pubkey,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct PageArgs {
    pub offset: u64,
    /// Capped at `MAX_RETURNED_MARKETS`
    pub limit: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct RecentMarketsArgs {
    pub count: u64,
}

// ============================================================================
// Instruction Builders
// ============================================================================

fn build(
    program_id: &Pubkey,
    accounts: Vec<AccountMeta>,
    ix: BinaryMarketInstruction,
) -> Result<Instruction, ProgramError> {
    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: ix.try_to_vec()?,
    })
}

pub fn initialize_registry(
    program_id: &Pubkey,
    owner: &Pubkey,
    args: InitializeRegistryArgs,
) -> Result<Instruction, ProgramError> {
    let (registry, _) = find_registry_address(program_id);
    build(
        program_id,
        vec![
            AccountMeta::new(*owner, true),
            AccountMeta::new(registry, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        BinaryMarketInstruction::InitializeRegistry(args),
    )
}

/// `market_id` must equal the registry's current `market_count`
pub fn create_market(
    program_id: &Pubkey,
    creator: &Pubkey,
    market_id: u64,
    args: CreateMarketArgs,
) -> Result<Instruction, ProgramError> {
    let (registry, _) = find_registry_address(program_id);
    let (market, _) = find_market_address(program_id, market_id);
    let (creator_index, _) = find_creator_index_address(program_id, creator);
    build(
        program_id,
        vec![
            AccountMeta::new(*creator, true),
            AccountMeta::new(registry, false),
            AccountMeta::new(market, false),
            AccountMeta::new(creator_index, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        BinaryMarketInstruction::CreateMarket(args),
    )
}

pub fn buy(
    program_id: &Pubkey,
    participant: &Pubkey,
    market_id: u64,
    outcome: Outcome,
    value: u64,
) -> Result<Instruction, ProgramError> {
    let (market, _) = find_market_address(program_id, market_id);
    let (position, _) = find_position_address(program_id, market_id, participant);
    build(
        program_id,
        vec![
            AccountMeta::new(*participant, true),
            AccountMeta::new(market, false),
            AccountMeta::new(position, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        BinaryMarketInstruction::Buy(BuyArgs { outcome, value }),
    )
}

pub fn resolve(program_id: &Pubkey, creator: &Pubkey, market_id: u64, outcome: Outcome) -> Result<Instruction, ProgramError> {
    let (market, _) = find_market_address(program_id, market_id);
    build(
        program_id,
        vec![
            AccountMeta::new_readonly(*creator, true),
            AccountMeta::new(market, false),
        ],
        BinaryMarketInstruction::Resolve(ResolveArgs { outcome }),
    )
}

pub fn emergency_resolve(
    program_id: &Pubkey,
    administrator: &Pubkey,
    market_id: u64,
    outcome: Outcome,
) -> Result<Instruction, ProgramError> {
    let (market, _) = find_market_address(program_id, market_id);
    build(
        program_id,
        vec![
            AccountMeta::new_readonly(*administrator, true),
            AccountMeta::new(market, false),
        ],
        BinaryMarketInstruction::EmergencyResolve(ResolveArgs { outcome }),
    )
}

pub fn claim(program_id: &Pubkey, participant: &Pubkey, market_id: u64) -> Result<Instruction, ProgramError> {
    let (market, _) = find_market_address(program_id, market_id);
    let (position, _) = find_position_address(program_id, market_id, participant);
    build(
        program_id,
        vec![
            AccountMeta::new(*participant, true),
            AccountMeta::new(market, false),
            AccountMeta::new(position, false),
        ],
        BinaryMarketInstruction::Claim,
    )
}

/// Sweeps the whole market balance above rent, live pool included.
/// See [`BinaryMarketInstruction::WithdrawMarketFees`].
pub fn withdraw_market_fees(program_id: &Pubkey, administrator: &Pubkey, market_id: u64) -> Result<Instruction, ProgramError> {
    let (market, _) = find_market_address(program_id, market_id);
    build(
        program_id,
        vec![
            AccountMeta::new(*administrator, true),
            AccountMeta::new(market, false),
        ],
        BinaryMarketInstruction::WithdrawMarketFees,
    )
}

pub fn extend_end_time(
    program_id: &Pubkey,
    creator: &Pubkey,
    market_id: u64,
    new_end_time: i64,
) -> Result<Instruction, ProgramError> {
    let (market, _) = find_market_address(program_id, market_id);
    build(
        program_id,
        vec![
            AccountMeta::new_readonly(*creator, true),
            AccountMeta::new(market, false),
        ],
        BinaryMarketInstruction::ExtendEndTime(ExtendEndTimeArgs { new_end_time }),
    )
}

pub fn set_creation_fee(program_id: &Pubkey, owner: &Pubkey, creation_fee: u64) -> Result<Instruction, ProgramError> {
    let (registry, _) = find_registry_address(program_id);
    build(
        program_id,
        vec![
            AccountMeta::new_readonly(*owner, true),
            AccountMeta::new(registry, false),
        ],
        BinaryMarketInstruction::SetCreationFee(SetCreationFeeArgs { creation_fee }),
    )
}

pub fn withdraw_registry_fees(program_id: &Pubkey, owner: &Pubkey) -> Result<Instruction, ProgramError> {
    let (registry, _) = find_registry_address(program_id);
    build(
        program_id,
        vec![
            AccountMeta::new(*owner, true),
            AccountMeta::new(registry, false),
        ],
        BinaryMarketInstruction::WithdrawRegistryFees,
    )
}

pub fn transfer_ownership(program_id: &Pubkey, owner: &Pubkey, new_owner: &Pubkey) -> Result<Instruction, ProgramError> {
    let (registry, _) = find_registry_address(program_id);
    build(
        program_id,
        vec![
            AccountMeta::new_readonly(*owner, true),
            AccountMeta::new(registry, false),
        ],
        BinaryMarketInstruction::TransferOwnership(TransferOwnershipArgs { new_owner: *new_owner }),
    )
}

pub fn get_market_info(program_id: &Pubkey, market_id: u64) -> Result<Instruction, ProgramError> {
    let (market, _) = find_market_address(program_id, market_id);
    build(
        program_id,
        vec![AccountMeta::new_readonly(market, false)],
        BinaryMarketInstruction::GetMarketInfo,
    )
}

pub fn preview_claim(program_id: &Pubkey, participant: &Pubkey, market_id: u64) -> Result<Instruction, ProgramError> {
    let (market, _) = find_market_address(program_id, market_id);
    let (position, _) = find_position_address(program_id, market_id, participant);
    build(
        program_id,
        vec![
            AccountMeta::new_readonly(market, false),
            AccountMeta::new_readonly(position, false),
        ],
        BinaryMarketInstruction::PreviewClaim(PreviewClaimArgs { participant: *participant }),
    )
}

pub fn get_probability(program_id: &Pubkey, market_id: u64) -> Result<Instruction, ProgramError> {
    let (market, _) = find_market_address(program_id, market_id);
    build(
        program_id,
        vec![AccountMeta::new_readonly(market, false)],
        BinaryMarketInstruction::GetProbability,
    )
}

pub fn is_market_open(program_id: &Pubkey, market_id: u64) -> Result<Instruction, ProgramError> {
    let (market, _) = find_market_address(program_id, market_id);
    build(
        program_id,
        vec![AccountMeta::new_readonly(market, false)],
        BinaryMarketInstruction::IsMarketOpen,
    )
}

pub fn get_all_markets(program_id: &Pubkey, offset: u64, limit: u64) -> Result<Instruction, ProgramError> {
    let (registry, _) = find_registry_address(program_id);
    build(
        program_id,
        vec![AccountMeta::new_readonly(registry, false)],
        BinaryMarketInstruction::GetAllMarkets(PageArgs { offset, limit }),
    )
}

pub fn get_markets_by_creator(program_id: &Pubkey, creator: &Pubkey, offset: u64, limit: u64) -> Result<Instruction, ProgramError> {
    let (creator_index, _) = find_creator_index_address(program_id, creator);
    build(
        program_id,
        vec![AccountMeta::new_readonly(creator_index, false)],
        BinaryMarketInstruction::GetMarketsByCreator(PageArgs { offset, limit }),
    )
}

pub fn get_recent_markets(program_id: &Pubkey, count: u64) -> Result<Instruction, ProgramError> {
    let (registry, _) = find_registry_address(program_id);
    build(
        program_id,
        vec![AccountMeta::new_readonly(registry, false)],
        BinaryMarketInstruction::GetRecentMarkets(RecentMarketsArgs { count }),
    )
}

// ============================================================================
// Tests
// ============================================================================
