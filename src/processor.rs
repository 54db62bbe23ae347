//! Instruction processor for the Binary Market Program

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::set_return_data,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::cpi::{check_system_program, create_pda_account, grow_account, transfer_from_signer};
use crate::error::BinaryMarketError;
use crate::events::MarketEvent;
use crate::instruction::{
    BinaryMarketInstruction, BuyArgs, CreateMarketArgs, ExtendEndTimeArgs,
    InitializeRegistryArgs, PageArgs, PreviewClaimArgs, RecentMarketsArgs, ResolveArgs,
    SetCreationFeeArgs, TransferOwnershipArgs,
};
use crate::state::{
    CreatorIndex, Market, Position, Registry,
    CREATOR_INDEX_DISCRIMINATOR, CREATOR_INDEX_SEED, MARKET_DISCRIMINATOR, MARKET_SEED,
    MAX_FEE_BPS, POSITION_DISCRIMINATOR, POSITION_SEED, REGISTRY_DISCRIMINATOR, REGISTRY_SEED,
};
use crate::utils::{
    calculate_end_time, check_signer, deserialize_account, get_current_timestamp,
    safe_sub_u64, transfer_lamports, validate_market_text, verify_pda, withdrawable_lamports,
};
use crate::views::{all_markets, markets_by_creator, recent_markets, MarketInfo};

/// Process an instruction
pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = BinaryMarketInstruction::try_from_slice(instruction_data)
        .map_err(|_| BinaryMarketError::InvalidInstruction)?;

    match instruction {
        // === Registry ===
        BinaryMarketInstruction::InitializeRegistry(args) => {
            msg!("Instruction: InitializeRegistry");
            process_initialize_registry(program_id, accounts, args)
        }
        BinaryMarketInstruction::CreateMarket(args) => {
            msg!("Instruction: CreateMarket");
            process_create_market(program_id, accounts, args)
        }

        // === Trading ===
        BinaryMarketInstruction::Buy(args) => {
            msg!("Instruction: Buy");
            process_buy(program_id, accounts, args)
        }

        // === Resolution ===
        BinaryMarketInstruction::Resolve(args) => {
            msg!("Instruction: Resolve");
            process_resolve(program_id, accounts, args, false)
        }
        BinaryMarketInstruction::EmergencyResolve(args) => {
            msg!("Instruction: EmergencyResolve");
            process_resolve(program_id, accounts, args, true)
        }

        // === Settlement ===
        BinaryMarketInstruction::Claim => {
            msg!("Instruction: Claim");
            process_claim(program_id, accounts)
        }

        // === Administration ===
        BinaryMarketInstruction::WithdrawMarketFees => {
            msg!("Instruction: WithdrawMarketFees");
            process_withdraw_market_fees(program_id, accounts)
        }
        BinaryMarketInstruction::ExtendEndTime(args) => {
            msg!("Instruction: ExtendEndTime");
            process_extend_end_time(program_id, accounts, args)
        }
        BinaryMarketInstruction::SetCreationFee(args) => {
            msg!("Instruction: SetCreationFee");
            process_set_creation_fee(program_id, accounts, args)
        }
        BinaryMarketInstruction::WithdrawRegistryFees => {
            msg!("Instruction: WithdrawRegistryFees");
            process_withdraw_registry_fees(program_id, accounts)
        }
        BinaryMarketInstruction::TransferOwnership(args) => {
            msg!("Instruction: TransferOwnership");
            process_transfer_ownership(program_id, accounts, args)
        }

        // === Views ===
        BinaryMarketInstruction::GetMarketInfo => {
            msg!("Instruction: GetMarketInfo");
            process_get_market_info(program_id, accounts)
        }
        BinaryMarketInstruction::PreviewClaim(args) => {
            msg!("Instruction: PreviewClaim");
            process_preview_claim(program_id, accounts, args)
        }
        BinaryMarketInstruction::GetProbability => {
            msg!("Instruction: GetProbability");
            process_get_probability(program_id, accounts)
        }
        BinaryMarketInstruction::IsMarketOpen => {
            msg!("Instruction: IsMarketOpen");
            process_is_market_open(program_id, accounts)
        }
        BinaryMarketInstruction::GetAllMarkets(args) => {
            msg!("Instruction: GetAllMarkets");
            process_get_all_markets(program_id, accounts, args)
        }
        BinaryMarketInstruction::GetMarketsByCreator(args) => {
            msg!("Instruction: GetMarketsByCreator");
            process_get_markets_by_creator(program_id, accounts, args)
        }
        BinaryMarketInstruction::GetRecentMarkets(args) => {
            msg!("Instruction: GetRecentMarkets");
            process_get_recent_markets(program_id, accounts, args)
        }
    }
}

// ============================================================================
// Account loading
// ============================================================================

fn load_registry(program_id: &Pubkey, registry_info: &AccountInfo) -> Result<Registry, ProgramError> {
    verify_pda(registry_info.key, program_id, &[REGISTRY_SEED])?;

    if registry_info.owner != program_id || registry_info.data_is_empty() {
        msg!("Error: Registry not initialized");
        return Err(BinaryMarketError::AccountNotInitialized.into());
    }

    let registry = deserialize_account::<Registry>(&registry_info.data.borrow())?;
    if registry.discriminator != REGISTRY_DISCRIMINATOR {
        msg!("Error: Invalid Registry discriminator");
        return Err(BinaryMarketError::InvalidAccountData.into());
    }
    Ok(registry)
}

fn load_market(program_id: &Pubkey, market_info: &AccountInfo) -> Result<Market, ProgramError> {
    if market_info.owner != program_id || market_info.data_is_empty() {
        msg!("Error: Market {} not initialized", market_info.key);
        return Err(BinaryMarketError::AccountNotInitialized.into());
    }

    let market = deserialize_account::<Market>(&market_info.data.borrow())?;
    if market.discriminator != MARKET_DISCRIMINATOR {
        msg!("Error: Invalid Market discriminator");
        return Err(BinaryMarketError::InvalidAccountData.into());
    }

    verify_pda(
        market_info.key,
        program_id,
        &[MARKET_SEED, &market.market_id.to_le_bytes()],
    )?;
    Ok(market)
}

/// Load an existing position; `None` if the account was never created
fn load_position(
    program_id: &Pubkey,
    position_info: &AccountInfo,
    market_id: u64,
    owner: &Pubkey,
) -> Result<(Option<Position>, u8), ProgramError> {
    let bump = verify_pda(
        position_info.key,
        program_id,
        &[POSITION_SEED, &market_id.to_le_bytes(), owner.as_ref()],
    )?;

    if position_info.data_is_empty() {
        return Ok((None, bump));
    }
    if position_info.owner != program_id {
        return Err(BinaryMarketError::InvalidAccountData.into());
    }

    let position = deserialize_account::<Position>(&position_info.data.borrow())?;
    if position.discriminator != POSITION_DISCRIMINATOR {
        msg!("Error: Invalid Position discriminator");
        return Err(BinaryMarketError::InvalidAccountData.into());
    }
    if position.owner != *owner {
        msg!("Error: Position belongs to {}", position.owner);
        return Err(BinaryMarketError::PositionOwnerMismatch.into());
    }
    Ok((Some(position), bump))
}

fn load_creator_index(
    program_id: &Pubkey,
    creator_index_info: &AccountInfo,
    creator: &Pubkey,
) -> Result<(Option<CreatorIndex>, u8), ProgramError> {
    let bump = verify_pda(
        creator_index_info.key,
        program_id,
        &[CREATOR_INDEX_SEED, creator.as_ref()],
    )?;

    if creator_index_info.data_is_empty() {
        return Ok((None, bump));
    }
    if creator_index_info.owner != program_id {
        return Err(BinaryMarketError::InvalidAccountData.into());
    }

    let index = deserialize_account::<CreatorIndex>(&creator_index_info.data.borrow())?;
    if index.discriminator != CREATOR_INDEX_DISCRIMINATOR || index.creator != *creator {
        msg!("Error: Invalid CreatorIndex account");
        return Err(BinaryMarketError::InvalidAccountData.into());
    }
    Ok((Some(index), bump))
}

// ============================================================================
// Registry
// ============================================================================

fn process_initialize_registry(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: InitializeRegistryArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    // Account 0: Owner (signer, payer)
    let owner_info = next_account_info(account_info_iter)?;
    check_signer(owner_info)?;

    // Account 1: Registry PDA (writable)
    let registry_info = next_account_info(account_info_iter)?;

    // Account 2: System Program
    let system_program_info = next_account_info(account_info_iter)?;
    check_system_program(system_program_info)?;

    let registry_bump = verify_pda(registry_info.key, program_id, &[REGISTRY_SEED])?;

    // Check if already initialized
    if !registry_info.data_is_empty() {
        msg!("Error: Registry already initialized");
        return Err(BinaryMarketError::AlreadyInitialized.into());
    }

    if args.share_price == 0 {
        msg!("Error: Share price must be nonzero");
        return Err(BinaryMarketError::InvalidSharePrice.into());
    }
    if args.min_buy == 0 {
        msg!("Error: Minimum buy must be nonzero");
        return Err(BinaryMarketError::InvalidMinBuy.into());
    }
    if args.fee_bps > MAX_FEE_BPS {
        msg!("Error: Fee {} bps exceeds {} bps", args.fee_bps, MAX_FEE_BPS);
        return Err(BinaryMarketError::InvalidFeeBps.into());
    }
    if args.market_admin == Pubkey::default() {
        msg!("Error: Market administrator cannot be the zero address");
        return Err(BinaryMarketError::InvalidOwner.into());
    }

    create_pda_account(
        owner_info,
        registry_info,
        Registry::SIZE,
        program_id,
        system_program_info,
        &[REGISTRY_SEED, &[registry_bump]],
    )?;

    let current_time = get_current_timestamp()?;
    let registry = Registry::new(
        *owner_info.key,
        args.market_admin,
        args.creation_fee,
        args.share_price,
        args.min_buy,
        args.fee_bps,
        registry_bump,
        current_time,
    );
    registry.serialize(&mut &mut registry_info.data.borrow_mut()[..])?;

    MarketEvent::RegistryInitialized {
        owner: *owner_info.key,
        market_admin: args.market_admin,
        creation_fee: args.creation_fee,
        share_price: args.share_price,
        min_buy: args.min_buy,
        fee_bps: args.fee_bps,
    }
    .emit()?;

    msg!("Registry initialized successfully");
    msg!("Owner: {}", owner_info.key);
    msg!("Market Admin: {}", args.market_admin);
    msg!("Share Price: {}, Min Buy: {}, Fee: {} bps", args.share_price, args.min_buy, args.fee_bps);

    Ok(())
}

fn process_create_market(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: CreateMarketArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    // Account 0: Creator (signer)
    let creator_info = next_account_info(account_info_iter)?;
    check_signer(creator_info)?;

    // Account 1: Registry (writable)
    let registry_info = next_account_info(account_info_iter)?;

    // Account 2: Market PDA (writable)
    let market_info = next_account_info(account_info_iter)?;

    // Account 3: CreatorIndex PDA (writable)
    let creator_index_info = next_account_info(account_info_iter)?;

    // Account 4: System Program
    let system_program_info = next_account_info(account_info_iter)?;
    check_system_program(system_program_info)?;

    let mut registry = load_registry(program_id, registry_info)?;

    // Validate market parameters
    if let Err(e) = validate_market_text(&args.question, &args.description) {
        msg!("Error: Invalid market text: {}", e);
        return Err(e.into());
    }
    let current_time = get_current_timestamp()?;
    let end_time = calculate_end_time(current_time, args.duration_days).map_err(|e| {
        msg!("Error: Invalid duration {} days", args.duration_days);
        e
    })?;

    let fee = registry.creation_fee;
    if args.payment < fee {
        msg!("Error: Payment {} below creation fee {}", args.payment, fee);
        return Err(BinaryMarketError::InsufficientPayment.into());
    }
    let refund = safe_sub_u64(args.payment, fee)?;

    // Allocate market_id
    let market_id = registry.assign_market_id()?;
    let market_id_bytes = market_id.to_le_bytes();

    // Verify Market PDA
    let market_bump = verify_pda(market_info.key, program_id, &[MARKET_SEED, &market_id_bytes])?;
    if !market_info.data_is_empty() {
        msg!("Error: Market {} already exists", market_id);
        return Err(BinaryMarketError::AlreadyInitialized.into());
    }

    let (creator_index, creator_index_bump) =
        load_creator_index(program_id, creator_index_info, creator_info.key)?;

    // Create Market account
    create_pda_account(
        creator_info,
        market_info,
        Market::SIZE,
        program_id,
        system_program_info,
        &[MARKET_SEED, &market_id_bytes, &[market_bump]],
    )?;

    // Create or grow the creator's index
    let mut creator_index = match creator_index {
        Some(index) => {
            grow_account(
                creator_index_info,
                creator_info,
                system_program_info,
                CreatorIndex::space_for(index.len() + 1),
            )?;
            index
        }
        None => {
            create_pda_account(
                creator_info,
                creator_index_info,
                CreatorIndex::space_for(1),
                program_id,
                system_program_info,
                &[CREATOR_INDEX_SEED, creator_info.key.as_ref(), &[creator_index_bump]],
            )?;
            CreatorIndex::new(*creator_info.key, creator_index_bump)
        }
    };
    creator_index.market_ids.push(market_id);

    // Take the full payment; the excess goes back below
    if args.payment > 0 {
        transfer_from_signer(creator_info, registry_info, system_program_info, args.payment)?;
    }
    registry.collect_fee(fee)?;

    let market = Market::new(
        market_id,
        *creator_info.key,
        &registry,
        args.question,
        args.description,
        end_time,
        market_bump,
        current_time,
    );
    market.serialize(&mut &mut market_info.data.borrow_mut()[..])?;
    creator_index.serialize(&mut &mut creator_index_info.data.borrow_mut()[..])?;
    registry.serialize(&mut &mut registry_info.data.borrow_mut()[..])?;

    if refund > 0 {
        transfer_lamports(registry_info, creator_info, refund)?;
    }

    MarketEvent::MarketCreated {
        market_id,
        market: *market_info.key,
        creator: *creator_info.key,
        question: market.question.clone(),
        end_time,
        fee_paid: fee,
        refund,
    }
    .emit()?;

    msg!("Market created successfully");
    msg!("Market ID: {}", market_id);
    msg!("Market: {}", market_info.key);
    msg!("Creator: {}", creator_info.key);
    msg!("End Time: {}", end_time);
    msg!("Fee: {}, Refund: {}", fee, refund);

    set_return_data(&market_id.to_le_bytes());

    Ok(())
}

fn process_set_creation_fee(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: SetCreationFeeArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let owner_info = next_account_info(account_info_iter)?;
    check_signer(owner_info)?;

    let registry_info = next_account_info(account_info_iter)?;
    let mut registry = load_registry(program_id, registry_info)?;

    if *owner_info.key != registry.owner {
        msg!("Error: Only the registry owner can set the creation fee");
        return Err(BinaryMarketError::NotOwner.into());
    }

    let old_fee = registry.creation_fee;
    registry.creation_fee = args.creation_fee;
    registry.serialize(&mut &mut registry_info.data.borrow_mut()[..])?;

    MarketEvent::CreationFeeUpdated {
        old_fee,
        new_fee: args.creation_fee,
    }
    .emit()?;

    msg!("Creation fee updated: {} -> {}", old_fee, args.creation_fee);

    Ok(())
}

fn process_withdraw_registry_fees(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let owner_info = next_account_info(account_info_iter)?;
    check_signer(owner_info)?;

    let registry_info = next_account_info(account_info_iter)?;
    let mut registry = load_registry(program_id, registry_info)?;

    if *owner_info.key != registry.owner {
        msg!("Error: Only the registry owner can withdraw fees");
        return Err(BinaryMarketError::NotOwner.into());
    }

    let amount = withdrawable_lamports(registry_info)?;
    if amount == 0 {
        msg!("Error: No fees to withdraw");
        return Err(BinaryMarketError::NothingToWithdraw.into());
    }

    registry.fee_balance = 0;
    registry.serialize(&mut &mut registry_info.data.borrow_mut()[..])?;

    transfer_lamports(registry_info, owner_info, amount)?;

    MarketEvent::RegistryFeesWithdrawn {
        owner: *owner_info.key,
        amount,
    }
    .emit()?;

    msg!("Registry fees withdrawn: {} to {}", amount, owner_info.key);

    Ok(())
}

fn process_transfer_ownership(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: TransferOwnershipArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let owner_info = next_account_info(account_info_iter)?;
    check_signer(owner_info)?;

    let registry_info = next_account_info(account_info_iter)?;
    let mut registry = load_registry(program_id, registry_info)?;

    if *owner_info.key != registry.owner {
        msg!("Error: Only the registry owner can transfer ownership");
        return Err(BinaryMarketError::NotOwner.into());
    }
    if args.new_owner == Pubkey::default() {
        msg!("Error: New owner cannot be the zero address");
        return Err(BinaryMarketError::InvalidOwner.into());
    }

    let previous_owner = registry.owner;
    registry.owner = args.new_owner;
    registry.serialize(&mut &mut registry_info.data.borrow_mut()[..])?;

    MarketEvent::OwnershipTransferred {
        previous_owner,
        new_owner: args.new_owner,
    }
    .emit()?;

    msg!("Ownership transferred: {} -> {}", previous_owner, args.new_owner);

    Ok(())
}

// ============================================================================
// Trading
// ============================================================================

fn process_buy(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: BuyArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    // Account 0: Participant (signer, writable)
    let participant_info = next_account_info(account_info_iter)?;
    check_signer(participant_info)?;

    // Account 1: Market (writable)
    let market_info = next_account_info(account_info_iter)?;

    // Account 2: Position PDA (writable)
    let position_info = next_account_info(account_info_iter)?;

    // Account 3: System Program
    let system_program_info = next_account_info(account_info_iter)?;
    check_system_program(system_program_info)?;

    let mut market = load_market(program_id, market_info)?;
    let current_time = get_current_timestamp()?;

    let shares = market
        .record_trade(args.outcome, args.value, current_time)
        .map_err(|e| {
            msg!("Error: Buy rejected on market {}: {}", market.market_id, e);
            e
        })?;

    let (position, position_bump) =
        load_position(program_id, position_info, market.market_id, participant_info.key)?;
    let mut position = match position {
        Some(position) => position,
        None => {
            create_pda_account(
                participant_info,
                position_info,
                Position::SIZE,
                program_id,
                system_program_info,
                &[
                    POSITION_SEED,
                    &market.market_id.to_le_bytes(),
                    participant_info.key.as_ref(),
                    &[position_bump],
                ],
            )?;
            msg!("Position PDA created: {}", position_info.key);
            Position::new(market.market_id, *participant_info.key, position_bump, current_time)
        }
    };
    position.add_shares(args.outcome, shares, current_time)?;

    transfer_from_signer(participant_info, market_info, system_program_info, args.value)?;

    market.serialize(&mut &mut market_info.data.borrow_mut()[..])?;
    position.serialize(&mut &mut position_info.data.borrow_mut()[..])?;

    MarketEvent::TradeRecorded {
        market_id: market.market_id,
        participant: *participant_info.key,
        outcome: args.outcome,
        shares,
        value: args.value,
        timestamp: current_time,
    }
    .emit()?;

    msg!(
        "Bought {} {:?} shares for {} on market {}",
        shares,
        args.outcome,
        args.value,
        market.market_id
    );
    msg!("Pool: {}, Shares: YES={} NO={}", market.pool, market.total_shares[0], market.total_shares[1]);

    Ok(())
}

fn process_extend_end_time(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: ExtendEndTimeArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    let creator_info = next_account_info(account_info_iter)?;
    check_signer(creator_info)?;

    let market_info = next_account_info(account_info_iter)?;
    let mut market = load_market(program_id, market_info)?;

    let current_time = get_current_timestamp()?;
    let old_end_time = market
        .extend_end_time(creator_info.key, args.new_end_time, current_time)
        .map_err(|e| {
            msg!("Error: Cannot extend market {}: {}", market.market_id, e);
            e
        })?;
    market.serialize(&mut &mut market_info.data.borrow_mut()[..])?;

    MarketEvent::EndTimeExtended {
        market_id: market.market_id,
        old_end_time,
        new_end_time: args.new_end_time,
    }
    .emit()?;

    msg!("Market {} end time extended: {} -> {}", market.market_id, old_end_time, args.new_end_time);

    Ok(())
}

// ============================================================================
// Resolution
// ============================================================================

fn process_resolve(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: ResolveArgs,
    emergency: bool,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    // Account 0: Creator or Administrator (signer)
    let resolver_info = next_account_info(account_info_iter)?;
    check_signer(resolver_info)?;

    // Account 1: Market (writable)
    let market_info = next_account_info(account_info_iter)?;
    let mut market = load_market(program_id, market_info)?;

    let current_time = get_current_timestamp()?;
    let result = if emergency {
        market.emergency_resolve(resolver_info.key, args.outcome, current_time)
    } else {
        market.resolve(resolver_info.key, args.outcome, current_time)
    };
    if let Err(e) = result {
        msg!("Error: Cannot resolve market {}: {}", market.market_id, e);
        return Err(e.into());
    }

    market.serialize(&mut &mut market_info.data.borrow_mut()[..])?;

    MarketEvent::MarketResolved {
        market_id: market.market_id,
        resolver: *resolver_info.key,
        outcome: args.outcome,
        resolution_time: current_time,
        emergency,
    }
    .emit()?;

    msg!(
        "Market {} resolved: {:?} wins (emergency: {})",
        market.market_id,
        args.outcome,
        emergency
    );

    Ok(())
}

// ============================================================================
// Settlement
// ============================================================================

fn process_claim(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    // Account 0: Participant (signer, writable)
    let participant_info = next_account_info(account_info_iter)?;
    check_signer(participant_info)?;

    // Account 1: Market (writable)
    let market_info = next_account_info(account_info_iter)?;

    // Account 2: Position PDA (writable)
    let position_info = next_account_info(account_info_iter)?;

    let mut market = load_market(program_id, market_info)?;
    if !market.resolved {
        msg!("Error: Market {} not resolved", market.market_id);
        return Err(BinaryMarketError::NotResolved.into());
    }

    let (position, _) =
        load_position(program_id, position_info, market.market_id, participant_info.key)?;
    let mut position = position.ok_or_else(|| {
        msg!("Error: No position for {} on market {}", participant_info.key, market.market_id);
        BinaryMarketError::PositionNotFound
    })?;

    let current_time = get_current_timestamp()?;
    let payout = market
        .settle_claim(&mut position, participant_info.key, current_time)
        .map_err(|e| {
            msg!("Error: Claim rejected on market {}: {}", market.market_id, e);
            e
        })?;

    // Claimed flag and totals are written before any lamports move
    position.serialize(&mut &mut position_info.data.borrow_mut()[..])?;
    market.serialize(&mut &mut market_info.data.borrow_mut()[..])?;

    if payout.net > 0 {
        transfer_lamports(market_info, participant_info, payout.net)?;
    }

    MarketEvent::WinningsClaimed {
        market_id: market.market_id,
        participant: *participant_info.key,
        gross: payout.gross,
        fee: payout.fee,
        net: payout.net,
    }
    .emit()?;

    msg!("Claimed on market {}: gross={}, fee={}, net={}", market.market_id, payout.gross, payout.fee, payout.net);

    Ok(())
}

fn process_withdraw_market_fees(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();

    // Account 0: Administrator (signer, writable)
    let admin_info = next_account_info(account_info_iter)?;
    check_signer(admin_info)?;

    // Account 1: Market (writable)
    let market_info = next_account_info(account_info_iter)?;
    let mut market = load_market(program_id, market_info)?;

    let current_time = get_current_timestamp()?;
    let amount = withdrawable_lamports(market_info)?;
    if let Err(e) = market.record_fee_sweep(admin_info.key, amount, current_time) {
        msg!("Error: Cannot sweep market {}: {}", market.market_id, e);
        return Err(e.into());
    }
    if !market.resolved {
        msg!("Warning: Sweeping unresolved market {}, pending claims are unfunded", market.market_id);
    }

    market.serialize(&mut &mut market_info.data.borrow_mut()[..])?;

    transfer_lamports(market_info, admin_info, amount)?;

    MarketEvent::MarketFeesWithdrawn {
        market_id: market.market_id,
        administrator: *admin_info.key,
        amount,
    }
    .emit()?;

    msg!("Market {} swept: {} to {}", market.market_id, amount, admin_info.key);

    Ok(())
}

// ============================================================================
// Views
// ============================================================================

fn process_get_market_info(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let market_info = next_account_info(account_info_iter)?;
    let market = load_market(program_id, market_info)?;

    let current_time = get_current_timestamp()?;
    let info = MarketInfo::new(*market_info.key, &market, current_time);
    set_return_data(&info.try_to_vec()?);
    Ok(())
}

fn process_preview_claim(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: PreviewClaimArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let market_info = next_account_info(account_info_iter)?;
    let position_info = next_account_info(account_info_iter)?;
    let market = load_market(program_id, market_info)?;

    let (position, _) = load_position(program_id, position_info, market.market_id, &args.participant)?;
    let amount = market.preview_claim(&args.participant, position.as_ref());
    set_return_data(&amount.try_to_vec()?);
    Ok(())
}

fn process_get_probability(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let market_info = next_account_info(account_info_iter)?;
    let market = load_market(program_id, market_info)?;

    set_return_data(&market.probability().try_to_vec()?);
    Ok(())
}

fn process_is_market_open(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let market_info = next_account_info(account_info_iter)?;
    let market = load_market(program_id, market_info)?;

    let current_time = get_current_timestamp()?;
    set_return_data(&market.is_open(current_time).try_to_vec()?);
    Ok(())
}

fn process_get_all_markets(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: PageArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let registry_info = next_account_info(account_info_iter)?;
    let registry = load_registry(program_id, registry_info)?;

    let handles = all_markets(program_id, &registry, args.offset, args.limit);
    set_return_data(&handles.try_to_vec()?);
    Ok(())
}

fn process_get_markets_by_creator(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: PageArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let creator_index_info = next_account_info(account_info_iter)?;

    let handles = if creator_index_info.data_is_empty() || creator_index_info.owner != program_id {
        // Creator has not opened any market yet
        Vec::new()
    } else {
        let index = deserialize_account::<CreatorIndex>(&creator_index_info.data.borrow())?;
        if index.discriminator != CREATOR_INDEX_DISCRIMINATOR {
            return Err(BinaryMarketError::InvalidAccountData.into());
        }
        verify_pda(
            creator_index_info.key,
            program_id,
            &[CREATOR_INDEX_SEED, index.creator.as_ref()],
        )?;
        markets_by_creator(program_id, &index, args.offset, args.limit)
    };
    set_return_data(&handles.try_to_vec()?);
    Ok(())
}

fn process_get_recent_markets(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    args: RecentMarketsArgs,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let registry_info = next_account_info(account_info_iter)?;
    let registry = load_registry(program_id, registry_info)?;

    let handles = recent_markets(program_id, &registry, args.count);
    set_return_data(&handles.try_to_vec()?);
    Ok(())
}
