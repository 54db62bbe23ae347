//! CPI (Cross-Program Invocation) helpers for the Binary Market Program
//!
//! All value enters the program through the System Program:
//! - PDA account creation (registry, markets, positions, creator indices)
//! - Lamport transfers from signing wallets (buys, creation payments)
//! - Rent top-ups when an account grows
//!
//! Value leaving the program is moved directly between account balances
//! (see `utils::transfer_lamports`), since the program owns the source.

use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
    system_program,
    sysvar::Sysvar,
};

use crate::error::BinaryMarketError;

/// Verify the account passed as System Program
pub fn check_system_program(system_program_info: &AccountInfo) -> ProgramResult {
    if *system_program_info.key != system_program::ID {
        msg!("Error: Invalid System Program");
        return Err(BinaryMarketError::InvalidSystemProgram.into());
    }
    Ok(())
}

/// Create a rent-exempt PDA account owned by `owner`
///
/// PDA addresses are predictable, so the target may already hold lamports
/// sent by anyone. `create_account` rejects such an account; in that case the
/// balance is topped up to the rent minimum and the account is allocated and
/// assigned under the PDA signature instead.
pub fn create_pda_account<'a>(
    payer: &AccountInfo<'a>,
    pda: &AccountInfo<'a>,
    space: usize,
    owner: &Pubkey,
    system_program: &AccountInfo<'a>,
    seeds: &[&[u8]],
) -> ProgramResult {
    let rent = Rent::get()?;
    let required_lamports = rent.minimum_balance(space);
    let current_lamports = pda.lamports();

    if current_lamports == 0 {
        invoke_signed(
            &system_instruction::create_account(
                payer.key,
                pda.key,
                required_lamports,
                space as u64,
                owner,
            ),
            &[payer.clone(), pda.clone(), system_program.clone()],
            &[seeds],
        )?;
        return Ok(());
    }

    msg!("{} is prefunded with {} lamports", pda.key, current_lamports);
    if current_lamports < required_lamports {
        transfer_from_signer(payer, pda, system_program, required_lamports - current_lamports)?;
    }

    invoke_signed(
        &system_instruction::allocate(pda.key, space as u64),
        &[pda.clone(), system_program.clone()],
        &[seeds],
    )?;
    invoke_signed(
        &system_instruction::assign(pda.key, owner),
        &[pda.clone(), system_program.clone()],
        &[seeds],
    )?;

    Ok(())
}

/// Transfer lamports from a signing wallet (CPI to System Program)
///
/// Fails with `InsufficientFunds` before invoking when the wallet cannot
/// cover `amount`.
pub fn transfer_from_signer<'a>(
    from: &AccountInfo<'a>,
    to: &AccountInfo<'a>,
    system_program: &AccountInfo<'a>,
    amount: u64,
) -> ProgramResult {
    if from.lamports() < amount {
        msg!("Error: {} holds {} lamports, needs {}", from.key, from.lamports(), amount);
        return Err(BinaryMarketError::InsufficientFunds.into());
    }

    invoke(
        &system_instruction::transfer(from.key, to.key, amount),
        &[from.clone(), to.clone(), system_program.clone()],
    )?;

    Ok(())
}

/// Grow a program-owned account to `new_space`, with `payer` covering the
/// extra rent
pub fn grow_account<'a>(
    account: &AccountInfo<'a>,
    payer: &AccountInfo<'a>,
    system_program: &AccountInfo<'a>,
    new_space: usize,
) -> ProgramResult {
    let rent = Rent::get()?;
    let required_lamports = rent.minimum_balance(new_space);
    let current_lamports = account.lamports();
    if current_lamports < required_lamports {
        let diff = required_lamports - current_lamports;
        transfer_from_signer(payer, account, system_program, diff)?;
        msg!("Transferred {} lamports for rent", diff);
    }

    account.realloc(new_space, false)?;

    Ok(())
}
