//! Utility functions for the Binary Market Program

use borsh::BorshDeserialize;
use solana_program::{
    account_info::AccountInfo,
    clock::Clock,
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
    rent::Rent,
    sysvar::Sysvar,
};

use crate::error::BinaryMarketError;
use crate::state::{
    BPS_DENOMINATOR, MAX_DESCRIPTION_LEN, MAX_DURATION_DAYS, MAX_QUESTION_LEN, SECONDS_PER_DAY,
};

/// Result of the redemption formula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    /// Proportional share of the pool
    pub gross: u64,
    /// Platform fee kept in the market account
    pub fee: u64,
    /// Amount transferred to the winner
    pub net: u64,
}

/// Safely deserialize account data using BorshDeserialize::deserialize
/// This does NOT require the slice to be fully consumed, which is important
/// when the account has padding bytes at the end.
pub fn deserialize_account<T: BorshDeserialize>(data: &[u8]) -> Result<T, ProgramError> {
    T::deserialize(&mut &data[..])
        .map_err(|_| ProgramError::InvalidAccountData)
}

/// Check if a signer is authorized
pub fn check_signer(account: &AccountInfo) -> ProgramResult {
    if !account.is_signer {
        msg!("Error: {} must sign", account.key);
        return Err(BinaryMarketError::InvalidSigner.into());
    }
    Ok(())
}

/// Verify PDA derivation
pub fn verify_pda(
    expected: &Pubkey,
    program_id: &Pubkey,
    seeds: &[&[u8]],
) -> Result<u8, ProgramError> {
    let (pda, bump) = Pubkey::find_program_address(seeds, program_id);
    if pda != *expected {
        msg!("PDA mismatch: expected {}, got {}", pda, expected);
        return Err(BinaryMarketError::InvalidPDA.into());
    }
    Ok(bump)
}

/// Get current timestamp from Clock sysvar
pub fn get_current_timestamp() -> Result<i64, ProgramError> {
    let clock = Clock::get()?;
    Ok(clock.unix_timestamp)
}

/// Lamports held above the account's rent-exempt minimum
pub fn withdrawable_lamports(account: &AccountInfo) -> Result<u64, ProgramError> {
    let rent = Rent::get()?;
    let reserve = rent.minimum_balance(account.data_len());
    Ok(account.lamports().saturating_sub(reserve))
}

/// Move lamports out of a program-owned account.
///
/// Never dips into the rent-exempt reserve; fails with `TransferFailed`
/// when the balance above rent cannot cover `amount`.
pub fn transfer_lamports<'a>(
    from: &AccountInfo<'a>,
    to: &AccountInfo<'a>,
    amount: u64,
) -> ProgramResult {
    let available = withdrawable_lamports(from)?;
    if available < amount {
        msg!("Error: Transfer of {} exceeds available balance {}", amount, available);
        return Err(BinaryMarketError::TransferFailed.into());
    }
    let to_balance = safe_add_u64(to.lamports(), amount)?;
    **from.try_borrow_mut_lamports()? -= amount;
    **to.try_borrow_mut_lamports()? = to_balance;
    Ok(())
}

/// Safe addition for u64
pub fn safe_add_u64(a: u64, b: u64) -> Result<u64, BinaryMarketError> {
    a.checked_add(b)
        .ok_or(BinaryMarketError::ArithmeticOverflow)
}

/// Safe subtraction for u64
pub fn safe_sub_u64(a: u64, b: u64) -> Result<u64, BinaryMarketError> {
    a.checked_sub(b)
        .ok_or(BinaryMarketError::ArithmeticOverflow)
}

/// Safe division for u64
pub fn safe_div_u64(a: u64, b: u64) -> Result<u64, BinaryMarketError> {
    if b == 0 {
        return Err(BinaryMarketError::ArithmeticOverflow);
    }
    Ok(a / b)
}

/// Calculate fee amount from total and basis points
pub fn calculate_fee(amount: u64, fee_bps: u16) -> u64 {
    ((amount as u128) * (fee_bps as u128) / (BPS_DENOMINATOR as u128)) as u64
}

/// Shares bought by `value`, floored
pub fn calculate_shares(value: u64, share_price: u64) -> Result<u64, BinaryMarketError> {
    safe_div_u64(value, share_price)
}

/// Pro-rata redemption: `pool * shares / total_shares`, then the fee.
///
/// Rounds down at both steps, so the sum of all payouts never exceeds `pool`.
pub fn calculate_payout(
    pool: u64,
    shares: u64,
    total_shares: u64,
    fee_bps: u16,
) -> Result<Payout, BinaryMarketError> {
    if total_shares == 0 || shares > total_shares {
        return Err(BinaryMarketError::NoWinningShares);
    }
    // shares <= total_shares keeps the quotient within u64
    let gross = ((pool as u128) * (shares as u128) / (total_shares as u128)) as u64;
    let fee = calculate_fee(gross, fee_bps);
    let net = safe_sub_u64(gross, fee)?;
    Ok(Payout { gross, fee, net })
}

/// YES probability in whole percent, or 50 when no shares exist
pub fn calculate_probability(yes_shares: u64, no_shares: u64) -> u64 {
    let total = (yes_shares as u128) + (no_shares as u128);
    if total == 0 {
        return 50;
    }
    ((yes_shares as u128) * 100 / total) as u64
}

/// End time for a market opened now for `duration_days`
pub fn calculate_end_time(current_time: i64, duration_days: u64) -> Result<i64, BinaryMarketError> {
    if duration_days == 0 || duration_days > MAX_DURATION_DAYS {
        return Err(BinaryMarketError::InvalidDuration);
    }
    (duration_days as i64)
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|secs| current_time.checked_add(secs))
        .ok_or(BinaryMarketError::ArithmeticOverflow)
}

/// Validate question and description text
pub fn validate_market_text(question: &str, description: &str) -> Result<(), BinaryMarketError> {
    if question.is_empty() {
        return Err(BinaryMarketError::EmptyQuestion);
    }
    if question.len() > MAX_QUESTION_LEN {
        return Err(BinaryMarketError::QuestionTooLong);
    }
    if description.len() > MAX_DESCRIPTION_LEN {
        return Err(BinaryMarketError::DescriptionTooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_fee() {
        // 1 SOL with 2% fee = 0.02 SOL
        assert_eq!(calculate_fee(1_000_000_000, 200), 20_000_000);

        // 1 SOL with 0.1% fee
        assert_eq!(calculate_fee(1_000_000_000, 10), 1_000_000);

        // rounds down
        assert_eq!(calculate_fee(49, 200), 0);
        assert_eq!(calculate_fee(50, 200), 1);
    }

    #[test]
    fn test_calculate_shares() {
        assert_eq!(calculate_shares(100, 10).unwrap(), 10);
        assert_eq!(calculate_shares(109, 10).unwrap(), 10);
        assert_eq!(calculate_shares(9, 10).unwrap(), 0);
        assert!(calculate_shares(100, 0).is_err());
    }

    #[test]
    fn test_calculate_payout() {
        // Sole winner of a 2 SOL pool with a 2% fee
        let payout = calculate_payout(2_000_000_000, 10, 10, 200).unwrap();
        assert_eq!(payout.gross, 2_000_000_000);
        assert_eq!(payout.fee, 40_000_000);
        assert_eq!(payout.net, 1_960_000_000);

        // One third of 100: floors to 33
        let payout = calculate_payout(100, 1, 3, 0).unwrap();
        assert_eq!(payout, Payout { gross: 33, fee: 0, net: 33 });
    }

    #[test]
    fn test_calculate_payout_no_overflow() {
        let payout = calculate_payout(u64::MAX, u64::MAX - 1, u64::MAX, 0).unwrap();
        assert_eq!(payout.gross, u64::MAX - 1);

        let payout = calculate_payout(u64::MAX, u64::MAX, u64::MAX, 10_000).unwrap();
        assert_eq!(payout.net, 0);
    }

    #[test]
    fn test_calculate_payout_guards() {
        assert_eq!(
            calculate_payout(100, 0, 0, 200),
            Err(BinaryMarketError::NoWinningShares)
        );
        assert_eq!(
            calculate_payout(100, 5, 4, 200),
            Err(BinaryMarketError::NoWinningShares)
        );
    }

    #[test]
    fn test_payouts_never_exceed_pool() {
        let pool = 1_000_000_007u64;
        let holdings = [7u64, 13, 29, 51];
        let total: u64 = holdings.iter().sum();
        let paid: u64 = holdings
            .iter()
            .map(|shares| calculate_payout(pool, *shares, total, 200).unwrap().net)
            .sum();
        assert!(paid <= pool);
    }

    #[test]
    fn test_calculate_probability() {
        assert_eq!(calculate_probability(0, 0), 50);
        assert_eq!(calculate_probability(10, 10), 50);
        assert_eq!(calculate_probability(2, 1), 66);
        assert_eq!(calculate_probability(0, 5), 0);
        assert_eq!(calculate_probability(u64::MAX, u64::MAX), 50);
    }

    #[test]
    fn test_calculate_end_time() {
        assert_eq!(calculate_end_time(1_000, 1).unwrap(), 1_000 + 86_400);
        assert_eq!(calculate_end_time(0, 365).unwrap(), 365 * 86_400);
        assert_eq!(calculate_end_time(0, 0), Err(BinaryMarketError::InvalidDuration));
        assert_eq!(calculate_end_time(0, 366), Err(BinaryMarketError::InvalidDuration));
        assert_eq!(
            calculate_end_time(i64::MAX, 1),
            Err(BinaryMarketError::ArithmeticOverflow)
        );
    }

    #[test]
    fn test_validate_market_text() {
        assert!(validate_market_text("Will it rain?", "").is_ok());
        assert_eq!(validate_market_text("", "x"), Err(BinaryMarketError::EmptyQuestion));
        assert_eq!(
            validate_market_text(&"q".repeat(MAX_QUESTION_LEN + 1), ""),
            Err(BinaryMarketError::QuestionTooLong)
        );
        assert_eq!(
            validate_market_text("q", &"d".repeat(MAX_DESCRIPTION_LEN + 1)),
            Err(BinaryMarketError::DescriptionTooLong)
        );
    }

    #[test]
    fn test_safe_arithmetic() {
        // Safe add
        assert_eq!(safe_add_u64(100, 50).unwrap(), 150);
        assert!(safe_add_u64(u64::MAX, 1).is_err());

        // Safe sub
        assert_eq!(safe_sub_u64(100, 50).unwrap(), 50);
        assert!(safe_sub_u64(50, 100).is_err());

        // Safe div
        assert_eq!(safe_div_u64(100, 5).unwrap(), 20);
        assert!(safe_div_u64(100, 0).is_err());
    }
}
