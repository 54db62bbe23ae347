//! Error types for the Binary Market Program

use num_derive::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    program_error::ProgramError,
};
use thiserror::Error;

/// Coarse error class surfaced to callers.
///
/// Every [`BinaryMarketError`] belongs to exactly one category; the numeric
/// code range of the variant encodes it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCategory {
    /// Account plumbing and arithmetic
    General,
    /// Wrong caller for a privileged operation
    Unauthorized,
    /// Wrong lifecycle phase
    InvalidState,
    /// Rejected arguments
    InvalidInput,
    /// Value-transfer leg did not complete
    TransferFailure,
}

/// Errors that may be returned by the Binary Market Program
#[derive(Clone, Debug, Eq, Error, FromPrimitive, PartialEq)]
pub enum BinaryMarketError {
    // === General Errors (0-99) ===

    #[error("Invalid instruction")]
    InvalidInstruction = 0,

    #[error("Invalid account data")]
    InvalidAccountData = 1,

    #[error("Account not initialized")]
    AccountNotInitialized = 2,

    #[error("Already initialized")]
    AlreadyInitialized = 3,

    #[error("Invalid PDA")]
    InvalidPDA = 4,

    #[error("Invalid signer")]
    InvalidSigner = 5,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow = 6,

    #[error("Invalid system program")]
    InvalidSystemProgram = 7,

    // === Unauthorized (100-199) ===

    #[error("Caller is not the market creator")]
    NotCreator = 100,

    #[error("Caller is not the market administrator")]
    NotAdministrator = 101,

    #[error("Caller is not the registry owner")]
    NotOwner = 102,

    #[error("Position owner mismatch")]
    PositionOwnerMismatch = 103,

    // === Invalid State (200-299) ===

    #[error("Market is closed for trading")]
    MarketClosed = 200,

    #[error("Market end time not reached")]
    EndTimeNotReached = 201,

    #[error("Market already resolved")]
    AlreadyResolved = 202,

    #[error("Market not resolved")]
    NotResolved = 203,

    #[error("Winnings already claimed")]
    AlreadyClaimed = 204,

    #[error("No winning shares")]
    NoWinningShares = 205,

    #[error("Position not found")]
    PositionNotFound = 206,

    #[error("Nothing to withdraw")]
    NothingToWithdraw = 207,

    // === Invalid Input (300-399) ===

    #[error("Question cannot be empty")]
    EmptyQuestion = 300,

    #[error("Question too long")]
    QuestionTooLong = 301,

    #[error("Description too long")]
    DescriptionTooLong = 302,

    #[error("Duration must be between 1 and 365 days")]
    InvalidDuration = 303,

    #[error("Value below minimum buy")]
    BelowMinimum = 304,

    #[error("Payment below creation fee")]
    InsufficientPayment = 306,

    #[error("New end time must be later than the current one")]
    InvalidEndTime = 307,

    #[error("Invalid owner")]
    InvalidOwner = 308,

    #[error("Fee basis points too high")]
    InvalidFeeBps = 309,

    #[error("Share price must be nonzero")]
    InvalidSharePrice = 310,

    #[error("Minimum buy must be nonzero")]
    InvalidMinBuy = 311,

    // === Transfer Failure (400-499) ===

    #[error("Insufficient funds")]
    InsufficientFunds = 400,

    #[error("Value transfer failed")]
    TransferFailed = 401,
}

impl BinaryMarketError {
    /// Numeric code carried in `ProgramError::Custom`
    pub fn code(&self) -> u32 {
        self.clone() as u32
    }

    pub fn category(&self) -> ErrorCategory {
        match self.code() {
            100..=199 => ErrorCategory::Unauthorized,
            200..=299 => ErrorCategory::InvalidState,
            300..=399 => ErrorCategory::InvalidInput,
            400..=499 => ErrorCategory::TransferFailure,
            _ => ErrorCategory::General,
        }
    }
}

impl From<BinaryMarketError> for ProgramError {
    fn from(e: BinaryMarketError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for BinaryMarketError {
    fn type_of() -> &'static str {
        "BinaryMarketError"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    #[test]
    fn test_error_to_program_error() {
        let err: ProgramError = BinaryMarketError::AlreadyClaimed.into();
        assert_eq!(err, ProgramError::Custom(204));
    }

    #[test]
    fn test_decode_custom_code() {
        assert_eq!(
            BinaryMarketError::from_u32(205),
            Some(BinaryMarketError::NoWinningShares)
        );
        assert_eq!(
            BinaryMarketError::from_u32(401),
            Some(BinaryMarketError::TransferFailed)
        );
        assert_eq!(BinaryMarketError::from_u32(999), None);
    }

    #[test]
    fn test_categories() {
        assert_eq!(BinaryMarketError::NotCreator.category(), ErrorCategory::Unauthorized);
        assert_eq!(BinaryMarketError::NotAdministrator.category(), ErrorCategory::Unauthorized);
        assert_eq!(BinaryMarketError::MarketClosed.category(), ErrorCategory::InvalidState);
        assert_eq!(BinaryMarketError::AlreadyResolved.category(), ErrorCategory::InvalidState);
        assert_eq!(BinaryMarketError::AlreadyClaimed.category(), ErrorCategory::InvalidState);
        assert_eq!(BinaryMarketError::EmptyQuestion.category(), ErrorCategory::InvalidInput);
        assert_eq!(BinaryMarketError::BelowMinimum.category(), ErrorCategory::InvalidInput);
        assert_eq!(BinaryMarketError::from_u32(305), None);
        assert_eq!(BinaryMarketError::TransferFailed.category(), ErrorCategory::TransferFailure);
        assert_eq!(BinaryMarketError::ArithmeticOverflow.category(), ErrorCategory::General);
    }
}
