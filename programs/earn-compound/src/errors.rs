use anchor_lang::prelude::*;

#[error_code]
pub enum StakingError {
    #[msg("Unauthorized")]
    Unauthorized,

    #[msg("Amount is zero or exceeds the allowed cap")]
    InvalidAmount,

    #[msg("Ledger did not move the exact amount requested")]
    LedgerTransferFailed,

    #[msg("Token supply did not shrink by the burned amount")]
    BurnVerificationFailed,

    #[msg("Reward too small to move the reward index")]
    DustTooSmall,

    #[msg("Withdrawal cannot be finalized before its epoch")]
    NotYetEligible,

    #[msg("Accounting invariant violated")]
    AccountingInvariantViolated,

    #[msg("Pool is paused")]
    PoolPaused,

    #[msg("Pool must be paused for this operation")]
    PoolNotPaused,

    #[msg("A withdrawal is pending for this account")]
    WithdrawalPending,

    #[msg("No withdrawal request pending")]
    NoWithdrawalRequest,

    #[msg("Burn percentage exceeds 10000 basis points")]
    InvalidBurnPercentage,

    #[msg("Epoch length must be positive")]
    InvalidEpochLength,

    #[msg("Epoch length can only change before the first epoch elapses")]
    EpochAlreadyStarted,

    #[msg("Distributor whitelist is full")]
    DistributorListFull,

    #[msg("Duplicate recipient in batch")]
    DuplicateRecipient,

    #[msg("Invalid batch range")]
    InvalidBatchRange,

    #[msg("Batch deposit cap exceeded")]
    BatchCapExceeded,

    #[msg("Stake account does not match recipient or pool")]
    InvalidStakeAccount,

    #[msg("Unallocated buffer cannot be reclaimed yet")]
    BufferLocked,

    #[msg("Nothing to recover")]
    NothingToRecover,

    #[msg("Arithmetic overflow")]
    Overflow,
}
