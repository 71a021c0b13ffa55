pub mod initialize;
pub mod create_pool;
pub mod open_stake_account;
pub mod deposit;
pub mod deposit_on_behalf;
pub mod request_withdrawal;
pub mod cancel_withdrawal;
pub mod finalize_withdrawal;
pub mod emergency_exit;
pub mod distribute;
pub mod poke;
pub mod batch_deposit_for;
pub mod update_pool;
pub mod recover;
pub mod views;

pub use initialize::*;
pub use create_pool::*;
pub use open_stake_account::*;
pub use deposit::*;
pub use deposit_on_behalf::*;
pub use request_withdrawal::*;
pub use cancel_withdrawal::*;
pub use finalize_withdrawal::*;
pub use emergency_exit::*;
pub use distribute::*;
pub use poke::*;
pub use batch_deposit_for::*;
pub use update_pool::*;
pub use recover::*;
pub use views::*;

use anchor_lang::{
    prelude::*,
    system_program::{transfer, Transfer},
};

use crate::events::{AccountingAnomaly, EpochRolled};
use crate::state::{RollOutcome, StakingPool};

/// Grows the pool account so the staged schedule fits when Anchor writes it
/// back. The rent difference comes from `payer`.
pub(crate) fn fit_pool_account<'info>(
    pool: &Account<'info, StakingPool>,
    payer: &AccountInfo<'info>,
    system_program: &Program<'info, System>,
) -> Result<()> {
    let pool_info = pool.to_account_info();
    let new_size = pool.required_space();
    if new_size <= pool_info.data_len() {
        return Ok(());
    }

    let rent_exempt_lamports = Rent::get()?.minimum_balance(new_size).max(1);
    let top_up_lamports = rent_exempt_lamports.saturating_sub(pool_info.lamports());
    if top_up_lamports > 0 {
        transfer(
            CpiContext::new(
                system_program.to_account_info(),
                Transfer {
                    from: payer.clone(),
                    to: pool_info.clone(),
                },
            ),
            top_up_lamports,
        )?;
    }

    pool_info.realloc(new_size, false)?;
    msg!("Pool account resized to {} bytes", new_size);
    Ok(())
}

/// Logs and emits what an epoch roll did on the way into an instruction
pub(crate) fn report_roll(pool: Pubkey, eligible_total: u64, roll: &RollOutcome, timestamp: i64) {
    if roll.advanced() {
        emit!(EpochRolled {
            pool,
            from_epoch: roll.from_epoch,
            to_epoch: roll.to_epoch,
            added: roll.added,
            removed: roll.removed,
            eligible_total,
            buffer_released: roll.buffer_released,
        });
        msg!(
            "Epoch {} -> {}: +{} -{} eligible",
            roll.from_epoch,
            roll.to_epoch,
            roll.added,
            roll.removed
        );
    }

    if roll.shortfall > 0 {
        report_anomaly(pool, roll.to_epoch, roll.shortfall, timestamp);
    }
}

pub(crate) fn report_anomaly(pool: Pubkey, epoch: u64, shortfall: u64, timestamp: i64) {
    emit!(AccountingAnomaly {
        pool,
        epoch,
        shortfall,
        timestamp,
    });
    msg!("Accounting anomaly at epoch {}: shortfall {}", epoch, shortfall);
}
