mod common;

use anchor_lang::prelude::*;
use common::{at, Harness};
use earn_compound::engine;
use earn_compound::errors::StakingError;

#[test]
fn test_deposit_and_withdraw_round_trip() {
    let mut h = Harness::new();
    let a = h.staker();

    h.deposit(&a, 500, at(0)).unwrap();
    assert_eq!(h.ledger.balance(&a), 0);
    assert_eq!(h.pool.staker_count, 1);

    let receipt = h.request_withdrawal(&a, at(1)).unwrap();
    assert_eq!(receipt.amount, 500);
    assert_eq!(receipt.withdrawal_epoch, 2);

    assert_eq!(
        h.finalize_withdrawal(&a, at(1)).unwrap_err(),
        StakingError::NotYetEligible.into()
    );

    let receipt = h.finalize_withdrawal(&a, at(2)).unwrap();
    assert_eq!(receipt.amount, 500);
    assert_eq!(h.ledger.balance(&a), 500);
    assert_eq!(h.pool.total_staked, 0);
    assert_eq!(h.pool.eligible_total, 0);
    assert_eq!(h.pool.staker_count, 0);
    assert_eq!(h.pool.schedule.slots(), 0);

    let account = h.account(&a);
    assert_eq!(account.balance, 0);
    assert!(!account.withdrawal_pending);
}

#[test]
fn test_withdrawing_stake_earns_until_its_boundary() {
    let mut h = Harness::new();
    let a = h.staker();
    let b = h.staker();

    h.deposit(&a, 100, at(0)).unwrap();
    h.deposit(&b, 100, at(0)).unwrap();
    h.request_withdrawal(&a, at(1)).unwrap();

    h.income(100, at(1)).unwrap();
    assert_eq!(h.pending_reward(&a, at(1)), 25);

    h.income(100, at(2)).unwrap();
    assert_eq!(h.pending_reward(&a, at(2)), 25);
    assert_eq!(h.pending_reward(&b, at(2)), 25 + 50);

    let receipt = h.finalize_withdrawal(&a, at(2)).unwrap();
    assert_eq!(receipt.amount, 125);
    assert_eq!(h.ledger.balance(&a), 125);
    h.assert_consistent(at(2), 0);
}

#[test]
fn test_withdrawal_request_drops_stake_not_yet_eligible() {
    let mut h = Harness::new();
    let a = h.staker();
    let b = h.staker();

    h.deposit(&b, 100, at(0)).unwrap();
    h.deposit(&a, 100, at(0)).unwrap();
    h.request_withdrawal(&a, at(0)).unwrap();

    h.roll(at(1));
    assert_eq!(h.pool.eligible_total, 100);

    // B holds every eligible token
    h.income(100, at(1)).unwrap();
    assert_eq!(h.pending_reward(&b, at(1)), 50);
    assert_eq!(h.pending_reward(&a, at(1)), 0);

    let receipt = h.finalize_withdrawal(&a, at(1)).unwrap();
    assert_eq!(receipt.amount, 100);
    h.assert_consistent(at(1), 0);
}

#[test]
fn test_deposit_refused_while_withdrawing() {
    let mut h = Harness::new();
    let a = h.staker();

    h.deposit(&a, 100, at(0)).unwrap();
    h.request_withdrawal(&a, at(1)).unwrap();

    assert_eq!(
        h.deposit(&a, 10, at(1)).unwrap_err(),
        StakingError::WithdrawalPending.into()
    );
    assert_eq!(
        h.request_withdrawal(&a, at(1)).unwrap_err(),
        StakingError::WithdrawalPending.into()
    );
}

#[test]
fn test_cancel_before_boundary_keeps_earning() {
    let mut h = Harness::new();
    let a = h.staker();

    h.deposit(&a, 100, at(0)).unwrap();
    h.request_withdrawal(&a, at(1)).unwrap();
    h.cancel_withdrawal(&a, at(1)).unwrap();

    h.roll(at(2));
    assert_eq!(h.pool.eligible_total, 100);

    h.income(100, at(2)).unwrap();
    assert_eq!(h.pending_reward(&a, at(2)), 50);
    assert!(!h.account(&a).withdrawal_pending);
    h.assert_consistent(at(2), 0);
}

#[test]
fn test_cancel_after_boundary_reschedules_whole_balance() {
    let mut h = Harness::new();
    let a = h.staker();

    h.deposit(&a, 100, at(0)).unwrap();
    h.income(100, at(1)).unwrap();

    let receipt = h.request_withdrawal(&a, at(1)).unwrap();
    assert_eq!(receipt.settlement.reward, 50);
    assert_eq!(receipt.amount, 150);

    let receipt = h.cancel_withdrawal(&a, at(2)).unwrap();
    assert_eq!(receipt.amount, 150);
    assert_eq!(h.pool.eligible_total, 0);
    assert_eq!(h.account(&a).pending_addition, 150);
    assert_eq!(h.account(&a).addition_epoch, 3);

    h.roll(at(3));
    assert_eq!(h.pool.eligible_total, 150);
    h.assert_consistent(at(3), 0);
}

#[test]
fn test_cancel_without_request_fails() {
    let mut h = Harness::new();
    let a = h.staker();
    h.deposit(&a, 100, at(0)).unwrap();

    assert_eq!(
        h.cancel_withdrawal(&a, at(0)).unwrap_err(),
        StakingError::NoWithdrawalRequest.into()
    );
    assert_eq!(
        h.finalize_withdrawal(&a, at(3)).unwrap_err(),
        StakingError::NoWithdrawalRequest.into()
    );
}

#[test]
fn test_emergency_exit_purges_scheduled_addition() {
    let mut h = Harness::new();
    let a = h.staker();
    let b = h.staker();

    h.deposit(&a, 100, at(0)).unwrap();
    h.deposit(&b, 250, at(0)).unwrap();

    let receipt = h.emergency_exit(&b, at(0)).unwrap();
    assert_eq!(receipt.amount, 250);
    assert_eq!(receipt.forfeited, 0);
    assert_eq!(h.ledger.balance(&b), 250);

    // same state as if B had never deposited
    let mut alone = Harness::new();
    let only = alone.staker();
    alone.deposit(&only, 100, at(0)).unwrap();

    h.roll(at(1));
    alone.roll(at(1));
    assert_eq!(h.pool.eligible_total, 100);
    assert_eq!(h.pool.eligible_total, alone.pool.eligible_total);
    assert_eq!(h.pool.total_staked, alone.pool.total_staked);
    h.assert_consistent(at(1), 0);
}

#[test]
fn test_emergency_exit_after_applied_addition() {
    let mut h = Harness::new();
    let a = h.staker();

    h.deposit(&a, 100, at(0)).unwrap();
    h.roll(at(1));
    assert_eq!(h.pool.eligible_total, 100);

    h.emergency_exit(&a, at(1)).unwrap();
    assert_eq!(h.pool.eligible_total, 0);
    assert_eq!(h.pool.total_staked, 0);
    assert_eq!(h.pool.schedule.slots(), 0);
}

#[test]
fn test_emergency_exit_retracts_pending_removal() {
    let mut h = Harness::new();
    let a = h.staker();
    let b = h.staker();

    h.deposit(&a, 100, at(0)).unwrap();
    h.deposit(&b, 40, at(0)).unwrap();
    h.request_withdrawal(&a, at(1)).unwrap();

    h.emergency_exit(&a, at(1)).unwrap();
    assert_eq!(h.pool.eligible_total, 40);

    let outcome = h.pool.roll(at(2)).unwrap();
    assert_eq!(outcome.shortfall, 0);
    assert_eq!(h.pool.eligible_total, 40);
    h.assert_consistent(at(2), 0);
}

#[test]
fn test_emergency_exit_forfeits_unsettled_reward() {
    let mut h = Harness::new();
    let a = h.staker();

    h.deposit(&a, 100, at(0)).unwrap();
    h.income(100, at(1)).unwrap();
    h.pool.paused = true;

    let receipt = h.emergency_exit(&a, at(1)).unwrap();
    assert_eq!(receipt.amount, 100);
    assert_eq!(receipt.forfeited, 50);
    assert_eq!(receipt.shortfall, 0);
    assert_eq!(h.ledger.balance(&a), 100);
    assert_eq!(h.pool.total_staked, 0);

    // forfeited reward is left in custody for the owner to sweep
    let to = Pubkey::new_unique();
    let authority = h.authority;
    let swept = engine::sweep_excess(&h.pool, &mut h.ledger, &authority, &to).unwrap();
    assert_eq!(swept, 50);
    assert_eq!(h.ledger.balance(&to), 50);
}

#[test]
fn test_fee_on_transfer_deposit_changes_nothing() {
    let mut h = Harness::new();
    let a = h.staker();
    h.ledger.transfer_fee_bps = 100;

    assert_eq!(
        h.deposit(&a, 1_000, at(0)).unwrap_err(),
        StakingError::LedgerTransferFailed.into()
    );
    assert_eq!(h.account(&a).balance, 0);
    assert_eq!(h.account(&a).pending_addition, 0);
    assert_eq!(h.pool.total_staked, 0);
    assert_eq!(h.pool.staker_count, 0);
    assert_eq!(h.pool.schedule.slots(), 0);
}

#[test]
fn test_deposit_validation() {
    let mut h = Harness::new();
    let a = h.staker();
    let b = h.staker();

    assert_eq!(
        h.deposit(&a, 0, at(0)).unwrap_err(),
        StakingError::InvalidAmount.into()
    );

    h.ledger.fund(b, 10);
    let account = h.accounts.get_mut(&a).unwrap();
    assert_eq!(
        engine::deposit(&mut h.pool, account, &mut h.ledger, &b, 10, at(0)).unwrap_err(),
        StakingError::Unauthorized.into()
    );

    h.pool.paused = true;
    assert_eq!(
        h.deposit(&a, 10, at(0)).unwrap_err(),
        StakingError::PoolPaused.into()
    );
}

#[test]
fn test_deposit_on_behalf_requires_whitelist() {
    let mut h = Harness::new();
    let a = h.staker();
    let distributor = Pubkey::new_unique();
    h.ledger.fund(distributor, 300);

    let account = h.accounts.get_mut(&a).unwrap();
    assert_eq!(
        engine::deposit_on_behalf(&mut h.pool, account, &mut h.ledger, &distributor, 100, at(0))
            .unwrap_err(),
        StakingError::Unauthorized.into()
    );

    let authority = h.authority;
    engine::set_distributor(&mut h.pool, &authority, distributor, true).unwrap();

    let account = h.accounts.get_mut(&a).unwrap();
    let receipt =
        engine::deposit_on_behalf(&mut h.pool, account, &mut h.ledger, &distributor, 100, at(0))
            .unwrap();
    assert_eq!(receipt.balance, 100);
    assert_eq!(receipt.eligible_epoch, 1);
    assert_eq!(h.ledger.balance(&distributor), 200);
    assert_eq!(h.account(&a).owner, a);

    engine::set_distributor(&mut h.pool, &authority, distributor, false).unwrap();
    let account = h.accounts.get_mut(&a).unwrap();
    assert_eq!(
        engine::deposit_on_behalf(&mut h.pool, account, &mut h.ledger, &distributor, 100, at(0))
            .unwrap_err(),
        StakingError::Unauthorized.into()
    );
}

#[test]
fn test_poke_retires_checkpoints() {
    let mut h = Harness::new();
    let stakers: Vec<Pubkey> = (0..3).map(|_| h.staker()).collect();

    for s in &stakers {
        h.deposit(s, 100, at(0)).unwrap();
    }
    h.roll(at(1));
    assert!(h.pool.schedule.entries.is_empty());
    assert_eq!(h.pool.schedule.checkpoint(1).map(|c| c.joiners), Some(3));

    for s in &stakers {
        h.poke(s, at(1));
    }
    assert_eq!(h.pool.schedule.slots(), 0);
    assert_eq!(h.account(&stakers[0]).eligible_balance, 100);
}
