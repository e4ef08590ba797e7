//! Property-based tests for the vault's arithmetic and gating rules.

use proptest::prelude::*;

use bastion_protocol::config::{BLOCKS_PER_YEAR, EMERGENCY_GRACE_BLOCKS, MAX_YIELD_RATE_PERCENT};
use bastion_protocol::host::{HostLedger, NativeTransfer};
use bastion_protocol::types::{AccountId, CallContext};
use bastion_protocol::vault::{accrue, CustodyVault, VaultError, WithdrawalPath};

fn owner() -> AccountId {
    AccountId::from("owner")
}

fn funded(amount: u64) -> (CustodyVault, HostLedger) {
    let vault = CustodyVault::deploy(owner(), "vault".into());
    let mut host = HostLedger::new();
    host.mint(&owner(), amount).unwrap();
    (vault, host)
}

proptest! {
    #[test]
    fn accrue_matches_formula_without_overflow(
        principal in 0u64..1_000_000_000_000,
        blocks in 0u64..10 * BLOCKS_PER_YEAR,
        rate in 0u32..=MAX_YIELD_RATE_PERCENT,
    ) {
        let expected = u128::from(principal) * u128::from(rate) * u128::from(blocks)
            / (u128::from(BLOCKS_PER_YEAR) * 100);
        prop_assert_eq!(u128::from(accrue(principal, blocks, rate)), expected);
    }

    #[test]
    fn accrue_is_monotonic_in_time(
        principal in 0u64..1_000_000_000_000,
        blocks in 0u64..BLOCKS_PER_YEAR,
        extra in 0u64..BLOCKS_PER_YEAR,
        rate in 0u32..=MAX_YIELD_RATE_PERCENT,
    ) {
        prop_assert!(accrue(principal, blocks, rate) <= accrue(principal, blocks + extra, rate));
    }

    #[test]
    fn accrue_is_monotonic_in_principal(
        principal in any::<u64>(),
        extra in any::<u64>(),
        blocks in 0u64..10 * BLOCKS_PER_YEAR,
        rate in 0u32..=MAX_YIELD_RATE_PERCENT,
    ) {
        let larger = principal.saturating_add(extra);
        prop_assert!(accrue(principal, blocks, rate) <= accrue(larger, blocks, rate));
    }

    #[test]
    fn accrue_is_monotonic_in_rate(
        principal in any::<u64>(),
        blocks in any::<u64>(),
        rate in 0u32..=MAX_YIELD_RATE_PERCENT,
        extra in 0u32..=MAX_YIELD_RATE_PERCENT,
    ) {
        let higher = (rate + extra).min(MAX_YIELD_RATE_PERCENT);
        prop_assert!(accrue(principal, blocks, rate) <= accrue(principal, blocks, higher));
    }

    #[test]
    fn zero_rate_never_pays(principal in any::<u64>(), blocks in any::<u64>()) {
        prop_assert_eq!(accrue(principal, blocks, 0), 0);
    }

    #[test]
    fn deposits_accumulate_exactly(amounts in prop::collection::vec(1u64..1_000_000, 1..20)) {
        let total: u64 = amounts.iter().sum();
        let (mut vault, mut host) = funded(total);
        for (i, amount) in amounts.iter().enumerate() {
            vault.deposit(&CallContext::new("owner", i as u64), &mut host, *amount).unwrap();
        }
        prop_assert_eq!(vault.total_balance(), total);
        prop_assert_eq!(host.balance_of(&"vault".into()), total);
        prop_assert_eq!(host.balance_of(&owner()), 0);
    }

    #[test]
    fn withdrawal_gate_truth_table(
        duration in 1u64..10_000,
        threshold in 1u32..4,
        signers in 0usize..4,
        offset in 0u64..20_000,
        caller_is_heir in any::<bool>(),
        past_grace in any::<bool>(),
        amount in 0u64..=2_000,
    ) {
        let (mut vault, mut host) = funded(1_000);
        let ctx = CallContext::new("owner", 0);
        vault.configure(&ctx, duration, threshold, Some("heir".into())).unwrap();
        vault.deposit(&ctx, &mut host, 1_000).unwrap();
        for i in 0..signers {
            let guardian = format!("g{i}");
            vault.add_guardian(&ctx, guardian.clone().into()).unwrap();
            vault.sign(&CallContext::new(guardian, 0)).unwrap();
        }

        let height = if past_grace { duration + EMERGENCY_GRACE_BLOCKS + 1 + offset } else { offset };
        let caller = if caller_is_heir { "heir" } else { "owner" };

        let quorum = height >= duration && signers as u32 >= threshold;
        let emergency = caller_is_heir && height > duration + EMERGENCY_GRACE_BLOCKS;

        let before = vault.clone();
        let result = vault.withdraw(&CallContext::new(caller, height), &mut host, amount);
        match result {
            Ok(receipt) => {
                prop_assert!(amount <= 1_000);
                prop_assert!(quorum || emergency);
                let path = if quorum { WithdrawalPath::GuardianQuorum } else { WithdrawalPath::HeirEmergency };
                prop_assert_eq!(receipt.path, path);
                prop_assert_eq!(receipt.amount, amount);
                prop_assert_eq!(vault.total_balance(), 1_000 - amount);
                prop_assert_eq!(host.balance_of(&owner()), amount);
            }
            Err(err) => {
                if amount > 1_000 {
                    prop_assert_eq!(err, VaultError::InsufficientBalance { requested: amount, available: 1_000 });
                } else {
                    prop_assert!(!quorum && !emergency);
                    prop_assert_eq!(err, VaultError::TimelockActive { height, expiry: duration });
                }
                prop_assert_eq!(vault, before);
                prop_assert_eq!(host.balance_of(&owner()), 0);
            }
        }
    }

    #[test]
    fn stake_round_trip_conserves_principal(
        deposit in 1u64..1_000_000_000,
        share in 1u64..=100,
        hold in 0u64..BLOCKS_PER_YEAR,
        rate in 0u32..=MAX_YIELD_RATE_PERCENT,
    ) {
        let (mut vault, mut host) = funded(deposit);
        let ctx = CallContext::new("owner", 0);
        vault.adjust_yield_rate(&ctx, rate).unwrap();
        vault.deposit(&ctx, &mut host, deposit).unwrap();

        let stake = (deposit * share / 100).max(1);
        vault.initiate_stake(&CallContext::new("staker", 5), stake).unwrap();
        prop_assert_eq!(vault.total_balance() + vault.total_staked(), deposit);

        let payout = vault.complete_stake(&CallContext::new("staker", 5 + hold)).unwrap();
        prop_assert_eq!(payout, stake + accrue(stake, hold, rate));
        prop_assert_eq!(vault.total_balance(), deposit + vault.cumulative_yield());
        prop_assert_eq!(vault.total_staked(), 0);
    }
}
