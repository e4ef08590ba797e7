//! # Vault Command Dispatch
//!
//! Maps one parsed [`Operation`] onto the matching `CustodyVault` entry
//! point and renders its result as JSON. Nothing here touches storage; the
//! caller commits only when dispatch succeeds.

use bastion_protocol::host::{HostLedger, NativeTransfer};
use bastion_protocol::types::{AccountId, BlockHeight, CallContext};
use bastion_protocol::vault::{CustodyVault, VaultError};
use serde_json::{json, Value};

use crate::cli::Operation;

/// Runs `op` as `ctx.caller` at `ctx.height`.
pub fn dispatch(
    vault: &mut CustodyVault,
    host: &mut HostLedger,
    ctx: &CallContext,
    op: &Operation,
) -> Result<Value, VaultError> {
    let outcome = match op {
        Operation::Configure { duration, threshold, heir } => {
            let expiry = vault.configure(ctx, *duration, *threshold, heir.as_deref().map(AccountId::from))?;
            json!({ "timelock_expiry": expiry, "guardian_threshold": threshold })
        }
        Operation::AddGuardian { guardian } => {
            vault.add_guardian(ctx, AccountId::from(guardian.as_str()))?;
            json!({ "guardian": guardian, "guardians": vault.guardians().count() })
        }
        Operation::RemoveGuardian { guardian } => {
            vault.remove_guardian(ctx, &AccountId::from(guardian.as_str()))?;
            json!({ "guardian": guardian, "guardians": vault.guardians().count() })
        }
        Operation::Deposit { amount } => {
            let balance = vault.deposit(ctx, host, *amount)?;
            json!({ "deposited": amount, "total_balance": balance })
        }
        Operation::Stake { amount } => {
            vault.initiate_stake(ctx, *amount)?;
            json!({ "staked": amount, "total_balance": vault.total_balance() })
        }
        Operation::Harvest => {
            let harvested = vault.harvest(ctx)?;
            json!({ "harvested": harvested, "total_balance": vault.total_balance() })
        }
        Operation::CompleteStake => {
            let returned = vault.complete_stake(ctx)?;
            json!({ "returned": returned, "total_balance": vault.total_balance() })
        }
        Operation::Sign => {
            let count = vault.sign(ctx)?;
            json!({
                "round_id": vault.round_id(),
                "signature_count": count,
                "threshold_met": vault.has_met_threshold(),
            })
        }
        Operation::BeginRound => {
            let round = vault.begin_round(ctx)?;
            json!({ "round_id": round })
        }
        Operation::Withdraw { amount } => {
            let receipt = vault.withdraw(ctx, host, *amount)?;
            json!({ "receipt": receipt, "total_balance": vault.total_balance() })
        }
        Operation::UpdateHeir { heir } => {
            vault.update_heir(ctx, heir.as_deref().map(AccountId::from))?;
            json!({ "heir": heir })
        }
        Operation::TransferOwnership { new_owner } => {
            vault.transfer_ownership(ctx, AccountId::from(new_owner.as_str()))?;
            json!({ "owner": new_owner })
        }
        Operation::SetYieldRate { rate } => {
            vault.adjust_yield_rate(ctx, *rate)?;
            json!({ "yield_rate_percent": rate })
        }
    };
    Ok(outcome)
}

/// Everything one account might want to know about itself.
pub fn account_view(vault: &CustodyVault, host: &HostLedger, account: &AccountId, height: BlockHeight) -> Value {
    json!({
        "account": account,
        "height": height,
        "holdings": host.balance_of(account),
        "is_owner": vault.is_owner(account),
        "is_guardian": vault.is_guardian(account),
        "has_signed": vault.has_signed(account),
        "is_heir": vault.heir() == Some(account),
        "heir_emergency_eligible": vault.is_heir_emergency_eligible(account, height),
        "stake": vault.stake_of(account),
        "pending_yield": vault.pending_yield(account, height),
        "withdrawal_path": vault.withdrawal_path(account, height),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (CustodyVault, HostLedger) {
        let vault = CustodyVault::deploy("owner".into(), "vault".into());
        let mut host = HostLedger::new();
        host.mint(&"owner".into(), 1_000).unwrap();
        (vault, host)
    }

    #[test]
    fn configure_reports_expiry() {
        let (mut vault, mut host) = fixture();
        let op = Operation::Configure { duration: 50, threshold: 1, heir: Some("heir".into()) };
        let out = dispatch(&mut vault, &mut host, &CallContext::new("owner", 10), &op).unwrap();
        assert_eq!(out["timelock_expiry"], 60);
        assert_eq!(vault.heir(), Some(&AccountId::from("heir")));
    }

    #[test]
    fn failures_surface_vault_errors() {
        let (mut vault, mut host) = fixture();
        let err = dispatch(
            &mut vault,
            &mut host,
            &CallContext::new("owner", 1),
            &Operation::Deposit { amount: 0 },
        )
        .unwrap_err();
        assert_eq!(err.code(), 104);
    }

    #[test]
    fn withdraw_renders_receipt() {
        let (mut vault, mut host) = fixture();
        let owner = CallContext::new("owner", 0);
        dispatch(&mut vault, &mut host, &owner, &Operation::Deposit { amount: 300 }).unwrap();
        dispatch(&mut vault, &mut host, &owner, &Operation::Configure { duration: 5, threshold: 1, heir: None }).unwrap();
        dispatch(&mut vault, &mut host, &owner, &Operation::AddGuardian { guardian: "g".into() }).unwrap();
        dispatch(&mut vault, &mut host, &CallContext::new("g", 1), &Operation::Sign).unwrap();

        let out = dispatch(&mut vault, &mut host, &CallContext::new("owner", 5), &Operation::Withdraw { amount: 100 })
            .unwrap();
        assert_eq!(out["receipt"]["path"], "GuardianQuorum");
        assert_eq!(out["receipt"]["recipient"], "owner");
        assert_eq!(out["total_balance"], 200);
    }

    #[test]
    fn account_view_reports_holdings_and_roles() {
        let (vault, host) = fixture();
        let view = account_view(&vault, &host, &"owner".into(), 0);
        assert_eq!(view["holdings"], 1_000);
        assert_eq!(view["is_owner"], true);
        assert_eq!(view["stake"], Value::Null);
        assert_eq!(view["pending_yield"], 0);
    }
}
