//! Net balances and suggested settlements.
//!
//! Balances and settlements are derived data: they are recomputed from the
//! full expense set on every read and never persisted. The computation is a
//! pure fold over its inputs into fresh output, so concurrent callers can
//! share nothing and need no coordination.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{Expense, MoneyCents};

/// One participant's net position over a scope of expenses.
///
/// Positive net = the group owes the participant; negative = the
/// participant owes the group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BalanceEntry {
    pub participant_id: Uuid,
    pub net: MoneyCents,
}

/// A suggested transfer: `from` pays `to` this amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementEntry {
    pub from: Uuid,
    pub to: Uuid,
    pub amount: MoneyCents,
}

/// Balances plus the transfer list that would zero them out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceSheet {
    pub balances: Vec<BalanceEntry>,
    pub settlements: Vec<SettlementEntry>,
}

/// Folds every expense into per-participant nets, then matches debtors to
/// creditors.
///
/// Net accumulation: the payer is credited the full expense amount and each
/// split's participant is debited their share. A payer who also appears in
/// the splits nets out to amount-paid minus own share. Since every expense
/// credits exactly what its splits debit, the nets always sum to zero (up to
/// the one-cent slack the split validation allows).
///
/// Settlement matching walks debtors and creditors with one cursor each, in
/// balance order, transferring `min(debt, credit)` and advancing whichever
/// side reaches zero. That discharges every balance in at most
/// `debtors + creditors - 1` transfers. The transfer count is not globally
/// minimal; a minimal matching is a subset-sum problem and not worth the
/// complexity here.
///
/// The function is total: an expense referencing a participant outside
/// `participant_ids` (an upstream integrity bug) leaves a dangling net with
/// no counterpart and an incomplete settlement list, but never an error.
pub fn compute_balances(expenses: &[Expense], participant_ids: &[Uuid]) -> BalanceSheet {
    let mut nets: HashMap<Uuid, i64> = participant_ids.iter().map(|&id| (id, 0)).collect();

    for expense in expenses {
        *nets.entry(expense.payer_id).or_insert(0) += expense.amount.cents();
        for split in &expense.splits {
            *nets.entry(split.participant_id).or_insert(0) -= split.amount.cents();
        }
    }

    let balances: Vec<BalanceEntry> = participant_ids
        .iter()
        .map(|&participant_id| BalanceEntry {
            participant_id,
            net: MoneyCents::new(nets.get(&participant_id).copied().unwrap_or(0)),
        })
        .collect();

    BalanceSheet {
        settlements: settle(&balances),
        balances,
    }
}

fn settle(balances: &[BalanceEntry]) -> Vec<SettlementEntry> {
    let mut debtors: Vec<(Uuid, i64)> = Vec::new();
    let mut creditors: Vec<(Uuid, i64)> = Vec::new();
    for entry in balances {
        if entry.net.is_negative() {
            debtors.push((entry.participant_id, entry.net.cents()));
        } else if entry.net.is_positive() {
            creditors.push((entry.participant_id, entry.net.cents()));
        }
    }

    let mut settlements = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < debtors.len() && j < creditors.len() {
        let amount = (-debtors[i].1).min(creditors[j].1);
        if amount > 0 {
            settlements.push(SettlementEntry {
                from: debtors[i].0,
                to: creditors[j].0,
                amount: MoneyCents::new(amount),
            });
            debtors[i].1 += amount;
            creditors[j].1 -= amount;
        }
        if debtors[i].1 == 0 {
            i += 1;
        }
        if creditors[j].1 == 0 {
            j += 1;
        }
    }

    settlements
}
