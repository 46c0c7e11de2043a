//! Rollup calculator.
//!
//! Derived totals are pure functions over an entity plus its already-fetched
//! related records. The calculator never queries storage itself, so "no
//! linked records" and "records not loaded" cannot be confused: assembling
//! the input set is an explicit caller step (the `ops` query layer is the
//! only place in this crate that does it).

use serde::{Deserialize, Serialize};

use crate::{Budget, Category, EntryKind, MoneyCents, Transaction};

/// A category together with its computed signed total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRollup {
    pub category: Category,
    pub total: MoneyCents,
}

/// A budget together with its computed total and per-category breakdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRollup {
    pub budget: Budget,
    pub total: MoneyCents,
    pub categories: Vec<CategoryRollup>,
}

/// Signed net total of a category over the given transactions.
///
/// Expense transactions subtract their amount, income transactions add it.
/// An empty set yields zero. The fold is left-to-right over the input order,
/// so the result is reproducible for a given input (the sum itself is
/// order-independent).
#[must_use]
pub fn category_total(category: &Category, transactions: &[Transaction]) -> MoneyCents {
    debug_assert!(
        transactions
            .iter()
            .all(|tx| tx.category_id == category.id),
        "transactions must belong to the rolled-up category"
    );

    transactions
        .iter()
        .fold(MoneyCents::ZERO, |acc, tx| match tx.kind {
            EntryKind::Expense => acc - tx.amount,
            EntryKind::Income => acc + tx.amount,
        })
}

/// Total value flowing through a budget: its own `spent` accumulator plus the
/// signed totals of the linked categories.
///
/// This is a direct sum, not net-of-limit; callers derive remaining budget as
/// `limit - total` themselves. A budget with no linked categories totals
/// exactly `spent`.
#[must_use]
pub fn budget_total(budget: &Budget, categories: &[CategoryRollup]) -> MoneyCents {
    categories
        .iter()
        .fold(budget.spent, |acc, rollup| acc + rollup.total)
}
