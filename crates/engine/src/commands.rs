//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists. Update structs leave `None`
//! fields untouched; double-`Option` fields distinguish "leave as is" from
//! "clear".

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{EntryKind, MoneyCents};

/// Create a category.
#[derive(Clone, Debug)]
pub struct NewCategoryCmd {
    pub user_id: Uuid,
    pub name: String,
    pub kind: EntryKind,
    pub budget_id: Option<Uuid>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl NewCategoryCmd {
    #[must_use]
    pub fn new(user_id: Uuid, name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            user_id,
            name: name.into(),
            kind,
            budget_id: None,
            color: None,
            icon: None,
        }
    }

    #[must_use]
    pub fn budget_id(mut self, budget_id: Uuid) -> Self {
        self.budget_id = Some(budget_id);
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Partial update of a category.
#[derive(Clone, Debug, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub kind: Option<EntryKind>,
    /// `Some(None)` clears the budget link.
    pub budget_id: Option<Option<Uuid>>,
    pub color: Option<Option<String>>,
    pub icon: Option<Option<String>>,
}

impl CategoryUpdate {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn budget_id(mut self, budget_id: Option<Uuid>) -> Self {
        self.budget_id = Some(budget_id);
        self
    }

    #[must_use]
    pub fn color(mut self, color: Option<String>) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: Option<String>) -> Self {
        self.icon = Some(icon);
        self
    }
}

/// Create a budget.
#[derive(Clone, Debug)]
pub struct NewBudgetCmd {
    pub user_id: Uuid,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub limit: MoneyCents,
}

impl NewBudgetCmd {
    #[must_use]
    pub fn new(
        user_id: Uuid,
        name: impl Into<String>,
        starts_at: DateTime<Utc>,
        limit: MoneyCents,
    ) -> Self {
        Self {
            user_id,
            name: name.into(),
            starts_at,
            ends_at: None,
            limit,
        }
    }

    #[must_use]
    pub fn ends_at(mut self, ends_at: DateTime<Utc>) -> Self {
        self.ends_at = Some(ends_at);
        self
    }
}

/// Partial update of a budget.
#[derive(Clone, Debug, Default)]
pub struct BudgetUpdate {
    pub name: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    /// `Some(None)` clears the end date.
    pub ends_at: Option<Option<DateTime<Utc>>>,
    pub limit: Option<MoneyCents>,
}

impl BudgetUpdate {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn starts_at(mut self, starts_at: DateTime<Utc>) -> Self {
        self.starts_at = Some(starts_at);
        self
    }

    #[must_use]
    pub fn ends_at(mut self, ends_at: Option<DateTime<Utc>>) -> Self {
        self.ends_at = Some(ends_at);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: MoneyCents) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Create a transaction.
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount: MoneyCents,
    pub kind: EntryKind,
    pub occurred_at: DateTime<Utc>,
    pub note: Option<String>,
    pub account: Option<String>,
}

impl NewTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: Uuid,
        category_id: Uuid,
        amount: MoneyCents,
        kind: EntryKind,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            category_id,
            amount,
            kind,
            occurred_at,
            note: None,
            account: None,
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }
}

/// Partial update of a transaction.
#[derive(Clone, Debug, Default)]
pub struct TransactionUpdate {
    pub category_id: Option<Uuid>,
    pub amount: Option<MoneyCents>,
    pub kind: Option<EntryKind>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub note: Option<Option<String>>,
    pub account: Option<Option<String>>,
}

impl TransactionUpdate {
    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: MoneyCents) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    #[must_use]
    pub fn note(mut self, note: Option<String>) -> Self {
        self.note = Some(note);
        self
    }

    #[must_use]
    pub fn account(mut self, account: Option<String>) -> Self {
        self.account = Some(account);
        self
    }
}
