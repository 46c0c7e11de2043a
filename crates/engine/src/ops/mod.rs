use sea_orm::{DatabaseConnection, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, EntryKind, ResultEngine};

mod budgets;
mod categories;
mod reports;
mod transactions;
mod users;

pub use transactions::TransactionListFilter;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Record store plus rollup/report entry points, scoped by owner.
///
/// The database handle is injected at startup through [`EngineBuilder`];
/// there is no process-wide connection state.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Fetch a category by id, scoped to its owner.
///
/// A category owned by another user behaves exactly like a missing one.
async fn require_category<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    category_id: Uuid,
) -> ResultEngine<crate::categories::Model> {
    crate::categories::Entity::find_by_id(category_id)
        .filter(crate::categories::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
}

/// Fetch a budget by id, scoped to its owner.
async fn require_budget<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    budget_id: Uuid,
) -> ResultEngine<crate::budgets::Model> {
    crate::budgets::Entity::find_by_id(budget_id)
        .filter(crate::budgets::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("budget not exists".to_string()))
}

/// Single write-boundary check for the transaction/category kind invariant:
/// the category must exist, belong to the user, and carry the given kind.
async fn require_matching_category<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    category_id: Uuid,
    kind: EntryKind,
) -> ResultEngine<crate::categories::Model> {
    let model = require_category(db, user_id, category_id).await?;
    if model.kind != kind.as_str() {
        return Err(EngineError::KindMismatch(format!(
            "transaction kind must match category kind ({})",
            model.kind
        )));
    }
    Ok(model)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
