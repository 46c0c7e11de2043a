use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, EntryKind, NewTransactionCmd, ResultEngine, Transaction, TransactionUpdate,
    transactions,
};

use super::{Engine, normalize_optional_text, require_matching_category, with_tx};

/// Filters for listing transactions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub kind: Option<EntryKind>,
    pub category_id: Option<Uuid>,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::InvalidAmount(
            "invalid range: from must be < to".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Records a transaction and returns its id.
    ///
    /// The amount must be strictly positive, and the referenced category
    /// must exist, belong to the user, and carry the same kind.
    pub async fn new_transaction(&self, cmd: NewTransactionCmd) -> ResultEngine<Uuid> {
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            require_matching_category(&db_tx, cmd.user_id, cmd.category_id, cmd.kind).await?;

            let id = Uuid::new_v4();
            let active = transactions::ActiveModel {
                id: ActiveValue::Set(id),
                user_id: ActiveValue::Set(cmd.user_id),
                category_id: ActiveValue::Set(cmd.category_id),
                amount_minor: ActiveValue::Set(cmd.amount.cents()),
                kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
                occurred_at: ActiveValue::Set(cmd.occurred_at),
                note: ActiveValue::Set(normalize_optional_text(cmd.note.as_deref())),
                account: ActiveValue::Set(normalize_optional_text(cmd.account.as_deref())),
            };
            active.insert(&db_tx).await?;
            Ok(id)
        })
    }

    /// Applies a partial update to a transaction.
    ///
    /// When the category or the kind changes, the kind invariant is
    /// re-checked against the effective pair.
    pub async fn update_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
        update: TransactionUpdate,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(transaction_id)
                .filter(transactions::Column::UserId.eq(user_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;

            if update.category_id.is_some() || update.kind.is_some() {
                let category_id = update.category_id.unwrap_or(model.category_id);
                let kind = match update.kind {
                    Some(kind) => kind,
                    None => EntryKind::try_from(model.kind.as_str())?,
                };
                require_matching_category(&db_tx, user_id, category_id, kind).await?;
            }

            let mut active = <transactions::ActiveModel as sea_orm::ActiveModelTrait>::default();
            if let Some(category_id) = update.category_id {
                active.category_id = ActiveValue::Set(category_id);
            }
            if let Some(kind) = update.kind {
                active.kind = ActiveValue::Set(kind.as_str().to_string());
            }
            if let Some(amount) = update.amount {
                if !amount.is_positive() {
                    return Err(EngineError::InvalidAmount(
                        "amount must be > 0".to_string(),
                    ));
                }
                active.amount_minor = ActiveValue::Set(amount.cents());
            }
            if let Some(occurred_at) = update.occurred_at {
                active.occurred_at = ActiveValue::Set(occurred_at);
            }
            if let Some(note) = update.note {
                active.note = ActiveValue::Set(normalize_optional_text(note.as_deref()));
            }
            if let Some(account) = update.account {
                active.account = ActiveValue::Set(normalize_optional_text(account.as_deref()));
            }

            if active.is_changed() {
                active.id = ActiveValue::Set(model.id);
                active.update(&db_tx).await?;
            }
            Ok(())
        })
    }

    /// Deletes a transaction.
    pub async fn delete_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<()> {
        transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;

        transactions::Entity::delete_by_id(transaction_id)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Lists a user's transactions, newest first.
    pub async fn transactions(
        &self,
        user_id: Uuid,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        validate_list_filter(filter)?;

        let mut query = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::OccurredAt)
            .order_by_desc(transactions::Column::Id);

        if let Some(from) = filter.from {
            query = query.filter(transactions::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(transactions::Column::OccurredAt.lt(to));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(transactions::Column::CategoryId.eq(category_id));
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(Transaction::try_from).collect()
    }

    /// Return a [`Transaction`].
    pub async fn transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        let model = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;

        Transaction::try_from(model)
    }
}
