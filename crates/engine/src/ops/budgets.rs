use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Budget, BudgetRollup, BudgetUpdate, Category, CategoryRollup, EngineError, MoneyCents,
    NewBudgetCmd, ResultEngine, budgets, categories, rollup,
};

use super::{Engine, normalize_required_name, require_budget, with_tx};

impl Engine {
    /// Creates a budget and returns its id.
    pub async fn new_budget(&self, cmd: NewBudgetCmd) -> ResultEngine<Uuid> {
        let name = normalize_required_name(&cmd.name, "budget")?;
        validate_limit(cmd.limit)?;
        if let Some(ends_at) = cmd.ends_at
            && cmd.starts_at >= ends_at
        {
            return Err(EngineError::InvalidAmount(
                "invalid budget period: starts_at must be < ends_at".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let active = budgets::ActiveModel {
            id: ActiveValue::Set(id),
            user_id: ActiveValue::Set(cmd.user_id),
            name: ActiveValue::Set(name),
            starts_at: ActiveValue::Set(cmd.starts_at),
            ends_at: ActiveValue::Set(cmd.ends_at),
            limit_minor: ActiveValue::Set(cmd.limit.cents()),
            spent_minor: ActiveValue::Set(0),
        };
        active.insert(&self.database).await?;
        Ok(id)
    }

    /// Applies a partial update to a budget.
    pub async fn update_budget(
        &self,
        user_id: Uuid,
        budget_id: Uuid,
        update: BudgetUpdate,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = require_budget(&db_tx, user_id, budget_id).await?;

            let starts_at = update.starts_at.unwrap_or(model.starts_at);
            let ends_at = update.ends_at.unwrap_or(model.ends_at);
            if let Some(ends_at) = ends_at
                && starts_at >= ends_at
            {
                return Err(EngineError::InvalidAmount(
                    "invalid budget period: starts_at must be < ends_at".to_string(),
                ));
            }

            let mut active = <budgets::ActiveModel as sea_orm::ActiveModelTrait>::default();
            if let Some(name) = update.name.as_deref() {
                active.name = ActiveValue::Set(normalize_required_name(name, "budget")?);
            }
            if update.starts_at.is_some() {
                active.starts_at = ActiveValue::Set(starts_at);
            }
            if update.ends_at.is_some() {
                active.ends_at = ActiveValue::Set(ends_at);
            }
            if let Some(limit) = update.limit {
                validate_limit(limit)?;
                active.limit_minor = ActiveValue::Set(limit.cents());
            }

            if active.is_changed() {
                active.id = ActiveValue::Set(model.id);
                active.update(&db_tx).await?;
            }
            Ok(())
        })
    }

    /// Deletes a budget, unlinking its categories first.
    ///
    /// The categories themselves survive; only their budget link is cleared.
    pub async fn delete_budget(&self, user_id: Uuid, budget_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_budget(&db_tx, user_id, budget_id).await?;

            categories::Entity::update_many()
                .col_expr(categories::Column::BudgetId, Expr::value(None::<Uuid>))
                .filter(categories::Column::BudgetId.eq(budget_id))
                .exec(&db_tx)
                .await?;

            budgets::Entity::delete_by_id(budget_id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Lists a user's budgets, by start date.
    pub async fn budgets(&self, user_id: Uuid) -> ResultEngine<Vec<Budget>> {
        let models = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .order_by_asc(budgets::Column::StartsAt)
            .order_by_asc(budgets::Column::Id)
            .all(&self.database)
            .await?;

        Ok(models.into_iter().map(Budget::from).collect())
    }

    /// Return a [`Budget`].
    pub async fn budget(&self, user_id: Uuid, budget_id: Uuid) -> ResultEngine<Budget> {
        let model = require_budget(&self.database, user_id, budget_id).await?;
        Ok(Budget::from(model))
    }

    /// Adds to a budget's independently tracked `spent` accumulator and
    /// returns the new value.
    ///
    /// Negative deltas are allowed for corrections, but the accumulator
    /// never drops below zero.
    pub async fn record_spent(
        &self,
        user_id: Uuid,
        budget_id: Uuid,
        delta: MoneyCents,
    ) -> ResultEngine<MoneyCents> {
        with_tx!(self, |db_tx| {
            let model = require_budget(&db_tx, user_id, budget_id).await?;

            let spent = MoneyCents::new(model.spent_minor) + delta;
            if spent.is_negative() {
                return Err(EngineError::InvalidAmount(
                    "spent must stay >= 0".to_string(),
                ));
            }

            let active = budgets::ActiveModel {
                id: ActiveValue::Set(model.id),
                spent_minor: ActiveValue::Set(spent.cents()),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(spent)
        })
    }

    /// Computes a budget's total: `spent` plus the signed totals of the
    /// linked categories, each rolled up over its own transactions.
    pub async fn budget_rollup(&self, user_id: Uuid, budget_id: Uuid) -> ResultEngine<BudgetRollup> {
        let model = require_budget(&self.database, user_id, budget_id).await?;
        let budget = Budget::from(model);

        let category_models = categories::Entity::find()
            .filter(categories::Column::BudgetId.eq(budget_id))
            .order_by_asc(categories::Column::Name)
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?;

        let mut rollups = Vec::with_capacity(category_models.len());
        for model in category_models {
            let category = Category::try_from(model)?;
            let transactions = self.find_transactions_by_category(category.id).await?;
            let total = rollup::category_total(&category, &transactions);
            rollups.push(CategoryRollup { category, total });
        }

        let total = rollup::budget_total(&budget, &rollups);
        Ok(BudgetRollup {
            budget,
            total,
            categories: rollups,
        })
    }
}

fn validate_limit(limit: MoneyCents) -> ResultEngine<()> {
    if limit.is_negative() {
        return Err(EngineError::InvalidAmount(
            "limit must be >= 0".to_string(),
        ));
    }
    Ok(())
}
