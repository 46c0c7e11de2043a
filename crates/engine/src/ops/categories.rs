use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, CategoryRollup, CategoryUpdate, EngineError, NewCategoryCmd, ResultEngine,
    Transaction, categories, rollup, transactions,
};

use super::{
    Engine, normalize_optional_text, normalize_required_name, require_budget, require_category,
    with_tx,
};

impl Engine {
    /// Creates a category and returns its id.
    ///
    /// A budget link, when given, must reference a budget of the same owner.
    pub async fn new_category(&self, cmd: NewCategoryCmd) -> ResultEngine<Uuid> {
        let name = normalize_required_name(&cmd.name, "category")?;

        with_tx!(self, |db_tx| {
            if let Some(budget_id) = cmd.budget_id {
                require_budget(&db_tx, cmd.user_id, budget_id).await?;
            }

            let id = Uuid::new_v4();
            let active = categories::ActiveModel {
                id: ActiveValue::Set(id),
                user_id: ActiveValue::Set(cmd.user_id),
                budget_id: ActiveValue::Set(cmd.budget_id),
                name: ActiveValue::Set(name),
                kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
                color: ActiveValue::Set(normalize_optional_text(cmd.color.as_deref())),
                icon: ActiveValue::Set(normalize_optional_text(cmd.icon.as_deref())),
            };
            active.insert(&db_tx).await?;
            Ok(id)
        })
    }

    /// Applies a partial update to a category.
    ///
    /// Changing the kind is rejected while transactions still reference the
    /// category; the stored rows would otherwise stop matching their
    /// category's kind without any write touching them.
    pub async fn update_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        update: CategoryUpdate,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = require_category(&db_tx, user_id, category_id).await?;

            let mut active = <categories::ActiveModel as sea_orm::ActiveModelTrait>::default();

            if let Some(name) = update.name.as_deref() {
                active.name = ActiveValue::Set(normalize_required_name(name, "category")?);
            }
            if let Some(kind) = update.kind
                && kind.as_str() != model.kind
            {
                let referencing = transactions::Entity::find()
                    .filter(transactions::Column::CategoryId.eq(category_id))
                    .count(&db_tx)
                    .await?;
                if referencing > 0 {
                    return Err(EngineError::KindMismatch(format!(
                        "cannot change kind while {referencing} transaction(s) reference this category"
                    )));
                }
                active.kind = ActiveValue::Set(kind.as_str().to_string());
            }
            if let Some(budget_id) = update.budget_id {
                if let Some(budget_id) = budget_id {
                    require_budget(&db_tx, user_id, budget_id).await?;
                }
                active.budget_id = ActiveValue::Set(budget_id);
            }
            if let Some(color) = update.color {
                active.color = ActiveValue::Set(normalize_optional_text(color.as_deref()));
            }
            if let Some(icon) = update.icon {
                active.icon = ActiveValue::Set(normalize_optional_text(icon.as_deref()));
            }

            if active.is_changed() {
                active.id = ActiveValue::Set(model.id);
                active.update(&db_tx).await?;
            }
            Ok(())
        })
    }

    /// Deletes a category.
    ///
    /// Transactions referencing it are left in place; readers that join
    /// through the category (the monthly report) drop them instead of
    /// failing.
    pub async fn delete_category(&self, user_id: Uuid, category_id: Uuid) -> ResultEngine<()> {
        require_category(&self.database, user_id, category_id).await?;
        categories::Entity::delete_by_id(category_id)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Lists a user's categories, by name.
    pub async fn categories(&self, user_id: Uuid) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .order_by_asc(categories::Column::Name)
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?;

        models.into_iter().map(Category::try_from).collect()
    }

    /// Return a [`Category`].
    pub async fn category(&self, user_id: Uuid, category_id: Uuid) -> ResultEngine<Category> {
        let model = require_category(&self.database, user_id, category_id).await?;
        Category::try_from(model)
    }

    /// Computes a category's signed total over all of its transactions.
    ///
    /// Fetches the linked transactions, then delegates to
    /// [`crate::category_total`].
    pub async fn category_rollup(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<CategoryRollup> {
        let model = require_category(&self.database, user_id, category_id).await?;
        let category = Category::try_from(model)?;
        let transactions = self.find_transactions_by_category(category_id).await?;
        let total = rollup::category_total(&category, &transactions);
        Ok(CategoryRollup { category, total })
    }

    /// Loads all transactions referencing a category, in insertion-stable
    /// order.
    pub(super) async fn find_transactions_by_category(
        &self,
        category_id: Uuid,
    ) -> ResultEngine<Vec<Transaction>> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::CategoryId.eq(category_id))
            .order_by_asc(transactions::Column::OccurredAt)
            .order_by_asc(transactions::Column::Id)
            .all(&self.database)
            .await?;

        models.into_iter().map(Transaction::try_from).collect()
    }
}
