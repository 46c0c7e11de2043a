use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    Category, Month, MonthlyReport, ResultEngine, Transaction, categories, report, transactions,
};

use super::Engine;

impl Engine {
    /// Builds the monthly summary for a user.
    ///
    /// `month` is a `YYYY-MM` token; a malformed token is an error, an
    /// absent one means the current calendar month. Transactions are
    /// selected over the month's half-open UTC range and joined to the
    /// user's categories; see [`crate::summarize`] for the grouping rules.
    pub async fn monthly_report(
        &self,
        user_id: Uuid,
        month: Option<&str>,
    ) -> ResultEngine<MonthlyReport> {
        let month = match month {
            Some(token) => Month::parse(token)?,
            None => Month::current(),
        };
        let (start, end) = month.range()?;

        let transactions = self
            .find_transactions_by_user_and_date_range(user_id, start, end)
            .await?;

        let category_models = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?;
        let mut categories_by_id: HashMap<Uuid, Category> =
            HashMap::with_capacity(category_models.len());
        for model in category_models {
            let category = Category::try_from(model)?;
            categories_by_id.insert(category.id, category);
        }

        Ok(report::summarize(month, &transactions, &categories_by_id))
    }

    /// Loads a user's transactions inside `[start, end)`, oldest first with
    /// id as tie-breaker so reports iterate deterministically.
    async fn find_transactions_by_user_and_date_range(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultEngine<Vec<Transaction>> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::OccurredAt.gte(start))
            .filter(transactions::Column::OccurredAt.lt(end))
            .order_by_asc(transactions::Column::OccurredAt)
            .order_by_asc(transactions::Column::Id)
            .all(&self.database)
            .await?;

        models.into_iter().map(Transaction::try_from).collect()
    }
}
