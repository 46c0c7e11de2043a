//! Monthly report builder.
//!
//! Groups a month's transactions by category and splits the totals into
//! income and expenses. The builder is pure: the caller supplies the
//! transactions already restricted to the month's half-open range plus a
//! category lookup table (see `ops::reports` for the query side).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Category, EntryKind, MoneyCents, Month, Transaction};

/// Per-category slice of a monthly report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub total: MoneyCents,
}

/// Summary of one calendar month's activity for a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub month: String,
    pub total_income: MoneyCents,
    pub total_expenses: MoneyCents,
    pub categories: Vec<CategoryBreakdown>,
}

/// Builds the monthly summary from already-fetched data.
///
/// Each transaction is joined to its category through `categories`; a
/// transaction whose category no longer exists cannot be grouped and is
/// dropped (not an error). Per-group `total` is the plain sum of amounts;
/// the income/expense split comes from the category kind. Groups keep the
/// first-seen order of the input, so the output is stable for a given input.
#[must_use]
pub fn summarize(
    month: Month,
    transactions: &[Transaction],
    categories: &HashMap<Uuid, Category>,
) -> MonthlyReport {
    let mut order: Vec<Uuid> = Vec::new();
    let mut groups: HashMap<Uuid, CategoryBreakdown> = HashMap::new();

    for tx in transactions {
        let Some(category) = categories.get(&tx.category_id) else {
            continue;
        };
        let group = groups.entry(category.id).or_insert_with(|| {
            order.push(category.id);
            CategoryBreakdown {
                category: category.name.clone(),
                kind: category.kind,
                total: MoneyCents::ZERO,
            }
        });
        group.total += tx.amount;
    }

    let mut total_income = MoneyCents::ZERO;
    let mut total_expenses = MoneyCents::ZERO;
    let categories: Vec<CategoryBreakdown> = order
        .into_iter()
        .filter_map(|id| groups.remove(&id))
        .collect();
    for group in &categories {
        match group.kind {
            EntryKind::Income => total_income += group.total,
            EntryKind::Expense => total_expenses += group.total,
        }
    }

    MonthlyReport {
        month: month.to_string(),
        total_income,
        total_expenses,
        categories,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn category(name: &str, kind: EntryKind) -> Category {
        Category {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            budget_id: None,
            name: name.to_string(),
            kind,
            color: None,
            icon: None,
        }
    }

    fn transaction(category: &Category, cents: i64) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: category.user_id,
            category_id: category.id,
            amount: MoneyCents::new(cents),
            kind: category.kind,
            occurred_at: Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap(),
            note: None,
            account: None,
        }
    }

    #[test]
    fn empty_month_yields_empty_report() {
        let month = Month::new(2025, 2).unwrap();
        let report = summarize(month, &[], &HashMap::new());
        assert_eq!(report.month, "2025-02");
        assert_eq!(report.total_income, MoneyCents::ZERO);
        assert_eq!(report.total_expenses, MoneyCents::ZERO);
        assert!(report.categories.is_empty());
    }

    #[test]
    fn groups_by_category_and_splits_totals() {
        let food = category("Food", EntryKind::Expense);
        let salary = category("Salary", EntryKind::Income);
        let txs = vec![
            transaction(&food, 70_00),
            transaction(&salary, 2000_00),
            transaction(&food, 50_00),
        ];
        let categories = HashMap::from([(food.id, food.clone()), (salary.id, salary.clone())]);

        let report = summarize(Month::new(2025, 1).unwrap(), &txs, &categories);

        assert_eq!(report.total_income, MoneyCents::new(2000_00));
        assert_eq!(report.total_expenses, MoneyCents::new(120_00));
        assert_eq!(report.categories.len(), 2);
        assert_eq!(
            report.categories[0],
            CategoryBreakdown {
                category: "Food".to_string(),
                kind: EntryKind::Expense,
                total: MoneyCents::new(120_00),
            }
        );
        assert_eq!(
            report.categories[1],
            CategoryBreakdown {
                category: "Salary".to_string(),
                kind: EntryKind::Income,
                total: MoneyCents::new(2000_00),
            }
        );
    }

    #[test]
    fn transaction_without_category_is_dropped() {
        let food = category("Food", EntryKind::Expense);
        let orphaned = category("Gone", EntryKind::Expense);
        let txs = vec![transaction(&food, 10_00), transaction(&orphaned, 99_00)];
        let categories = HashMap::from([(food.id, food.clone())]);

        let report = summarize(Month::new(2025, 1).unwrap(), &txs, &categories);

        assert_eq!(report.categories.len(), 1);
        assert_eq!(report.total_expenses, MoneyCents::new(10_00));
    }

    #[test]
    fn summarize_is_idempotent() {
        let food = category("Food", EntryKind::Expense);
        let txs = vec![transaction(&food, 10_00), transaction(&food, 5_50)];
        let categories = HashMap::from([(food.id, food.clone())]);
        let month = Month::new(2025, 1).unwrap();

        let first = summarize(month, &txs, &categories);
        let second = summarize(month, &txs, &categories);
        assert_eq!(first, second);
    }

    #[test]
    fn report_serializes_with_original_field_names() {
        let food = category("Food", EntryKind::Expense);
        let txs = vec![transaction(&food, 120_00)];
        let categories = HashMap::from([(food.id, food.clone())]);

        let report = summarize(Month::new(2025, 1).unwrap(), &txs, &categories);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["month"], "2025-01");
        assert_eq!(json["total_expenses"], 12000);
        assert_eq!(json["total_income"], 0);
        assert_eq!(json["categories"][0]["category"], "Food");
        assert_eq!(json["categories"][0]["type"], "expense");
        assert_eq!(json["categories"][0]["total"], 12000);
    }
}
