//! Personal-finance engine: owner-scoped record storage plus the rollup and
//! monthly-report computations built on top of it.
//!
//! The derived totals (category net total, budget total) are pure functions
//! in [`rollup`]; the monthly grouping lives in [`report`]. [`Engine`] wires
//! both to the database: it fetches the related records and hands them to
//! the pure layer, so every total is recomputed from the current snapshot.

pub use budgets::Budget;
pub use categories::Category;
pub use commands::{
    BudgetUpdate, CategoryUpdate, NewBudgetCmd, NewCategoryCmd, NewTransactionCmd,
    TransactionUpdate,
};
pub use error::EngineError;
pub use kinds::EntryKind;
pub use money::MoneyCents;
pub use month::Month;
pub use ops::{Engine, EngineBuilder, TransactionListFilter};
pub use report::{CategoryBreakdown, MonthlyReport, summarize};
pub use rollup::{BudgetRollup, CategoryRollup, budget_total, category_total};
pub use transactions::Transaction;
pub use users::User;

mod budgets;
mod categories;
mod commands;
mod error;
mod kinds;
mod money;
mod month;
mod ops;
mod report;
mod rollup;
mod transactions;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
