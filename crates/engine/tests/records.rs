use chrono::{DateTime, TimeZone, Utc};
use sea_orm::Database;
use uuid::Uuid;

use engine::{
    BudgetUpdate, CategoryUpdate, Engine, EngineError, EntryKind, MoneyCents, NewBudgetCmd,
    NewCategoryCmd, NewTransactionCmd, TransactionListFilter, TransactionUpdate,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, Uuid) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let user_id = engine.new_user("alice@example.com", "Alice").await.unwrap();
    (engine, user_id)
}

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (engine, _user_id) = engine_with_db().await;

    let err = engine
        .new_user("alice@example.com", "Other Alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn transaction_kind_must_match_category_kind() {
    let (engine, user_id) = engine_with_db().await;

    let food = engine
        .new_category(NewCategoryCmd::new(user_id, "Food", EntryKind::Expense))
        .await
        .unwrap();

    let err = engine
        .new_transaction(NewTransactionCmd::new(
            user_id,
            food,
            MoneyCents::new(10_00),
            EntryKind::Income,
            at(2025, 1, 5),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KindMismatch(_)));
}

#[tokio::test]
async fn transaction_amount_must_be_positive() {
    let (engine, user_id) = engine_with_db().await;

    let food = engine
        .new_category(NewCategoryCmd::new(user_id, "Food", EntryKind::Expense))
        .await
        .unwrap();

    for cents in [0, -5_00] {
        let err = engine
            .new_transaction(NewTransactionCmd::new(
                user_id,
                food,
                MoneyCents::new(cents),
                EntryKind::Expense,
                at(2025, 1, 5),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }
}

#[tokio::test]
async fn update_revalidates_category_kind() {
    let (engine, user_id) = engine_with_db().await;

    let food = engine
        .new_category(NewCategoryCmd::new(user_id, "Food", EntryKind::Expense))
        .await
        .unwrap();
    let salary = engine
        .new_category(NewCategoryCmd::new(user_id, "Salary", EntryKind::Income))
        .await
        .unwrap();
    let tx = engine
        .new_transaction(NewTransactionCmd::new(
            user_id,
            food,
            MoneyCents::new(10_00),
            EntryKind::Expense,
            at(2025, 1, 5),
        ))
        .await
        .unwrap();

    // Moving the expense onto an income category without changing the kind
    // would desynchronize the pair.
    let err = engine
        .update_transaction(user_id, tx, TransactionUpdate::default().category_id(salary))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KindMismatch(_)));

    // Changing both together is consistent.
    engine
        .update_transaction(
            user_id,
            tx,
            TransactionUpdate::default()
                .category_id(salary)
                .kind(EntryKind::Income),
        )
        .await
        .unwrap();

    let updated = engine.transaction(user_id, tx).await.unwrap();
    assert_eq!(updated.category_id, salary);
    assert_eq!(updated.kind, EntryKind::Income);
}

#[tokio::test]
async fn records_are_owner_scoped() {
    let (engine, alice) = engine_with_db().await;
    let bob = engine.new_user("bob@example.com", "Bob").await.unwrap();

    let food = engine
        .new_category(NewCategoryCmd::new(alice, "Food", EntryKind::Expense))
        .await
        .unwrap();
    let tx = engine
        .new_transaction(NewTransactionCmd::new(
            alice,
            food,
            MoneyCents::new(10_00),
            EntryKind::Expense,
            at(2025, 1, 5),
        ))
        .await
        .unwrap();

    // Another user's records behave as missing.
    assert!(matches!(
        engine.category(bob, food).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine.transaction(bob, tx).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine.delete_transaction(bob, tx).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));

    // A transaction cannot be booked on a foreign category either.
    let err = engine
        .new_transaction(NewTransactionCmd::new(
            bob,
            food,
            MoneyCents::new(10_00),
            EntryKind::Expense,
            at(2025, 1, 5),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn deleting_a_category_keeps_its_transactions() {
    let (engine, user_id) = engine_with_db().await;

    let food = engine
        .new_category(NewCategoryCmd::new(user_id, "Food", EntryKind::Expense))
        .await
        .unwrap();
    let tx = engine
        .new_transaction(NewTransactionCmd::new(
            user_id,
            food,
            MoneyCents::new(10_00),
            EntryKind::Expense,
            at(2025, 1, 5),
        ))
        .await
        .unwrap();

    engine.delete_category(user_id, food).await.unwrap();

    let orphan = engine.transaction(user_id, tx).await.unwrap();
    assert_eq!(orphan.category_id, food);
}

#[tokio::test]
async fn category_kind_is_frozen_while_referenced() {
    let (engine, user_id) = engine_with_db().await;

    let food = engine
        .new_category(NewCategoryCmd::new(user_id, "Food", EntryKind::Expense))
        .await
        .unwrap();
    let tx = engine
        .new_transaction(NewTransactionCmd::new(
            user_id,
            food,
            MoneyCents::new(10_00),
            EntryKind::Expense,
            at(2025, 1, 5),
        ))
        .await
        .unwrap();

    let err = engine
        .update_category(user_id, food, CategoryUpdate::default().kind(EntryKind::Income))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KindMismatch(_)));

    engine.delete_transaction(user_id, tx).await.unwrap();
    engine
        .update_category(user_id, food, CategoryUpdate::default().kind(EntryKind::Income))
        .await
        .unwrap();

    let category = engine.category(user_id, food).await.unwrap();
    assert_eq!(category.kind, EntryKind::Income);
}

#[tokio::test]
async fn transaction_list_filters_by_half_open_range_and_kind() {
    let (engine, user_id) = engine_with_db().await;

    let food = engine
        .new_category(NewCategoryCmd::new(user_id, "Food", EntryKind::Expense))
        .await
        .unwrap();
    let salary = engine
        .new_category(NewCategoryCmd::new(user_id, "Salary", EntryKind::Income))
        .await
        .unwrap();

    for day in [1, 15] {
        engine
            .new_transaction(NewTransactionCmd::new(
                user_id,
                food,
                MoneyCents::new(10_00),
                EntryKind::Expense,
                at(2025, 1, day),
            ))
            .await
            .unwrap();
    }
    engine
        .new_transaction(NewTransactionCmd::new(
            user_id,
            salary,
            MoneyCents::new(2000_00),
            EntryKind::Income,
            at(2025, 1, 25),
        ))
        .await
        .unwrap();

    let filter = TransactionListFilter {
        from: Some(at(2025, 1, 15)),
        to: Some(at(2025, 1, 25)),
        ..Default::default()
    };
    let in_range = engine.transactions(user_id, &filter).await.unwrap();
    // `from` is inclusive, `to` is exclusive.
    assert_eq!(in_range.len(), 1);
    assert_eq!(in_range[0].amount, MoneyCents::new(10_00));

    let filter = TransactionListFilter {
        kind: Some(EntryKind::Income),
        ..Default::default()
    };
    let income = engine.transactions(user_id, &filter).await.unwrap();
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].category_id, salary);

    let filter = TransactionListFilter {
        category_id: Some(food),
        ..Default::default()
    };
    let food_txs = engine.transactions(user_id, &filter).await.unwrap();
    assert_eq!(food_txs.len(), 2);
    // Newest first.
    assert!(food_txs[0].occurred_at > food_txs[1].occurred_at);

    let filter = TransactionListFilter {
        from: Some(at(2025, 1, 25)),
        to: Some(at(2025, 1, 15)),
        ..Default::default()
    };
    let err = engine.transactions(user_id, &filter).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn budget_validation_and_spent_accumulator() {
    let (engine, user_id) = engine_with_db().await;

    // Inverted period is rejected.
    let err = engine
        .new_budget(
            NewBudgetCmd::new(
                user_id,
                "Backwards",
                at(2025, 2, 1),
                MoneyCents::new(100_00),
            )
            .ends_at(at(2025, 1, 1)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let budget = engine
        .new_budget(NewBudgetCmd::new(
            user_id,
            "Monthly",
            at(2025, 1, 1),
            MoneyCents::new(100_00),
        ))
        .await
        .unwrap();

    let spent = engine
        .record_spent(user_id, budget, MoneyCents::new(30_00))
        .await
        .unwrap();
    assert_eq!(spent, MoneyCents::new(30_00));

    // Corrections may subtract, but the accumulator stays non-negative.
    let spent = engine
        .record_spent(user_id, budget, MoneyCents::new(-10_00))
        .await
        .unwrap();
    assert_eq!(spent, MoneyCents::new(20_00));

    let err = engine
        .record_spent(user_id, budget, MoneyCents::new(-50_00))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .update_budget(
            user_id,
            budget,
            BudgetUpdate::default().limit(MoneyCents::new(-1)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn deleting_a_budget_unlinks_its_categories() {
    let (engine, user_id) = engine_with_db().await;

    let budget = engine
        .new_budget(NewBudgetCmd::new(
            user_id,
            "Household",
            at(2025, 1, 1),
            MoneyCents::new(500_00),
        ))
        .await
        .unwrap();
    let food = engine
        .new_category(
            NewCategoryCmd::new(user_id, "Food", EntryKind::Expense).budget_id(budget),
        )
        .await
        .unwrap();

    engine.delete_budget(user_id, budget).await.unwrap();

    assert!(matches!(
        engine.budget(user_id, budget).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    let category = engine.category(user_id, food).await.unwrap();
    assert_eq!(category.budget_id, None);
}

#[tokio::test]
async fn category_budget_link_must_reference_own_budget() {
    let (engine, alice) = engine_with_db().await;
    let bob = engine.new_user("bob@example.com", "Bob").await.unwrap();

    let bobs_budget = engine
        .new_budget(NewBudgetCmd::new(
            bob,
            "Bob's",
            at(2025, 1, 1),
            MoneyCents::new(100_00),
        ))
        .await
        .unwrap();

    let err = engine
        .new_category(
            NewCategoryCmd::new(alice, "Food", EntryKind::Expense).budget_id(bobs_budget),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn update_trims_and_rejects_empty_names() {
    let (engine, user_id) = engine_with_db().await;

    let food = engine
        .new_category(NewCategoryCmd::new(user_id, "  Food  ", EntryKind::Expense))
        .await
        .unwrap();
    let category = engine.category(user_id, food).await.unwrap();
    assert_eq!(category.name, "Food");

    let err = engine
        .update_category(user_id, food, CategoryUpdate::default().name("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));
}
