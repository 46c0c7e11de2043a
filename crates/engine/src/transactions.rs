//! Transaction primitives.
//!
//! A `Transaction` records a single financial event (expense or income) for a
//! user, tied to a category. The transaction's `kind` must equal its
//! category's kind at creation/update time; the check is enforced once, at
//! the write boundary (see `ops`).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, EntryKind, MoneyCents};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount: MoneyCents,
    pub kind: EntryKind,
    pub occurred_at: DateTime<Utc>,
    pub note: Option<String>,
    pub account: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount_minor: i64,
    pub kind: String,
    pub occurred_at: DateTimeUtc,
    pub note: Option<String>,
    pub account: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id),
            user_id: ActiveValue::Set(tx.user_id),
            category_id: ActiveValue::Set(tx.category_id),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            note: ActiveValue::Set(tx.note.clone()),
            account: ActiveValue::Set(tx.account.clone()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            category_id: model.category_id,
            amount: MoneyCents::new(model.amount_minor),
            kind: EntryKind::try_from(model.kind.as_str())?,
            occurred_at: model.occurred_at,
            note: model.note,
            account: model.account,
        })
    }
}
