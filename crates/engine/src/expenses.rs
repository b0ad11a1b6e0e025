//! Expense records.
//!
//! An `Expense` is one financial event: a payer, a dated total, and a split
//! row per participant owing a share of it. Split rows live in their own
//! table (see [`crate::split`]) and are re-attached when loading.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, Split, SplitMode, util::parse_uuid};

pub const DEFAULT_CATEGORY: &str = "uncategorized";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: String,
    pub description: String,
    pub category: String,
    pub amount: MoneyCents,
    pub date: DateTime<Utc>,
    pub payer_id: Uuid,
    pub split_mode: SplitMode,
    pub splits: Vec<Split>,
}

impl Expense {
    pub fn new(
        group_id: String,
        description: String,
        category: Option<String>,
        amount: MoneyCents,
        date: DateTime<Utc>,
        payer_id: Uuid,
        split_mode: SplitMode,
        splits: Vec<Split>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            group_id,
            description,
            category: category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            amount,
            date,
            payer_id,
            split_mode,
            splits,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub description: String,
    pub category: String,
    pub amount_cents: i64,
    pub date: DateTimeUtc,
    pub payer_id: String,
    pub split_mode: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id"
    )]
    Groups,
    #[sea_orm(has_many = "super::split::Entity")]
    Splits,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::split::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            group_id: ActiveValue::Set(expense.group_id.clone()),
            description: ActiveValue::Set(expense.description.clone()),
            category: ActiveValue::Set(expense.category.clone()),
            amount_cents: ActiveValue::Set(expense.amount.cents()),
            date: ActiveValue::Set(expense.date),
            payer_id: ActiveValue::Set(expense.payer_id.to_string()),
            split_mode: ActiveValue::Set(expense.split_mode.as_str().to_string()),
        }
    }
}

impl TryFrom<(Model, Vec<super::split::Model>)> for Expense {
    type Error = EngineError;

    fn try_from(
        (model, split_models): (Model, Vec<super::split::Model>),
    ) -> Result<Self, Self::Error> {
        let splits = split_models
            .into_iter()
            .map(Split::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            group_id: model.group_id,
            description: model.description,
            category: model.category,
            amount: MoneyCents::new(model.amount_cents),
            date: model.date,
            payer_id: parse_uuid(&model.payer_id, "participant")?,
            split_mode: SplitMode::try_from(model.split_mode.as_str())?,
            splits,
        })
    }
}
