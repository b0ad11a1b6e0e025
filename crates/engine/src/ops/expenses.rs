use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Expense, MoneyCents, ResultEngine, ShareValue, SplitMode, expenses, split,
};

use super::{Engine, with_tx};

/// Payload for creating or replacing an expense. `amount` and the share
/// values arrive as decimal numbers and are rounded to cents on entry.
#[derive(Clone, Debug)]
pub struct NewExpense {
    pub description: String,
    pub category: Option<String>,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub payer_id: Uuid,
    pub split_mode: SplitMode,
    pub shares: Vec<ShareValue>,
}

/// Optional filters for expense listing. All filters are conjunctive.
#[derive(Clone, Debug, Default)]
pub struct ExpenseListFilter {
    /// Case-insensitive substring match on the description.
    pub description: Option<String>,
    /// Keep expenses the participant paid or shares in.
    pub participant_id: Option<Uuid>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Engine {
    /// Records an expense in a group.
    ///
    /// Splits are built from the request: equal mode divides over the group
    /// roster in insertion order, custom and percentage modes use the given
    /// share values. The rounded split sum must match the amount within one
    /// cent.
    pub async fn add_expense(
        &self,
        group_id: &str,
        username: &str,
        new: NewExpense,
    ) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id, username).await?;
            let expense = self.build_expense(&db_tx, group_id, new).await?;

            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            for &s in &expense.splits {
                s.row(expense.id).insert(&db_tx).await?;
            }

            Ok(expense)
        })
    }

    /// Replaces an expense's fields and rebuilds its splits.
    pub async fn update_expense(
        &self,
        expense_id: &str,
        username: &str,
        new: NewExpense,
    ) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let model = expenses::Entity::find_by_id(expense_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
            let group_id = model.group_id.clone();
            self.require_group(&db_tx, &group_id, username).await?;

            let mut rebuilt = self.build_expense(&db_tx, &group_id, new).await?;
            rebuilt.id = crate::util::parse_uuid(&model.id, "expense")?;

            expenses::ActiveModel::from(&rebuilt).update(&db_tx).await?;
            split::Entity::delete_many()
                .filter(split::Column::ExpenseId.eq(model.id))
                .exec(&db_tx)
                .await?;
            for &s in &rebuilt.splits {
                s.row(rebuilt.id).insert(&db_tx).await?;
            }

            Ok(rebuilt)
        })
    }

    /// Deletes an expense and its splits.
    pub async fn delete_expense(&self, expense_id: &str, username: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = expenses::Entity::find_by_id(expense_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
            self.require_group(&db_tx, &model.group_id, username).await?;

            split::Entity::delete_many()
                .filter(split::Column::ExpenseId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_by_id(model.id).exec(&db_tx).await?;

            Ok(())
        })
    }

    /// Lists a group's expenses, newest first, with optional filters.
    pub async fn list_expenses(
        &self,
        group_id: &str,
        username: &str,
        filter: ExpenseListFilter,
    ) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id, username).await?;

            let mut query = expenses::Entity::find()
                .filter(expenses::Column::GroupId.eq(group_id.to_string()));
            if let Some(needle) = &filter.description {
                query = query.filter(expenses::Column::Description.contains(needle.as_str()));
            }
            if let Some(min) = filter.min_amount {
                query =
                    query.filter(expenses::Column::AmountCents.gte(MoneyCents::from_major(min).cents()));
            }
            if let Some(max) = filter.max_amount {
                query =
                    query.filter(expenses::Column::AmountCents.lte(MoneyCents::from_major(max).cents()));
            }
            if let Some(start) = filter.start {
                query = query.filter(expenses::Column::Date.gte(start));
            }
            if let Some(end) = filter.end {
                query = query.filter(expenses::Column::Date.lte(end));
            }

            let models = query
                .order_by_desc(expenses::Column::Date)
                .order_by_asc(expenses::Column::Id)
                .all(&db_tx)
                .await?;
            let mut result = attach_splits(&db_tx, models).await?;

            // Participant involvement needs the split rows, so it filters
            // after loading.
            if let Some(participant_id) = filter.participant_id {
                result.retain(|expense| {
                    expense.payer_id == participant_id
                        || expense
                            .splits
                            .iter()
                            .any(|s| s.participant_id == participant_id)
                });
            }

            Ok(result)
        })
    }

    /// Loads the expenses of the given groups, newest first, splits
    /// attached.
    pub(super) async fn expenses_in_groups(
        &self,
        db_tx: &DatabaseTransaction,
        group_ids: &[String],
    ) -> ResultEngine<Vec<Expense>> {
        let models = expenses::Entity::find()
            .filter(expenses::Column::GroupId.is_in(group_ids.iter().cloned()))
            .order_by_desc(expenses::Column::Date)
            .order_by_asc(expenses::Column::Id)
            .all(db_tx)
            .await?;
        attach_splits(db_tx, models).await
    }

    async fn build_expense(
        &self,
        db_tx: &DatabaseTransaction,
        group_id: &str,
        new: NewExpense,
    ) -> ResultEngine<Expense> {
        let description = super::normalize_required_name(&new.description, "expense")?;

        let roster = self.group_roster(db_tx, group_id).await?;
        let roster_ids: Vec<Uuid> = roster.iter().map(|p| p.id).collect();
        if !roster_ids.contains(&new.payer_id) {
            return Err(EngineError::InvalidId(
                "payer is not a group participant".to_string(),
            ));
        }

        let amount = MoneyCents::from_major(new.amount);
        let splits = split::build_splits(new.split_mode, amount, &roster_ids, &new.shares);
        if !split::validate_split_total(amount, &splits) {
            return Err(EngineError::InvalidSplit(
                "split total must match amount".to_string(),
            ));
        }

        Expense::new(
            group_id.to_string(),
            description,
            new.category,
            amount,
            new.date,
            new.payer_id,
            new.split_mode,
            splits,
        )
    }
}

async fn attach_splits(
    db_tx: &DatabaseTransaction,
    models: Vec<expenses::Model>,
) -> ResultEngine<Vec<Expense>> {
    let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
    let mut by_expense: HashMap<String, Vec<split::Model>> = HashMap::new();
    for row in split::Entity::find()
        .filter(split::Column::ExpenseId.is_in(ids))
        .all(db_tx)
        .await?
    {
        by_expense.entry(row.expense_id.clone()).or_default().push(row);
    }

    models
        .into_iter()
        .map(|model| {
            let splits = by_expense.remove(&model.id).unwrap_or_default();
            Expense::try_from((model, splits))
        })
        .collect()
}
