//! Split allocation.
//!
//! Turns an expense total into per-participant owed amounts according to the
//! chosen [`SplitMode`]. Allocation is pure: it never touches storage and
//! never fails. A share set whose rounded sum drifts from the total is a
//! validation concern of the caller (see [`validate_split_total`]).

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

/// How an expense total is divided between participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    Equal,
    Custom,
    Percentage,
}

impl SplitMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Custom => "custom",
            Self::Percentage => "percentage",
        }
    }
}

impl TryFrom<&str> for SplitMode {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "equal" => Ok(Self::Equal),
            "custom" => Ok(Self::Custom),
            "percentage" => Ok(Self::Percentage),
            other => Err(EngineError::InvalidSplit(format!(
                "invalid split mode: {other}"
            ))),
        }
    }
}

/// The amount one participant owes for one expense.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Split {
    pub participant_id: Uuid,
    pub amount: MoneyCents,
}

/// One caller-supplied share: a fixed amount for [`SplitMode::Custom`], a
/// 0–100 percentage for [`SplitMode::Percentage`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShareValue {
    pub participant_id: Uuid,
    pub value: f64,
}

/// Builds the split set for an expense.
///
/// `participant_ids` is the group roster in insertion order and is only
/// consulted for [`SplitMode::Equal`]; `shares` carries the explicit values
/// for the other two modes.
pub fn build_splits(
    mode: SplitMode,
    total: MoneyCents,
    participant_ids: &[Uuid],
    shares: &[ShareValue],
) -> Vec<Split> {
    match mode {
        SplitMode::Equal => equal_split(total, participant_ids),
        SplitMode::Custom => shares
            .iter()
            .map(|share| Split {
                participant_id: share.participant_id,
                amount: MoneyCents::from_major(share.value),
            })
            .collect(),
        SplitMode::Percentage => shares
            .iter()
            .map(|share| Split {
                participant_id: share.participant_id,
                amount: MoneyCents::from_major(total.to_major() * share.value / 100.0),
            })
            .collect(),
    }
}

/// Divides `total` evenly, distributing the leftover cents one by one to the
/// participants at the front of the list.
///
/// With `n` participants each gets `total_cents / n` (truncating division);
/// the remainder is strictly less than `n` cents, so handing one extra cent
/// to the first `remainder` participants makes the sum exact while no two
/// shares differ by more than one cent. The distribution is deterministic
/// for a given roster order.
pub fn equal_split(total: MoneyCents, participant_ids: &[Uuid]) -> Vec<Split> {
    let count = participant_ids.len() as i64;
    if count == 0 {
        return Vec::new();
    }

    let base = total.cents() / count;
    let remainder = total.cents() - base * count;

    participant_ids
        .iter()
        .enumerate()
        .map(|(i, &participant_id)| Split {
            participant_id,
            amount: MoneyCents::new(if (i as i64) < remainder { base + 1 } else { base }),
        })
        .collect()
}

/// Returns `true` when the split sum matches the total within one cent of
/// rounding slack.
pub fn validate_split_total(total: MoneyCents, splits: &[Split]) -> bool {
    let sum: i64 = splits.iter().map(|split| split.amount.cents()).sum();
    (total.cents() - sum).abs() <= 1
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "splits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub expense_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub participant_id: String,
    pub amount_cents: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id"
    )]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Split {
    pub(crate) fn row(self, expense_id: Uuid) -> ActiveModel {
        ActiveModel {
            expense_id: ActiveValue::Set(expense_id.to_string()),
            participant_id: ActiveValue::Set(self.participant_id.to_string()),
            amount_cents: ActiveValue::Set(self.amount.cents()),
        }
    }
}

impl TryFrom<Model> for Split {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            participant_id: parse_uuid(&model.participant_id, "participant")?,
            amount: MoneyCents::new(model.amount_cents),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn equal_split_is_exact_for_small_rosters() {
        for n in 1..=20 {
            let roster = ids(n);
            for cents in [100, 999, 1000, 12_345, 20_000, 1] {
                let total = MoneyCents::new(cents);
                let splits = equal_split(total, &roster);
                let sum: i64 = splits.iter().map(|s| s.amount.cents()).sum();
                assert_eq!(sum, cents, "n={n} cents={cents}");
            }
        }
    }

    #[test]
    fn equal_split_shares_differ_by_at_most_one_cent() {
        for n in 1..=20 {
            let roster = ids(n);
            let splits = equal_split(MoneyCents::new(10_000), &roster);
            let min = splits.iter().map(|s| s.amount.cents()).min().unwrap();
            let max = splits.iter().map(|s| s.amount.cents()).max().unwrap();
            assert!(max - min <= 1);
        }
    }

    #[test]
    fn equal_split_three_way_150() {
        let roster = ids(3);
        let splits = equal_split(MoneyCents::new(150_00), &roster);
        assert_eq!(
            splits.iter().map(|s| s.amount.cents()).collect::<Vec<_>>(),
            vec![50_00, 50_00, 50_00]
        );
    }

    #[test]
    fn equal_split_distributes_remainder_in_roster_order() {
        // 200.00 / 3 = 66.66 base with 2 leftover cents for the first two.
        let roster = ids(3);
        let splits = equal_split(MoneyCents::new(200_00), &roster);
        assert_eq!(
            splits.iter().map(|s| s.amount.cents()).collect::<Vec<_>>(),
            vec![66_67, 66_67, 66_66]
        );
        assert_eq!(splits[0].participant_id, roster[0]);
        assert_eq!(splits[2].participant_id, roster[2]);
    }

    #[test]
    fn equal_split_empty_roster_yields_no_splits() {
        assert!(equal_split(MoneyCents::new(100_00), &[]).is_empty());
    }

    #[test]
    fn percentage_mode_rounds_each_share() {
        let roster = ids(3);
        let shares: Vec<ShareValue> = roster
            .iter()
            .zip([40.0, 40.0, 20.0])
            .map(|(&participant_id, value)| ShareValue {
                participant_id,
                value,
            })
            .collect();
        let splits = build_splits(SplitMode::Percentage, MoneyCents::new(120_00), &[], &shares);
        assert_eq!(
            splits.iter().map(|s| s.amount.cents()).collect::<Vec<_>>(),
            vec![48_00, 48_00, 24_00]
        );
        assert!(validate_split_total(MoneyCents::new(120_00), &splits));
    }

    #[test]
    fn custom_mode_keeps_given_amounts() {
        let roster = ids(2);
        let shares = vec![
            ShareValue {
                participant_id: roster[0],
                value: 30.0,
            },
            ShareValue {
                participant_id: roster[1],
                value: 45.505,
            },
        ];
        let splits = build_splits(SplitMode::Custom, MoneyCents::new(75_51), &[], &shares);
        assert_eq!(splits[0].amount.cents(), 30_00);
        assert_eq!(splits[1].amount.cents(), 45_51);
    }

    #[test]
    fn validate_split_total_allows_one_cent_of_slack() {
        let roster = ids(2);
        let splits = vec![
            Split {
                participant_id: roster[0],
                amount: MoneyCents::new(50_00),
            },
            Split {
                participant_id: roster[1],
                amount: MoneyCents::new(49_99),
            },
        ];
        assert!(validate_split_total(MoneyCents::new(100_00), &splits));
        assert!(!validate_split_total(MoneyCents::new(100_02), &splits));
    }

    #[test]
    fn split_mode_round_trips_storage_strings() {
        for mode in [SplitMode::Equal, SplitMode::Custom, SplitMode::Percentage] {
            assert_eq!(SplitMode::try_from(mode.as_str()).unwrap(), mode);
        }
        assert!(SplitMode::try_from("thirds").is_err());
    }
}
