//! Wire types shared by the SplitMint server and its clients.
//!
//! Monetary amounts cross the API as decimal numbers with two fractional
//! digits; the engine rounds them to integer cents on entry and renders
//! them back on exit.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    Equal,
    Custom,
    Percentage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    Pending,
    Active,
}

pub mod group {
    use super::*;

    /// A participant given inline at group creation (the group id is implied).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct InlineParticipant {
        pub name: String,
        pub email: String,
        pub color: Option<String>,
        pub avatar: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        pub participants: Option<Vec<InlineParticipant>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupRename {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: String,
        pub name: String,
        pub owner_id: String,
        pub created_at: DateTime<Utc>,
        /// `true` for the synthetic "All Groups" union scope.
        #[serde(default)]
        pub is_virtual: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupCreated {
        pub id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupsResponse {
        pub groups: Vec<GroupView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupDetailResponse {
        pub group: GroupView,
        pub participants: Vec<super::participant::ParticipantView>,
        pub expenses: Vec<super::expense::ExpenseView>,
        pub summary: super::summary::SummaryView,
    }
}

pub mod participant {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantNew {
        pub group_id: String,
        pub name: String,
        pub email: String,
        pub color: Option<String>,
        pub avatar: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantUpdate {
        pub name: String,
        pub color: Option<String>,
        pub avatar: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub status: ParticipantStatus,
        pub color: String,
        pub avatar: String,
        pub user_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantCreated {
        pub participant: ParticipantView,
        /// Present when the email has no account yet; deliver it out of band.
        pub invite_token: Option<String>,
    }
}

pub mod expense {
    use super::*;

    /// One explicit share: a fixed amount for `custom`, a 0–100 percentage
    /// for `percentage`. Ignored for `equal`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareInput {
        pub participant_id: Uuid,
        pub value: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub group_id: String,
        pub description: String,
        pub category: Option<String>,
        pub amount: f64,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub date: DateTime<FixedOffset>,
        pub payer_id: Uuid,
        pub split_mode: SplitMode,
        pub splits: Option<Vec<ShareInput>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub description: String,
        pub category: Option<String>,
        pub amount: f64,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub date: DateTime<FixedOffset>,
        pub payer_id: Uuid,
        pub split_mode: SplitMode,
        pub splits: Option<Vec<ShareInput>>,
    }

    /// Query-string filters for expense listing.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseListQuery {
        pub group_id: String,
        /// Substring match on the description.
        pub q: Option<String>,
        pub participant_id: Option<Uuid>,
        pub min: Option<f64>,
        pub max: Option<f64>,
        pub start: Option<DateTime<FixedOffset>>,
        pub end: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitView {
        pub participant_id: Uuid,
        pub amount: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub group_id: String,
        pub description: String,
        pub category: String,
        pub amount: f64,
        pub date: DateTime<Utc>,
        pub payer_id: Uuid,
        pub split_mode: SplitMode,
        pub splits: Vec<SplitView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpensesResponse {
        pub expenses: Vec<ExpenseView>,
    }
}

pub mod summary {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub participant_id: Uuid,
        pub net: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementView {
        pub from: Uuid,
        pub to: Uuid,
        pub amount: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryView {
        pub total_spent: f64,
        pub balances: Vec<BalanceView>,
        pub settlements: Vec<SettlementView>,
    }
}

pub mod invite {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InviteAccept {
        pub token: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InviteAccepted {
        pub group_id: String,
    }
}
