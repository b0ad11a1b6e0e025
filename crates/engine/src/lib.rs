//! SplitMint engine: shared-expense groups, split allocation, and balance /
//! settlement computation over a SQLite ledger.
//!
//! The two algorithmic pieces ([`split`] and [`settle`]) are pure functions
//! over in-memory inputs; everything else is CRUD plumbing that loads rows,
//! invokes them, and persists the results.

pub use error::EngineError;
pub use expenses::{DEFAULT_CATEGORY, Expense};
pub use groups::Group;
pub use invites::{Invite, InviteStatus};
pub use money::MoneyCents;
pub use ops::{
    ALL_GROUPS_ID, Engine, EngineBuilder, ExpenseListFilter, GroupSummary, NewExpense,
    NewParticipant,
};
pub use participants::{Participant, ParticipantStatus};
pub use settle::{BalanceEntry, BalanceSheet, SettlementEntry, compute_balances};
pub use split::{ShareValue, Split, SplitMode, build_splits, equal_split, validate_split_total};

mod error;
mod expenses;
mod groups;
mod invites;
mod money;
mod ops;
mod participants;
mod settle;
mod split;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
