//! Command History
//!
//! This crate provides the reversible-operation layer shared by every
//! mutating editor tool:
//! - `Command`: a unit of state mutation with an all-or-nothing `execute`
//!   and a matching `undo`
//! - `CommandHistory`: bounded linear undo/redo stacks
//! - `BatchCommand`: several commands recorded as one history entry
//! - `BudgetCommand`: a decorator charging a cost against a shared ledger

pub mod batch;
pub mod budget;
pub mod command;
pub mod history;

// Re-exports for convenience
pub use batch::BatchCommand;
pub use budget::{Budget, BudgetCommand, Ledger, SharedBudget};
pub use command::{ClosureCommand, Command};
pub use history::{CommandHistory, DEFAULT_MAX_HISTORY};
