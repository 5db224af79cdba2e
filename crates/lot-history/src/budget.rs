//! Budget ledger and the cost-charging command decorator

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::command::Command;

/// Funds available and money spent so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub funds: f64,
    pub spent: f64,
}

impl Budget {
    /// Fresh budget with nothing spent
    pub fn new(funds: f64) -> Self {
        Self { funds, spent: 0.0 }
    }

    /// Whether a change costing `cost` may proceed. Refunds always can.
    pub fn can_afford(&self, cost: f64) -> bool {
        cost <= 0.0 || self.funds >= cost
    }

    /// Move `cost` from funds to spent
    pub fn charge(&mut self, cost: f64) {
        self.funds -= cost;
        self.spent += cost;
    }
}

/// Shared access to a [`Budget`].
///
/// Implementors use interior mutability so several commands can hold the
/// same ledger.
pub trait Ledger {
    /// Current balance
    fn budget(&self) -> Budget;

    /// Deduct `cost` from the balance
    fn charge(&self, cost: f64);

    /// Overwrite the balance with an earlier snapshot
    fn restore(&self, budget: Budget);
}

/// A standalone shared budget
pub type SharedBudget = Arc<Mutex<Budget>>;

impl Ledger for Arc<Mutex<Budget>> {
    fn budget(&self) -> Budget {
        *self.lock()
    }

    fn charge(&self, cost: f64) {
        self.lock().charge(cost);
    }

    fn restore(&self, budget: Budget) {
        *self.lock() = budget;
    }
}

/// Wraps a command with a cost charged against a ledger.
///
/// A positive cost the ledger cannot cover aborts before the inner command
/// runs. Undo puts back the exact balance seen before the charge; history
/// is last-in first-out, so nothing else has touched the ledger since.
pub struct BudgetCommand<L: Ledger> {
    inner: Box<dyn Command>,
    cost: f64,
    ledger: L,
    /// Balance before the last successful execute
    before: Option<Budget>,
    timestamp: DateTime<Utc>,
}

impl<L: Ledger> BudgetCommand<L> {
    /// Charge `cost` to `ledger` whenever `inner` executes
    pub fn new(inner: Box<dyn Command>, cost: f64, ledger: L) -> Self {
        Self {
            inner,
            cost,
            ledger,
            before: None,
            timestamp: Utc::now(),
        }
    }
}

impl<L: Ledger> Command for BudgetCommand<L> {
    fn description(&self) -> &str {
        self.inner.description()
    }

    fn execute(&mut self) -> bool {
        let budget = self.ledger.budget();
        if !budget.can_afford(self.cost) {
            tracing::warn!(
                "Insufficient funds for '{}': cost {:.2}, available {:.2}",
                self.inner.description(),
                self.cost,
                budget.funds
            );
            return false;
        }

        if !self.inner.execute() {
            return false;
        }

        self.ledger.charge(self.cost);
        self.before = Some(budget);
        true
    }

    fn undo(&mut self) {
        self.inner.undo();
        if let Some(budget) = self.before.take() {
            self.ledger.restore(budget);
        }
    }

    fn cost(&self) -> f64 {
        self.cost
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ClosureCommand;
    use crate::history::CommandHistory;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter_command(counter: &Rc<Cell<u32>>) -> Box<dyn Command> {
        let (c1, c2) = (counter.clone(), counter.clone());
        Box::new(ClosureCommand::new(
            "count",
            move || {
                c1.set(c1.get() + 1);
                true
            },
            move || c2.set(c2.get() - 1),
        ))
    }

    #[test]
    fn test_insufficient_funds_mutates_nothing() {
        let ledger: SharedBudget = Arc::new(Mutex::new(Budget::new(100.0)));
        let counter = Rc::new(Cell::new(0));
        let mut cmd = BudgetCommand::new(counter_command(&counter), 150.0, ledger.clone());

        assert!(!cmd.execute());
        assert_eq!(counter.get(), 0);
        assert_eq!(ledger.budget(), Budget::new(100.0));
    }

    #[test]
    fn test_charge_and_undo_exactly() {
        let ledger: SharedBudget = Arc::new(Mutex::new(Budget::new(1000.0)));
        let counter = Rc::new(Cell::new(0));
        let mut history = CommandHistory::default();

        assert!(history.execute(Box::new(BudgetCommand::new(
            counter_command(&counter),
            250.0,
            ledger.clone(),
        ))));
        assert_eq!(counter.get(), 1);
        assert_relative_eq!(ledger.budget().funds, 750.0);
        assert_relative_eq!(ledger.budget().spent, 250.0);

        assert!(history.undo());
        assert_eq!(counter.get(), 0);
        assert_eq!(ledger.budget(), Budget::new(1000.0));
    }

    #[test]
    fn test_fractional_prices_undo_to_the_cent() {
        let ledger: SharedBudget = Arc::new(Mutex::new(Budget::new(1000.0)));
        let counter = Rc::new(Cell::new(0));
        let mut history = CommandHistory::default();

        for price in [30.26, 7.28, 0.1] {
            let cmd = BudgetCommand::new(counter_command(&counter), price, ledger.clone());
            assert!(history.execute(Box::new(cmd)));
        }
        assert_eq!(history.undo_description(), Some("count"));
        while history.undo() {}

        assert_eq!(counter.get(), 0);
        assert_eq!(ledger.budget(), Budget::new(1000.0));

        assert!(history.redo());
        assert_eq!(ledger.budget().funds, 1000.0 - 30.26);
    }

    #[test]
    fn test_cost_is_reported() {
        let ledger: SharedBudget = Arc::new(Mutex::new(Budget::new(10.0)));
        let counter = Rc::new(Cell::new(0));
        let cmd = BudgetCommand::new(counter_command(&counter), 12.5, ledger);
        assert_eq!(cmd.cost(), 12.5);
        assert_eq!(ClosureCommand::new("free", || true, || {}).cost(), 0.0);
    }

    #[test]
    fn test_exact_funds_are_enough() {
        let ledger: SharedBudget = Arc::new(Mutex::new(Budget::new(50.0)));
        let counter = Rc::new(Cell::new(0));
        let mut cmd = BudgetCommand::new(counter_command(&counter), 50.0, ledger.clone());

        assert!(cmd.execute());
        assert_relative_eq!(ledger.budget().funds, 0.0);
    }

    #[test]
    fn test_negative_cost_credits_funds() {
        let ledger: SharedBudget = Arc::new(Mutex::new(Budget::new(0.0)));
        let counter = Rc::new(Cell::new(0));
        let mut cmd = BudgetCommand::new(counter_command(&counter), -20.0, ledger.clone());

        assert!(cmd.execute());
        assert_relative_eq!(ledger.budget().funds, 20.0);
        cmd.undo();
        assert_relative_eq!(ledger.budget().funds, 0.0);
    }

    #[test]
    fn test_inner_failure_does_not_charge() {
        let ledger: SharedBudget = Arc::new(Mutex::new(Budget::new(100.0)));
        let inner = Box::new(ClosureCommand::new("refuse", || false, || {}));
        let mut cmd = BudgetCommand::new(inner, 10.0, ledger.clone());

        assert!(!cmd.execute());
        assert_eq!(ledger.budget(), Budget::new(100.0));
    }
}
