//! Grouping several commands into one history entry

use chrono::{DateTime, Utc};

use crate::command::Command;

/// A sequence of commands executed and undone as a single entry.
///
/// `execute` runs sub-commands in order and stops at the first failure.
/// Sub-commands that already ran are NOT rolled back in that case; callers
/// that need atomicity must validate every step before batching.
pub struct BatchCommand {
    description: String,
    commands: Vec<Box<dyn Command>>,
    /// How many sub-commands the last `execute` applied
    executed: usize,
    timestamp: DateTime<Utc>,
}

impl BatchCommand {
    /// Group `commands` under one history entry, run in the given order
    pub fn new(description: impl Into<String>, commands: Vec<Box<dyn Command>>) -> Self {
        Self {
            description: description.into(),
            commands,
            executed: 0,
            timestamp: Utc::now(),
        }
    }

    /// Number of sub-commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the batch has no sub-commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of sub-commands applied by the last `execute`
    pub fn executed(&self) -> usize {
        self.executed
    }
}

impl std::fmt::Debug for BatchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchCommand")
            .field("description", &self.description)
            .field("len", &self.commands.len())
            .field("executed", &self.executed)
            .finish()
    }
}

impl Command for BatchCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn execute(&mut self) -> bool {
        self.executed = 0;
        for command in &mut self.commands {
            if !command.execute() {
                tracing::warn!(
                    "Batch '{}' stopped at '{}' after {} step(s)",
                    self.description,
                    command.description(),
                    self.executed
                );
                return false;
            }
            self.executed += 1;
        }
        true
    }

    fn undo(&mut self) {
        for command in self.commands[..self.executed].iter_mut().rev() {
            command.undo();
        }
        self.executed = 0;
    }

    fn cost(&self) -> f64 {
        self.commands.iter().map(|c| c.cost()).sum()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ClosureCommand;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    fn step(log: &Log, name: &'static str, ok: bool) -> Box<dyn Command> {
        let (l1, l2) = (log.clone(), log.clone());
        Box::new(ClosureCommand::new(
            name,
            move || {
                if ok {
                    l1.borrow_mut().push(format!("do {name}"));
                }
                ok
            },
            move || l2.borrow_mut().push(format!("undo {name}")),
        ))
    }

    #[test]
    fn test_undo_runs_in_reverse_order() {
        let log = Log::default();
        let mut batch = BatchCommand::new(
            "three",
            vec![step(&log, "a", true), step(&log, "b", true), step(&log, "c", true)],
        );

        assert!(batch.execute());
        batch.undo();
        assert_eq!(
            *log.borrow(),
            ["do a", "do b", "do c", "undo c", "undo b", "undo a"]
        );
    }

    #[test]
    fn test_partial_failure_keeps_earlier_steps() {
        let log = Log::default();
        let mut batch = BatchCommand::new(
            "partial",
            vec![step(&log, "a", true), step(&log, "b", false), step(&log, "c", true)],
        );

        assert!(!batch.execute());
        assert_eq!(batch.executed(), 1);
        // "a" stays applied and "c" never ran
        assert_eq!(*log.borrow(), ["do a"]);
    }

    #[test]
    fn test_empty_batch_succeeds() {
        let mut batch = BatchCommand::new("empty", Vec::new());
        assert!(batch.is_empty());
        assert!(batch.execute());
    }
}
