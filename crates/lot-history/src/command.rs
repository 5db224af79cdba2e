//! The command contract

use chrono::{DateTime, Utc};

/// A reversible unit of state mutation.
///
/// `execute` either mutates state completely and returns `true`, or leaves
/// state untouched and returns `false`. `undo` is only called after a
/// successful `execute` and must restore the exact prior state.
pub trait Command {
    /// Human readable label for menus and audit logs
    fn description(&self) -> &str;

    /// Apply the mutation. `false` means nothing changed.
    fn execute(&mut self) -> bool;

    /// Revert a previously successful `execute`
    fn undo(&mut self);

    /// Amount charged against a ledger when executed
    fn cost(&self) -> f64 {
        0.0
    }

    /// When the command was created
    fn timestamp(&self) -> DateTime<Utc>;
}

impl<C: Command + ?Sized> Command for Box<C> {
    fn description(&self) -> &str {
        (**self).description()
    }

    fn execute(&mut self) -> bool {
        (**self).execute()
    }

    fn undo(&mut self) {
        (**self).undo()
    }

    fn cost(&self) -> f64 {
        (**self).cost()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        (**self).timestamp()
    }
}

type ExecuteFn = Box<dyn FnMut() -> bool>;
type UndoFn = Box<dyn FnMut()>;

/// Command built from a pair of caller-provided closures
pub struct ClosureCommand {
    description: String,
    execute: ExecuteFn,
    undo: UndoFn,
    timestamp: DateTime<Utc>,
}

impl ClosureCommand {
    /// Create a command from execute/undo closures.
    ///
    /// The closures must honour the all-or-nothing contract of [`Command`].
    pub fn new(
        description: impl Into<String>,
        execute: impl FnMut() -> bool + 'static,
        undo: impl FnMut() + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            execute: Box::new(execute),
            undo: Box::new(undo),
            timestamp: Utc::now(),
        }
    }
}

impl std::fmt::Debug for ClosureCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureCommand")
            .field("description", &self.description)
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}

impl Command for ClosureCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn execute(&mut self) -> bool {
        (self.execute)()
    }

    fn undo(&mut self) {
        (self.undo)()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_closure_command_round_trip() {
        let value = Rc::new(Cell::new(1));
        let (v1, v2) = (value.clone(), value.clone());
        let mut cmd = ClosureCommand::new(
            "double",
            move || {
                v1.set(v1.get() * 2);
                true
            },
            move || v2.set(v2.get() / 2),
        );

        assert_eq!(cmd.description(), "double");
        assert!(cmd.execute());
        assert_eq!(value.get(), 2);
        cmd.undo();
        assert_eq!(value.get(), 1);
    }

    #[test]
    fn test_timestamp_is_fixed_at_creation() {
        let cmd = ClosureCommand::new("noop", || true, || {});
        let first = cmd.timestamp();
        assert_eq!(cmd.timestamp(), first);
        assert!(first <= Utc::now());
    }
}
