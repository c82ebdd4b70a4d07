//! Reference resolution between commands in one plan.
//!
//! A plan can create a page and then target it with a later command
//! before any real identifier exists. The sentinel `target_post_id: 0`
//! means "whatever the previous command produced". Produced identifiers
//! are tracked in an explicit binding table keyed by command index, so
//! resolution is a lookup rather than a shared mutable cursor.

use std::collections::HashMap;

use crate::error::{EngineError, Result};

/// Identifiers produced by already-executed commands, keyed by the
/// producing command's position in the plan.
#[derive(Debug, Default)]
pub struct Bindings {
    produced: HashMap<usize, u64>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the command at `index` produced resource `id`.
    pub fn record(&mut self, index: usize, id: u64) {
        self.produced.insert(index, id);
    }

    /// Resolves a command's target.
    ///
    /// A non-zero `explicit` identifier wins. The `0` sentinel resolves
    /// to the identifier produced by the immediately preceding command;
    /// anything older is deliberately out of reach, since the sentinel
    /// contract is "the page I just created".
    pub fn resolve_target(&self, explicit: u64, index: usize) -> Result<u64> {
        if explicit != 0 {
            return Ok(explicit);
        }
        index
            .checked_sub(1)
            .and_then(|prev| self.produced.get(&prev).copied())
            .ok_or(EngineError::MissingTarget { index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_target_wins() {
        let bindings = Bindings::new();
        assert_eq!(bindings.resolve_target(42, 5).expect("explicit"), 42);
    }

    #[test]
    fn test_sentinel_resolves_to_previous_command() {
        let mut bindings = Bindings::new();
        bindings.record(0, 101);
        assert_eq!(bindings.resolve_target(0, 1).expect("lookback"), 101);
    }

    #[test]
    fn test_sentinel_without_predecessor_fails() {
        let bindings = Bindings::new();
        let err = bindings.resolve_target(0, 0).unwrap_err();
        assert!(matches!(err, EngineError::MissingTarget { index: 0 }));
    }

    #[test]
    fn test_sentinel_does_not_reach_older_commands() {
        let mut bindings = Bindings::new();
        bindings.record(0, 101);
        // Command 1 produced nothing, so command 2 cannot resolve.
        let err = bindings.resolve_target(0, 2).unwrap_err();
        assert!(matches!(err, EngineError::MissingTarget { index: 2 }));
    }
}
