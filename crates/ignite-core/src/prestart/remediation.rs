use std::collections::HashMap;

use ignite_model::{CheckResult, CheckerId, FlagMap, names};

/// Adjusts pending launch flags in response to a failed check.
pub trait Remediation {
    fn apply(&self, result: &CheckResult, flags: &mut FlagMap);
}

impl<F> Remediation for F
where
    F: Fn(&CheckResult, &mut FlagMap),
{
    fn apply(&self, result: &CheckResult, flags: &mut FlagMap) {
        self(result, flags)
    }
}

/// Remediation actions keyed by checker identity.
#[derive(Default)]
pub struct RemediationTable {
    actions: HashMap<CheckerId, Box<dyn Remediation>>,
}

impl RemediationTable {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// The built-in actions: swap present disables memory locking.
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.register(CheckerId::SWAP, disable_memory_locking);
        table
    }

    /// Register an action; replaces any action already registered for `id`.
    pub fn register<R>(&mut self, id: CheckerId, action: R) -> &mut Self
    where
        R: Remediation + 'static,
    {
        self.actions.insert(id, Box::new(action));
        self
    }

    pub fn get(&self, id: &CheckerId) -> Option<&dyn Remediation> {
        self.actions.get(id).map(|a| a.as_ref())
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

fn disable_memory_locking(_result: &CheckResult, flags: &mut FlagMap) {
    flags.insert(names::LOCK_MEMORY, false);
}
