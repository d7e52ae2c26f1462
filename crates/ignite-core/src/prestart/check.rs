use std::time::Duration;

use ignite_model::{CheckResult, CheckerId, Config};

/// Inspects one aspect of the host against what the daemon requires.
pub trait Check {
    /// Identity used to find remediation actions.
    fn id(&self) -> CheckerId;

    /// Run the check. `timeout` bounds any blocking operation inside the check.
    fn run(&self, config: &Config, timeout: Duration) -> CheckResult;
}

/// Ordered set of checks; they run in registration order.
#[derive(Default)]
pub struct CheckRegistry {
    checks: Vec<Box<dyn Check>>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    pub fn register(&mut self, check: Box<dyn Check>) {
        self.checks.push(check);
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Check> {
        self.checks.iter().map(|c| c.as_ref())
    }
}
