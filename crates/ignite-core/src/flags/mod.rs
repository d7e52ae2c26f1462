//! Flag Resolution Engine.
//!
//! Merges the three flag sources into the final daemon flag map. From highest
//! to lowest precedence:
//! 1. flags explicitly set on the command line;
//! 2. flags derived from the persisted configuration (including I/O properties);
//! 3. the free-form additional start flags.
mod tokens;
pub use tokens::{parse_flag_string, parse_flag_tokens};

use std::collections::BTreeSet;

use ignite_model::{Config, FlagMap, FlagValue, names};
use tracing::{debug, trace};

use crate::{
    error::CoreError,
    io::{IoResolver, ResolvedIo},
};

/// Daemon flags as seen on the command line.
///
/// `values` holds the current value of every tunable (defaults included);
/// only names recorded as explicit were actually typed by the user.
#[derive(Debug, Clone, Default)]
pub struct CliFlags {
    values: FlagMap,
    explicit: BTreeSet<String>,
    well_known_io: Option<String>,
}

impl CliFlags {
    /// Start from the current value of every tunable, none of them explicit.
    pub fn new(values: FlagMap) -> Self {
        Self {
            values,
            explicit: BTreeSet::new(),
            well_known_io: None,
        }
    }

    /// Set a flag value and record it as explicitly changed.
    pub fn set<V: Into<FlagValue>>(mut self, name: &str, value: V) -> Self {
        self.values.insert(name, value);
        self.explicit.insert(name.to_string());
        self
    }

    /// Record a name as explicitly changed without touching its value.
    pub fn mark_explicit(&mut self, name: &str) {
        self.explicit.insert(name.to_string());
    }

    pub fn with_well_known_io(mut self, id: impl Into<String>) -> Self {
        self.well_known_io = Some(id.into());
        self
    }

    pub fn is_explicit(&self, name: &str) -> bool {
        self.explicit.contains(name)
    }

    pub fn well_known_io(&self) -> Option<&str> {
        self.well_known_io.as_deref().filter(|s| !s.is_empty())
    }

    /// Value of a flag only if the user set it.
    pub fn explicit_value(&self, name: &str) -> Option<&FlagValue> {
        if self.is_explicit(name) {
            self.values.get(name)
        } else {
            None
        }
    }

    /// The explicitly set subset of the candidate map.
    fn explicit_flags(&self) -> FlagMap {
        let mut flags = self.values.clone();
        flags.retain(|name, _| self.explicit.contains(name));
        flags
    }
}

/// Computes the final daemon flag map.
pub struct FlagResolver<'a> {
    io: IoResolver<'a>,
}

impl<'a> FlagResolver<'a> {
    pub fn new(io: IoResolver<'a>) -> Self {
        Self { io }
    }

    /// Resolve the final flags from configuration, command line and free-form tokens.
    ///
    /// Does not mutate any input, so identical inputs always produce identical maps.
    pub fn resolve<S: AsRef<str>>(
        &self,
        config: &Config,
        cli: &CliFlags,
        additional: &[S],
    ) -> Result<FlagMap, CoreError> {
        let io = self.io.resolve(config, cli)?;

        let mut derived = cli.explicit_flags();
        derive_from_config(config, cli, &mut derived);
        match io {
            ResolvedIo::DefaultFile(path) => {
                derived.insert(names::IO_PROPERTIES_FILE, path);
            }
            ResolvedIo::Lookup(desc) => {
                derived.insert(names::IO_PROPERTIES, desc.properties.to_yaml()?);
            }
            ResolvedIo::Explicit | ResolvedIo::Unavailable => {}
        }
        trace!(flags = ?derived, "explicit and derived flags");

        let mut flags = parse_flag_tokens(additional);
        flags.overwrite_with(&derived);
        debug!(count = flags.len(), "final daemon flags resolved");
        Ok(flags)
    }
}

fn derive_from_config(config: &Config, cli: &CliFlags, flags: &mut FlagMap) {
    let prestart = &config.prestart;
    if !cli.is_explicit(names::OVERPROVISIONED) {
        if let Some(v) = prestart.overprovisioned {
            flags.insert(names::OVERPROVISIONED, v);
        }
    }
    if !cli.is_explicit(names::SMP) {
        if let Some(smp) = prestart.smp() {
            flags.insert(names::SMP, smp);
        }
    }
    if !cli.is_explicit(names::LOCK_MEMORY) {
        if let Some(v) = prestart.enable_memory_locking {
            flags.insert(names::LOCK_MEMORY, v);
        }
    }
}
