use std::{collections::BTreeSet, fmt, str::FromStr};

use crate::ModelError;

/// Set of logical CPUs used to place the daemon and to scope tuners.
///
/// Parsed from cpuset(7) list syntax (`0-3,8,10-11`) and rendered as a
/// hwloc-style bitmask of comma-separated 32-bit words, most significant first
/// (`0x00000001,0x0000000f`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuMask(BTreeSet<u32>);

/// Upper bound on CPU ids accepted from list expressions (the kernel's largest `NR_CPUS`).
pub const MAX_CPUS: u32 = 8192;

impl CpuMask {
    pub fn from_cpus<I: IntoIterator<Item = u32>>(cpus: I) -> Self {
        Self(cpus.into_iter().collect())
    }

    /// Parse a cpuset(7) list expression.
    ///
    /// CPU ids must be below [`MAX_CPUS`]; bounds are checked before a range is expanded.
    pub fn parse_list(expr: &str) -> Result<Self, ModelError> {
        let invalid = || ModelError::InvalidCpuSet(expr.to_string());
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(invalid());
        }

        let mut cpus = BTreeSet::new();
        for part in expr.split(',') {
            let part = part.trim();
            match part.split_once('-') {
                Some((lo, hi)) => {
                    let lo: u32 = lo.trim().parse().map_err(|_| invalid())?;
                    let hi: u32 = hi.trim().parse().map_err(|_| invalid())?;
                    if lo > hi || hi >= MAX_CPUS {
                        return Err(invalid());
                    }
                    cpus.extend(lo..=hi);
                }
                None => {
                    let cpu: u32 = part.parse().map_err(|_| invalid())?;
                    if cpu >= MAX_CPUS {
                        return Err(invalid());
                    }
                    cpus.insert(cpu);
                }
            }
        }
        Ok(Self(cpus))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn count(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, cpu: u32) -> bool {
        self.0.contains(&cpu)
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl FromStr for CpuMask {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_list(s)
    }
}

impl fmt::Display for CpuMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = self.0.last().map(|max| (*max / 32) as usize + 1).unwrap_or(1);
        let mut bits = vec![0u32; words];
        for cpu in &self.0 {
            bits[(*cpu / 32) as usize] |= 1 << (cpu % 32);
        }
        let rendered: Vec<String> = bits.iter().rev().map(|w| format!("0x{w:08x}")).collect();
        f.write_str(&rendered.join(","))
    }
}
