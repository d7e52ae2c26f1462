//! Names of the launch flags understood by the daemon.
//!
//! Flag names are stored without leading hyphens; the `--` prefix is added only
//! when launch arguments are rendered.

pub const MEMORY: &str = "memory";
pub const LOCK_MEMORY: &str = "lock-memory";
pub const RESERVE_MEMORY: &str = "reserve-memory";
pub const HUGEPAGES: &str = "hugepages";
pub const CPUSET: &str = "cpuset";
pub const IO_PROPERTIES_FILE: &str = "io-properties-file";
pub const IO_PROPERTIES: &str = "io-properties";
pub const SMP: &str = "smp";
pub const THREAD_AFFINITY: &str = "thread-affinity";
pub const NUM_IO_QUEUES: &str = "num-io-queues";
pub const MAX_IO_REQUESTS: &str = "max-io-requests";
pub const MBIND: &str = "mbind";
pub const OVERPROVISIONED: &str = "overprovisioned";

/// Resolver input selecting pre-measured I/O characteristics.
///
/// Never forwarded to the daemon.
pub const WELL_KNOWN_IO: &str = "well-known-io";

/// Every tunable daemon flag, in a stable order.
pub const DAEMON_FLAGS: [&str; 13] = [
    MEMORY,
    LOCK_MEMORY,
    RESERVE_MEMORY,
    HUGEPAGES,
    CPUSET,
    IO_PROPERTIES_FILE,
    IO_PROPERTIES,
    SMP,
    THREAD_AFFINITY,
    NUM_IO_QUEUES,
    MAX_IO_REQUESTS,
    MBIND,
    OVERPROVISIONED,
];
