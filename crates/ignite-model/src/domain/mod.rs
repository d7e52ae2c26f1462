mod value;
pub use value::FlagValue;

mod map;
pub use map::FlagMap;

mod cpu;
pub use cpu::{CpuMask, MAX_CPUS};

pub mod names;
