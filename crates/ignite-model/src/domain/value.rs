use std::{fmt, path::PathBuf};

/// Typed value of a single launch flag.
///
/// Values keep their logical type while flags are being resolved and are
/// rendered to text only when the final launch arguments are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Path(PathBuf),
    Text(String),
}

impl FlagValue {
    /// Render the value the way the daemon expects it on its command line.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Returns the boolean value, if this is a boolean flag.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{b}"),
            FlagValue::Int(i) => write!(f, "{i}"),
            FlagValue::Path(p) => write!(f, "{}", p.display()),
            FlagValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for FlagValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u32> for FlagValue {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<PathBuf> for FlagValue {
    fn from(p: PathBuf) -> Self {
        Self::Path(p)
    }
}

impl From<String> for FlagValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for FlagValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}
