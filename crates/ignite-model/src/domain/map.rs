use std::collections::BTreeMap;

use crate::FlagValue;

/// Ordered mapping of flag name to typed value.
///
/// Names are unique; inserting an existing name replaces its value.
/// Iteration is in name order, so two maps with the same content always
/// render the same launch arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagMap(BTreeMap<String, FlagValue>);

impl FlagMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert or replace a flag.
    pub fn insert<K, V>(&mut self, name: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<FlagValue>,
    {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.0.get(name)
    }

    /// Rendered text value of a flag, if present.
    pub fn rendered(&self, name: &str) -> Option<String> {
        self.0.get(name).map(FlagValue::render)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FlagValue> {
        self.0.remove(name)
    }

    /// Keep only the flags for which `keep` returns `true`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &FlagValue) -> bool,
    {
        self.0.retain(|k, v| keep(k, v));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overwrite every flag present in `other`; flags only present in `self` are kept.
    pub fn overwrite_with(&mut self, other: &FlagMap) {
        for (name, value) in other.iter() {
            self.0.insert(name.to_string(), value.clone());
        }
    }

    /// Apply runtime overrides of the form `name value` or `name=value`.
    ///
    /// Each override is split on the first run of whitespace or `=` characters
    /// into a name and an optional value. Leading hyphens are stripped from the
    /// name; a missing value becomes the empty string. Later overrides win over
    /// earlier ones and all of them win over the entries already in the map.
    pub fn merge_overrides<I, S>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed: BTreeMap<String, String> = BTreeMap::new();
        for o in overrides {
            let (name, value) = split_override(o.as_ref());
            parsed.insert(name.trim_start_matches('-').to_string(), value.to_string());
        }
        for (name, value) in parsed {
            self.0.insert(name, FlagValue::Text(value));
        }
    }

    /// Render as `--name=value` launch arguments, in name order.
    pub fn to_args(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|(name, value)| format!("--{name}={value}"))
            .collect()
    }
}

fn split_override(s: &str) -> (&str, &str) {
    let is_sep = |c: char| c.is_whitespace() || c == '=';
    match s.find(is_sep) {
        Some(start) => {
            let rest = &s[start..];
            let value = rest.trim_start_matches(is_sep);
            (&s[..start], value)
        }
        None => (s, ""),
    }
}

impl<K, V> FromIterator<(K, V)> for FlagMap
where
    K: Into<String>,
    V: Into<FlagValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_map(pairs: &[(&str, &str)]) -> FlagMap {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn insert_replaces_existing_name() {
        let mut m = FlagMap::new();
        m.insert("smp", 2u32);
        m.insert("smp", 4u32);

        assert_eq!(m.len(), 1);
        assert_eq!(m.rendered("smp").as_deref(), Some("4"));
    }

    #[test]
    fn overwrite_with_wins_on_collision() {
        let mut base = text_map(&[("a", "1"), ("b", "2")]);
        let explicit = text_map(&[("b", "3")]);

        base.overwrite_with(&explicit);

        assert_eq!(base, text_map(&[("a", "1"), ("b", "3")]));
    }

    #[test]
    fn merge_overrides_accepts_space_and_equals_forms() {
        let mut m = FlagMap::new();
        m.merge_overrides(["--memory 4G", "smp=2", "--mbind", "reserve-memory = 1G"]);

        assert_eq!(m.rendered("memory").as_deref(), Some("4G"));
        assert_eq!(m.rendered("smp").as_deref(), Some("2"));
        assert_eq!(m.rendered("mbind").as_deref(), Some(""));
        assert_eq!(m.rendered("reserve-memory").as_deref(), Some("1G"));
    }

    #[test]
    fn merge_overrides_later_wins_and_replaces_base() {
        let mut m = text_map(&[("smp", "8"), ("memory", "1G")]);
        m.merge_overrides(["smp=2", "smp 3"]);

        assert_eq!(m.rendered("smp").as_deref(), Some("3"));
        assert_eq!(m.rendered("memory").as_deref(), Some("1G"));
    }

    #[test]
    fn merge_overrides_splits_only_once() {
        let mut m = FlagMap::new();
        m.merge_overrides(["--logger-log-level=io=debug"]);

        assert_eq!(m.rendered("logger-log-level").as_deref(), Some("io=debug"));
    }

    #[test]
    fn to_args_renders_in_name_order() {
        let mut m = FlagMap::new();
        m.insert("smp", 2u32);
        m.insert("lock-memory", false);

        assert_eq!(m.to_args(), vec!["--lock-memory=false", "--smp=2"]);
    }
}
