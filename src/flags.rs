use std::collections::HashMap;
use std::fmt::Display;

/// Header options a grammar file may set.
pub const KNOWN_FLAGS: &[&str] = &["start"];

/// Value of a `key = value` option in a grammar file header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlagValue {
    String(String),
    Int(u32),
}

impl From<u32> for FlagValue {
    fn from(value: u32) -> Self {
        FlagValue::Int(value)
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        FlagValue::String(value)
    }
}

impl Display for FlagValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlagValue::String(s) => write!(f, "{s}"),
            FlagValue::Int(n) => write!(f, "{n}"),
        }
    }
}

/// Options from a grammar file header. A repeated key keeps its last value.
#[derive(Clone, Debug, Default)]
pub struct Flags {
    inner: HashMap<String, FlagValue>,
}

impl FromIterator<(String, FlagValue)> for Flags {
    fn from_iter<I: IntoIterator<Item = (String, FlagValue)>>(iter: I) -> Self {
        Flags {
            inner: iter.into_iter().collect(),
        }
    }
}

impl Flags {
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).map(ToString::to_string)
    }

    /// Keys not listed in `known`, sorted.
    pub fn unknown_keys(&self, known: &[&str]) -> Vec<&str> {
        let mut keys: Vec<_> = self
            .inner
            .keys()
            .map(String::as_str)
            .filter(|key| !known.contains(key))
            .collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_read_back_as_text() {
        let flags: Flags = [
            ("depth".to_string(), FlagValue::from(12)),
            ("start".to_string(), FlagValue::from("root".to_string())),
            ("start".to_string(), FlagValue::from("sentence".to_string())),
        ]
        .into_iter()
        .collect();

        assert_eq!(flags.get("depth"), Some("12".to_string()));
        assert_eq!(flags.get("start"), Some("sentence".to_string()));
        assert_eq!(flags.get("missing"), None);
    }

    #[test]
    fn reports_unknown_keys() {
        let flags: Flags = [
            ("start".to_string(), FlagValue::from("root".to_string())),
            ("zeta".to_string(), FlagValue::from(1)),
            ("alpha".to_string(), FlagValue::from(2)),
        ]
        .into_iter()
        .collect();

        assert_eq!(flags.unknown_keys(KNOWN_FLAGS), vec!["alpha", "zeta"]);
        assert!(Flags::default().unknown_keys(KNOWN_FLAGS).is_empty());
    }
}
