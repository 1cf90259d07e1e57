//! Environment variable access behind a mockable handle.
//!
//! Production code constructs [`Env::real()`]; tests construct
//! [`Env::mock()`] with a fixed variable map so they never touch the
//! process environment (and never need `unsafe` `set_var` calls).

use std::collections::HashMap;

/// Environment variable reader.
#[derive(Clone, Debug, Default)]
pub struct Env {
    fixed: Option<HashMap<String, String>>,
}

impl Env {
    /// An `Env` backed by the real process environment.
    pub fn real() -> Self {
        Self { fixed: None }
    }

    /// An `Env` backed by an explicit variable map.
    #[cfg(test)]
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            fixed: Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    /// Look up a variable; `None` when unset.
    pub fn var(&self, name: &str) -> Option<String> {
        match &self.fixed {
            Some(map) => map.get(name).cloned(),
            None => std::env::var(name).ok(),
        }
    }

    /// Look up the first of several variables that is set.
    pub fn first_of(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|n| self.var(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_env_reads_cargo_manifest_dir() {
        assert!(Env::real().var("CARGO_MANIFEST_DIR").is_some());
    }

    #[test]
    fn mock_env_only_sees_fixed_values() {
        let env = Env::mock([("A", "1")]);
        assert_eq!(env.var("A").as_deref(), Some("1"));
        assert!(env.var("CARGO_MANIFEST_DIR").is_none());
    }

    #[test]
    fn first_of_prefers_earlier_names() {
        let env = Env::mock([("PRIMARY", "p"), ("FALLBACK", "f")]);
        assert_eq!(
            env.first_of(&["PRIMARY", "FALLBACK"]).as_deref(),
            Some("p")
        );
        assert_eq!(
            env.first_of(&["MISSING", "FALLBACK"]).as_deref(),
            Some("f")
        );
        assert!(env.first_of(&["MISSING", "ALSO_MISSING"]).is_none());
    }
}
