//! Output target configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// ECMAScript edition to emit. Ordered oldest to newest, so
/// `target < Target::ES2015` means "arrows must be lowered".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    ES5,
    ES2015,
    ES2016,
    ES2017,
    ES2018,
    ES2019,
    ES2020,
    #[default]
    ESNext,
}

impl Target {
    pub const ALL: [Target; 8] = [
        Target::ES5,
        Target::ES2015,
        Target::ES2016,
        Target::ES2017,
        Target::ES2018,
        Target::ES2019,
        Target::ES2020,
        Target::ESNext,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Target::ES5 => "es5",
            Target::ES2015 => "es2015",
            Target::ES2016 => "es2016",
            Target::ES2017 => "es2017",
            Target::ES2018 => "es2018",
            Target::ES2019 => "es2019",
            Target::ES2020 => "es2020",
            Target::ESNext => "esnext",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized target name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown target '{0}' (expected one of es5, es2015..es2020, esnext)")]
pub struct UnknownTarget(pub String);

impl FromStr for Target {
    type Err = UnknownTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let normalized = match lower.as_str() {
            "es6" => "es2015",
            "es7" => "es2016",
            other => other,
        };
        Target::ALL
            .into_iter()
            .find(|target| target.as_str() == normalized)
            .ok_or_else(|| UnknownTarget(s.to_string()))
    }
}

/// Settings for the resolution/lowering pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TargetConfig {
    pub target: Target,
    /// Assign short names to local bindings.
    pub minify: bool,
    /// Also mangle module-scope bindings that are not exported.
    pub mangle_top_level: bool,
}

impl TargetConfig {
    /// Create a config for a target with minification off.
    pub fn new(target: Target) -> Self {
        Self { target, ..Self::default() }
    }

    #[must_use]
    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    #[must_use]
    pub fn with_mangle_top_level(mut self, mangle_top_level: bool) -> Self {
        self.mangle_top_level = mangle_top_level;
        self
    }

    /// Whether syntax introduced in `edition` must be rewritten.
    pub fn lowers(&self, edition: Target) -> bool {
        self.target < edition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_ordering() {
        assert!(Target::ES5 < Target::ES2015);
        assert!(Target::ES2020 < Target::ESNext);
        assert!(TargetConfig::new(Target::ES5).lowers(Target::ES2015));
        assert!(!TargetConfig::new(Target::ES2015).lowers(Target::ES2015));
    }

    #[test]
    fn test_target_from_str() {
        assert_eq!("ES5".parse::<Target>(), Ok(Target::ES5));
        assert_eq!("es6".parse::<Target>(), Ok(Target::ES2015));
        assert!("es1999".parse::<Target>().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = TargetConfig::new(Target::ES2017).with_minify(true);
        assert!(config.minify);
        assert!(!config.mangle_top_level);
        assert_eq!(config.target, Target::ES2017);
    }
}
