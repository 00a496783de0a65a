use std::fmt::Write;

use miette::Result;

/// `esdown <version>`, plus the git hash when the build provided one.
#[must_use]
pub fn version_string() -> String {
    let mut s = format!("esdown {}", esdown_parser::VERSION);

    if let Some(hash) = option_env!("ESDOWN_BUILD_GIT_HASH") {
        let _ = write!(s, " ({hash})");
    }

    s
}

pub fn run() -> Result<()> {
    println!("{}", version_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_string_contains_version() {
        let vs = version_string();
        assert!(vs.starts_with("esdown "));
        assert!(vs.contains(esdown_parser::VERSION));
    }
}
