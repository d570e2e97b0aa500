use std::fmt;

/// Identifies the running binary in `tally_cli version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub target: &'static str,
}

pub fn current() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("TALLY_COMMIT").unwrap_or("unknown"),
        target: option_env!("TALLY_TARGET").unwrap_or("unknown"),
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tally {} ({}, {})", self.version, self.commit, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_version_commit_and_target() {
        let info = BuildInfo {
            version: "0.1.0",
            commit: "abc1234-dirty",
            target: "x86_64-unknown-linux-gnu",
        };
        assert_eq!(
            info.to_string(),
            "tally 0.1.0 (abc1234-dirty, x86_64-unknown-linux-gnu)"
        );
        assert_eq!(current().version, env!("CARGO_PKG_VERSION"));
    }
}
