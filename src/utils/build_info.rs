/// Build metadata stamped by `build.rs`.
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub git_status: &'static str,
    pub timestamp: &'static str,
    pub profile: &'static str,
    pub rustc: &'static str,
}

pub fn current() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("HABIT_CORE_BUILD_HASH").unwrap_or("unknown"),
        git_status: option_env!("HABIT_CORE_BUILD_STATUS").unwrap_or("unknown"),
        timestamp: option_env!("HABIT_CORE_BUILD_TIMESTAMP").unwrap_or("unknown"),
        profile: option_env!("HABIT_CORE_BUILD_PROFILE").unwrap_or("unknown"),
        rustc: option_env!("HABIT_CORE_BUILD_RUSTC").unwrap_or("unknown"),
    }
}

impl BuildInfo {
    /// One-line summary printed by `habit_core_cli version`.
    pub fn summary(&self) -> String {
        format!(
            "habit_core {} ({} {}, {} build, {})",
            self.version, self.git_hash, self.git_status, self.profile, self.timestamp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_starts_with_package_version() {
        let info = current();
        assert!(info
            .summary()
            .starts_with(&format!("habit_core {}", env!("CARGO_PKG_VERSION"))));
    }
}
