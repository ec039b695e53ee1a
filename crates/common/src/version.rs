//! Build information reported by `minibin version` and `/_status/version`

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub name: String,
    pub version: String,
    pub build_profile: String,
    pub target_os: String,
    pub target_arch: String,
}

impl BuildInfo {
    pub fn new(name: &str, version: &str) -> Self {
        let build_profile = if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        };

        Self {
            name: name.to_string(),
            version: version.to_string(),
            build_profile: build_profile.to_string(),
            target_os: std::env::consts::OS.to_string(),
            target_arch: std::env::consts::ARCH.to_string(),
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}, {}-{})",
            self.name, self.version, self.build_profile, self.target_os, self.target_arch
        )
    }
}

/// Build info for the crate that invokes the macro, not for `common`
#[macro_export]
macro_rules! build_info {
    () => {
        $crate::version::BuildInfo::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    };
}
