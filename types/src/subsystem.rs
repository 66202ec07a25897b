use std::fmt;

use crate::CONFIG_SECTION;

/// One of the two optional services wired into the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subsystem {
    LanguageServer,
    DebugAdapter,
}

impl Subsystem {
    /// Launch order used by the coordinator.
    pub const ALL: [Subsystem; 2] = [Subsystem::LanguageServer, Subsystem::DebugAdapter];

    /// Human-readable name used in logs and errors.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LanguageServer => "language server",
            Self::DebugAdapter => "debug adapter",
        }
    }

    /// Key of this subsystem's table inside the `kotlin` configuration section.
    #[must_use]
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::LanguageServer => "languageServer",
            Self::DebugAdapter => "debugAdapter",
        }
    }

    /// What starting this subsystem is called in diagnostics
    /// ("activation" for the server, "registration" for the adapter).
    #[must_use]
    pub const fn launch_verb(self) -> &'static str {
        match self {
            Self::LanguageServer => "activation",
            Self::DebugAdapter => "registration",
        }
    }

    /// Fully qualified feature flag, e.g. `kotlin.languageServer.enabled`.
    #[must_use]
    pub fn enabled_flag(self) -> String {
        format!("{CONFIG_SECTION}.{}.enabled", self.config_key())
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
