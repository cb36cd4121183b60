// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! OS capability interfaces consumed by the core.
//!
//! | Trait | Implementations |
//! |-------|----------------|
//! | `NotificationSink` | `DesktopNotifier`, `LogNotifier` |
//! | `PlatformShutdown` | `CommandShutdown` |
//! | `Autostart` | `ServiceAutostart` (CLI crate) |

/// Best-effort user-facing message.
///
/// Called from the blocking pool; implementations may block but must not
/// panic, and their failures are only logged.
pub trait NotificationSink: Send + Sync {
    fn show(&self, message: &str, title: &str) -> Result<(), PlatformError>;
}

/// OS-level shutdown scheduling.
///
/// Fire-and-forget: implementations start the request and return without
/// waiting for it to complete.
pub trait PlatformShutdown: Send + Sync {
    fn schedule(&self, delay_seconds: u64, message: &str) -> Result<(), PlatformError>;
}

/// Start-on-boot registration, invoked once at startup.
pub trait Autostart: Send + Sync {
    fn register(&self) -> Result<(), PlatformError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{program}' failed: {stderr}")]
    CommandFailed { program: String, stderr: String },

    #[error("Not supported on this platform: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
