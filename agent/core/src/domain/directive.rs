// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::fmt;

/// Instruction decoded from a successful heartbeat response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Keep heartbeating (`ok`)
    Continue,

    /// Schedule an OS shutdown and stop the agent (`shutdown`)
    Shutdown,

    /// A command this agent does not understand; handled as `Continue`
    Unknown(String),
}

impl Directive {
    /// Decode the manager's `command` field. A missing command is unknown.
    pub fn from_command(command: Option<&str>) -> Self {
        match command.map(str::trim) {
            Some("ok") => Directive::Continue,
            Some("shutdown") => Directive::Shutdown,
            Some(other) => Directive::Unknown(other.to_string()),
            None => Directive::Unknown(String::new()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Directive::Continue => "continue",
            Directive::Shutdown => "shutdown",
            Directive::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Unknown(raw) => write!(f, "unknown({:?})", raw),
            other => f.write_str(other.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_commands() {
        assert_eq!(Directive::from_command(Some("ok")), Directive::Continue);
        assert_eq!(Directive::from_command(Some("shutdown")), Directive::Shutdown);
    }

    #[test]
    fn test_unrecognized_commands_are_preserved() {
        assert_eq!(
            Directive::from_command(Some("reboot")),
            Directive::Unknown("reboot".to_string())
        );
        assert_eq!(
            Directive::from_command(Some("SHUTDOWN")),
            Directive::Unknown("SHUTDOWN".to_string())
        );
        assert_eq!(Directive::from_command(None), Directive::Unknown(String::new()));
    }
}
