// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Directive dispatch.
//!
//! `Shutdown` is the only directive with side effects: a notification that is
//! handed to the blocking pool and never awaited, and a fire-and-forget OS
//! shutdown request. Neither side effect can reach credential state.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::directive::Directive;
use crate::domain::node_config::ShutdownConfig;
use crate::domain::platform::{NotificationSink, PlatformShutdown};

/// What the loop does after a directive has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Proceed,
    Terminate,
}

pub struct CommandHandler {
    settings: ShutdownConfig,
    notifier: Arc<dyn NotificationSink>,
    shutdown: Arc<dyn PlatformShutdown>,
}

impl CommandHandler {
    pub fn new(
        settings: ShutdownConfig,
        notifier: Arc<dyn NotificationSink>,
        shutdown: Arc<dyn PlatformShutdown>,
    ) -> Self {
        Self {
            settings,
            notifier,
            shutdown,
        }
    }

    pub fn handle(&self, directive: &Directive) -> LoopControl {
        match directive {
            Directive::Continue => {
                info!("Heartbeat OK");
                LoopControl::Proceed
            }
            Directive::Unknown(raw) => {
                warn!(command = %raw, "Unknown command from manager; continuing");
                LoopControl::Proceed
            }
            Directive::Shutdown => {
                info!(delay_seconds = self.settings.delay_seconds, "Shutdown command received");
                self.notify(shutdown_notice(self.settings.delay_seconds));

                if let Err(e) = self
                    .shutdown
                    .schedule(self.settings.delay_seconds, &self.settings.message)
                {
                    warn!(error = %e, "Failed to schedule OS shutdown");
                }

                LoopControl::Terminate
            }
        }
    }

    fn notify(&self, message: String) {
        let notifier = self.notifier.clone();
        let title = self.settings.notification_title.clone();

        tokio::task::spawn_blocking(move || {
            if let Err(e) = notifier.show(&message, &title) {
                warn!(error = %e, "Failed to display notification");
            }
        });
    }
}

/// User-facing text announcing the pending shutdown.
pub fn shutdown_notice(delay_seconds: u64) -> String {
    if delay_seconds < 60 {
        format!("The computer will shut down in {} second(s).", delay_seconds)
    } else {
        format!("The computer will shut down in {} minute(s).", delay_seconds / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::platform::PlatformError;
    use parking_lot::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct ChannelNotifier(mpsc::UnboundedSender<(String, String)>);

    impl NotificationSink for ChannelNotifier {
        fn show(&self, message: &str, title: &str) -> Result<(), PlatformError> {
            let _ = self.0.send((message.to_string(), title.to_string()));
            Ok(())
        }
    }

    struct FailingNotifier;

    impl NotificationSink for FailingNotifier {
        fn show(&self, _message: &str, _title: &str) -> Result<(), PlatformError> {
            Err(PlatformError::Unsupported("no desktop".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingShutdown {
        calls: Mutex<Vec<(u64, String)>>,
        fail: bool,
    }

    impl PlatformShutdown for RecordingShutdown {
        fn schedule(&self, delay_seconds: u64, message: &str) -> Result<(), PlatformError> {
            self.calls.lock().push((delay_seconds, message.to_string()));
            if self.fail {
                return Err(PlatformError::CommandFailed {
                    program: "shutdown".to_string(),
                    stderr: "access denied".to_string(),
                });
            }
            Ok(())
        }
    }

    fn settings() -> ShutdownConfig {
        ShutdownConfig {
            delay_seconds: 600,
            message: "Remote shutdown initiated by the manager.".to_string(),
            notification_title: "Remote Shutdown".to_string(),
        }
    }

    #[tokio::test]
    async fn test_continue_and_unknown_have_no_side_effects() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(RecordingShutdown::default());
        let handler = CommandHandler::new(settings(), Arc::new(ChannelNotifier(tx)), shutdown.clone());

        assert_eq!(handler.handle(&Directive::Continue), LoopControl::Proceed);
        assert_eq!(
            handler.handle(&Directive::Unknown("reboot".to_string())),
            LoopControl::Proceed
        );

        assert!(shutdown.calls.lock().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_shutdown_notifies_and_schedules_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(RecordingShutdown::default());
        let handler = CommandHandler::new(settings(), Arc::new(ChannelNotifier(tx)), shutdown.clone());

        assert_eq!(handler.handle(&Directive::Shutdown), LoopControl::Terminate);

        let calls = shutdown.calls.lock().clone();
        assert_eq!(calls, vec![(600, "Remote shutdown initiated by the manager.".to_string())]);

        let (message, title) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(message, "The computer will shut down in 10 minute(s).");
        assert_eq!(title, "Remote Shutdown");
    }

    #[tokio::test]
    async fn test_shutdown_terminates_even_when_side_effects_fail() {
        let shutdown = Arc::new(RecordingShutdown {
            fail: true,
            ..Default::default()
        });
        let handler = CommandHandler::new(settings(), Arc::new(FailingNotifier), shutdown.clone());

        assert_eq!(handler.handle(&Directive::Shutdown), LoopControl::Terminate);
        assert_eq!(shutdown.calls.lock().len(), 1);
    }

    #[test]
    fn test_notice_wording() {
        assert_eq!(shutdown_notice(60), "The computer will shut down in 1 minute(s).");
        assert_eq!(shutdown_notice(30), "The computer will shut down in 30 second(s).");
    }
}
