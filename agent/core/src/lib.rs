// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Fleet Agent Core
//!
//! Credential lifecycle and heartbeat state machine for an endpoint agent that
//! keeps a trusted identity with a remote fleet manager.
//!
//! # Architecture
//!
//! - **domain:** identity, credential, directive and outcome types plus the
//!   capability traits (`CredentialStore`, `RegistrationClient`,
//!   `HeartbeatClient`, `NotificationSink`, `PlatformShutdown`, `Autostart`)
//! - **application:** `CommandHandler`, `Ticker` and the `AgentLoop` scheduler
//! - **infrastructure:** HTTP manager client, credential store media and the
//!   OS collaborators (shutdown, notifications)

pub mod application;
pub mod domain;
pub mod infrastructure;
