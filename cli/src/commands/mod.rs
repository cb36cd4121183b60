// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the fleet agent CLI

pub mod config;
pub mod credential;
pub mod run;
pub mod service;

pub use self::config::ConfigCommand;
pub use self::credential::CredentialCommand;
pub use self::service::ServiceCommand;
