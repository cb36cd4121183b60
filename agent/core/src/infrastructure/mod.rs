// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure adapters.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** HTTP manager client, credential store media and OS
//!   collaborators behind the domain traits

pub mod credential_store;
pub mod manager_client;
pub mod platform;

pub use manager_client::HttpManagerClient;
