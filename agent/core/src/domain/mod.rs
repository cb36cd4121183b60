// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain types and capability traits.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Identity, credential lifecycle, manager protocol outcomes
//!   and the interfaces infrastructure implements

pub mod credential;
pub mod directive;
pub mod heartbeat;
pub mod identity;
pub mod manager;
pub mod node_config;
pub mod platform;
pub mod registration;
pub mod store;
