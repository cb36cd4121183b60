// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod agent_loop;
pub mod command_handler;
pub mod scheduler;

pub use agent_loop::{AgentLoop, CycleOutcome, LoopExit};
pub use command_handler::{CommandHandler, LoopControl};
pub use scheduler::{IntervalTicker, Ticker};
