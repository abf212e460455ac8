// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits exposed by plugins and consumed by controllers.

pub mod service;

pub use service::{ServiceHandle, WelcomeService};
