// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Portico.
//!
//! Mounts the routes of every enabled plugin under `/{plugin}` and hands each
//! request to the controller action bound to the route's handler name.

pub mod controller;
pub mod handlers;
pub mod server;

pub use controller::{Action, ControllerTable, RegistryBinding, ServiceSource, WelcomeController};
pub use handlers::REQUEST_ID_HEADER;
pub use server::{build_router, start_server, HealthState, ServerConfig};
