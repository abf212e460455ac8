// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Portico plugin host.
//!
//! Holds the types every other crate in the workspace agrees on: the
//! per-request [`RequestContext`], the [`WelcomeService`] capability that
//! plugins expose, and the error types that flow from the registry through
//! controllers up to the gateway.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{PorticoError, ResolutionError};
pub use traits::{ServiceHandle, WelcomeService};
pub use types::{RequestContext, ResponseFormat};

/// Identifier of the built-in plugin that serves the welcome route.
pub const WELCOME_PLUGIN: &str = "my-plugin";

/// Identifier of the welcome service inside [`WELCOME_PLUGIN`].
pub const WELCOME_SERVICE: &str = "service";

/// Greeting returned by the built-in welcome service unless configured otherwise.
pub const DEFAULT_WELCOME_MESSAGE: &str = "Welcome to Portico 🚀";
