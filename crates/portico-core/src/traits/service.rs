// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The welcome service capability.

use std::sync::Arc;

/// Business logic behind the welcome route.
///
/// Implementations must not fail. Whatever string they return is written to
/// the response body verbatim, including the empty string.
pub trait WelcomeService: Send + Sync + 'static {
    /// Returns the greeting to send to the client.
    fn welcome_message(&self) -> String;
}

/// A live, shareable service instance as stored in the plugin registry.
pub type ServiceHandle = Arc<dyn WelcomeService>;

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    impl WelcomeService for Fixed {
        fn welcome_message(&self) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn handle_dispatches_dynamically() {
        let handle: ServiceHandle = Arc::new(Fixed("hi"));
        let cloned = Arc::clone(&handle);
        assert_eq!(handle.welcome_message(), "hi");
        assert_eq!(cloned.welcome_message(), "hi");
    }
}
