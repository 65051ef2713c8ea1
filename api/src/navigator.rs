//! Navigation side effects triggered by the HTTP client.

use tokio::sync::mpsc;

/// Client-side routes the API layer can ask the application to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// The login screen, opened when the session is rejected
    Login,
}

impl Route {
    /// Path of the route in the application
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/account/login",
        }
    }
}

/// Receives navigation requests from the HTTP client
pub trait Navigator: Send + Sync {
    /// Ask the application to show `route`
    fn navigate(&self, route: Route);
}

/// Navigator that only records the request in the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, route: Route) {
        tracing::info!(path = route.path(), "Navigation requested");
    }
}

/// Navigator forwarding every request over an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    sender: mpsc::UnboundedSender<Route>,
}

impl ChannelNavigator {
    /// Creates a navigator and the receiver its requests arrive on
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Route>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, route: Route) {
        if self.sender.send(route).is_err() {
            tracing::warn!(path = route.path(), "Navigation dropped, receiver closed");
        }
    }
}
