//! Client configuration

use std::time::Duration;

use shared::request::Operator;

/// How often each kind of view re-reads the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    /// Kitchen display queue
    pub kitchen: Duration,
    /// Generic order lists
    pub orders: Duration,
    /// Customer-facing display for one table
    pub table: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            kitchen: Duration::from_secs(5),
            orders: Duration::from_secs(10),
            table: Duration::from_secs(2),
        }
    }
}

/// Terminal configuration for talking to the brew server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:3000")
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,

    pub terminal_id: String,
    pub terminal_name: String,
    pub user_id: String,
    pub user_name: String,

    pub poll: PollIntervals,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
            terminal_id: "terminal-1".to_string(),
            terminal_name: "Register".to_string(),
            user_id: String::new(),
            user_name: String::new(),
            poll: PollIntervals::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_terminal(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.terminal_id = id.into();
        self.terminal_name = name.into();
        self
    }

    pub fn with_user(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.user_id = id.into();
        self.user_name = name.into();
        self
    }

    pub fn with_poll_intervals(mut self, poll: PollIntervals) -> Self {
        self.poll = poll;
        self
    }

    /// The signed-in user as the actor of commands
    pub fn operator(&self) -> Operator {
        Operator::new(self.user_id.clone(), self.user_name.clone())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_poll_intervals() {
        let poll = ClientConfig::default().poll;
        assert_eq!(poll.kitchen, Duration::from_secs(5));
        assert_eq!(poll.orders, Duration::from_secs(10));
        assert_eq!(poll.table, Duration::from_secs(2));
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("http://pos.local:3000")
            .with_terminal("term-2", "Counter 2")
            .with_user("u-9", "Ravi")
            .with_timeout(Duration::from_secs(3));
        assert_eq!(config.terminal_id, "term-2");
        assert_eq!(config.timeout, Duration::from_secs(3));
        let operator = config.operator();
        assert_eq!(operator.operator_id, "u-9");
        assert!(operator.command_id.is_none());
    }
}
