use std::time::Duration;
use serde::{Deserialize, Serialize};

/// Settings for driving a node with [`Node::run`](crate::runtime::node::Node::run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Delay between two ticks.
    pub tick_interval_ms: u64,
    /// Upper bound on ticks; `None` runs until no chain is runnable.
    pub max_ticks: Option<u64>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10,
            max_ticks: None,
        }
    }
}

impl NodeConfig {
    pub fn tick_interval(&self) -> Duration {
        // tokio's interval panics on a zero period
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    pub fn with_interval_ms(mut self, tick_interval_ms: u64) -> Self {
        self.tick_interval_ms = tick_interval_ms;
        self
    }
}
