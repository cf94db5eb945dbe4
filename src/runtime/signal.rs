/// Control request a block raises against a chain of its node.
///
/// Signals are queued during `activate` and applied by the scheduler once
/// the raising block returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Halt the target chain at its terminal sentinel.
    Stop(String),
    /// Reset the target chain to `Idle`, keeping its variables.
    Restart(String),
}

impl Signal {
    pub fn target(&self) -> &str {
        match self {
            Signal::Stop(name) | Signal::Restart(name) => name,
        }
    }
}
