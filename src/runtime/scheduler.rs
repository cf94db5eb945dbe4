use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::error::BlockError;
use crate::runtime::chain::{Chain, ChainState};
use crate::runtime::scope::Scope;
use crate::runtime::signal::Signal;

/// A chain that reached `Stopped` or `Failed` during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub chain: String,
    pub state: ChainState,
}

impl Transition {
    pub fn new(chain: &str, state: ChainState) -> Self {
        Self {
            chain: chain.to_string(),
            state,
        }
    }
}

/// Cooperative round-robin driver: one quantum per runnable chain per tick,
/// in registration order.
#[derive(Debug)]
pub struct Scheduler {
    node: Uuid,
    tick: u64,
    injected: Vec<(String, BlockError)>,
}

impl Scheduler {
    pub fn new(node: Uuid) -> Self {
        Self {
            node,
            tick: 0,
            injected: Vec::new(),
        }
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Queues a failure for `chain`, applied at the start of the next tick.
    pub(crate) fn inject_failure(&mut self, chain: &str, error: BlockError) {
        self.injected.push((chain.to_string(), error));
    }

    pub(crate) fn forget(&mut self, chain: &str) {
        self.injected.retain(|(name, _)| name != chain);
    }

    pub(crate) fn tick(&mut self, chains: &mut [Chain], global: &mut Scope) -> Vec<Transition> {
        self.tick += 1;
        let mut transitions = Vec::new();

        for (name, error) in std::mem::take(&mut self.injected) {
            if let Some(chain) = chains.iter_mut().find(|c| c.name() == name) {
                if chain.inject_failure(error) {
                    transitions.push(Transition::new(&name, ChainState::Failed));
                }
            }
        }

        let mut signals = Vec::new();
        for index in 0..chains.len() {
            let chain = &mut chains[index];
            if !chain.state().is_runnable() {
                continue;
            }

            let state = chain.run_quantum(self.tick, global, &mut signals);
            if state.is_terminal() {
                transitions.push(Transition::new(chain.name(), state));
            }

            for signal in signals.drain(..) {
                self.apply(chains, signal, &mut transitions);
            }
        }

        debug!(node = %self.node, tick = self.tick, finished = transitions.len(), "Tick complete");
        transitions
    }

    fn apply(&self, chains: &mut [Chain], signal: Signal, transitions: &mut Vec<Transition>) {
        let Some(chain) = chains.iter_mut().find(|c| c.name() == signal.target()) else {
            warn!(node = %self.node, chain = signal.target(), "Signal for unknown chain dropped");
            return;
        };
        match signal {
            Signal::Stop(name) => {
                if chain.stop() {
                    info!(node = %self.node, chain = %name, "Chain stopped by signal");
                    transitions.push(Transition::new(&name, ChainState::Stopped));
                }
            }
            Signal::Restart(name) => {
                info!(node = %self.node, chain = %name, "Chain restarted by signal");
                chain.reset();
            }
        }
    }
}
