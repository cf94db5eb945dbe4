use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::error::BlockError;
use crate::runtime::block::{ActivateResult, BlockInstance};
use crate::runtime::context::Context;
use crate::runtime::scope::Scope;
use crate::runtime::signal::Signal;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChainState {
    Idle,
    Running,
    Suspended,
    Stopped,
    Failed,
}

impl ChainState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ChainState::Stopped | ChainState::Failed)
    }

    /// Whether the scheduler gives the chain a quantum.
    pub fn is_runnable(self) -> bool {
        !self.is_terminal()
    }
}

/// Ordered sequence of block instances with its own variable scope.
///
/// `cursor` is the index of the next block to run; `blocks.len()` is the
/// terminal sentinel.
#[derive(Debug)]
pub struct Chain {
    id: Uuid,
    name: String,
    blocks: Vec<BlockInstance>,
    scope: Scope,
    cursor: usize,
    state: ChainState,
    input: Value,
    /// Input of the block under the cursor.
    carry: Value,
    output: Value,
    error: Option<BlockError>,
    looped: bool,
    warmed: bool,
}

impl Chain {
    pub(crate) fn new(name: &str, blocks: Vec<BlockInstance>, input: Value, looped: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            blocks,
            scope: Scope::new(),
            cursor: 0,
            state: ChainState::Idle,
            input,
            carry: Value::None,
            output: Value::None,
            error: None,
            looped,
            warmed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn is_looped(&self) -> bool {
        self.looped
    }

    pub fn input(&self) -> &Value {
        &self.input
    }

    /// Value produced by the last completed pass, or the input of the block
    /// that stopped the chain.
    pub fn output(&self) -> &Value {
        &self.output
    }

    pub fn error(&self) -> Option<&BlockError> {
        self.error.as_ref()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    pub fn blocks(&self) -> &[BlockInstance] {
        &self.blocks
    }

    pub fn block_names(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.name()).collect()
    }

    /// Runs until the chain suspends, stops, fails, restarts or completes one
    /// full pass. Returns the resulting state.
    pub(crate) fn run_quantum(&mut self, tick: u64, global: &mut Scope, signals: &mut Vec<Signal>) -> ChainState {
        match self.state {
            ChainState::Idle => {
                info!(chain = %self.name, id = %self.id, "Chain started");
                self.state = ChainState::Running;
                self.cursor = 0;
                self.carry = self.input.clone();
            }
            ChainState::Suspended => self.state = ChainState::Running,
            ChainState::Running => {}
            ChainState::Stopped | ChainState::Failed => return self.state,
        }

        if !self.warmed {
            if let Err(e) = self.warmup(tick, global, signals) {
                self.fail(e);
                return self.state;
            }
        }

        loop {
            if self.cursor >= self.blocks.len() {
                self.output = std::mem::take(&mut self.carry);
                if self.looped {
                    self.cursor = 0;
                    self.carry = self.input.clone();
                    return self.state;
                }
                self.finish(ChainState::Stopped);
                return self.state;
            }

            let block = &mut self.blocks[self.cursor];
            let accepted = block.descriptor().input;
            if !accepted.contains(self.carry.value_type()) {
                let message = format!(
                    "block '{}' expects {} but received {}",
                    block.name(),
                    accepted,
                    self.carry.value_type()
                );
                self.fail(BlockError::new("TypeMismatch", message));
                return self.state;
            }

            debug!(chain = %self.name, block = block.name(), cursor = self.cursor, "Activating block");
            let pending = signals.len();
            let result = {
                let mut ctx = Context::new(&self.name, tick, &mut self.scope, global, signals);
                block.activate(&mut ctx, &self.carry)
            };

            match result {
                ActivateResult::Produced(value) => {
                    self.carry = value;
                    self.cursor += 1;
                }
                ActivateResult::Suspend => {
                    debug!(chain = %self.name, cursor = self.cursor, "Chain suspended");
                    self.state = ChainState::Suspended;
                    return self.state;
                }
                ActivateResult::Stop => {
                    self.output = self.carry.clone();
                    self.finish(ChainState::Stopped);
                    return self.state;
                }
                ActivateResult::Rebase => {
                    self.carry = self.input.clone();
                    self.cursor += 1;
                }
                ActivateResult::Restart => {
                    debug!(chain = %self.name, "Chain restarting");
                    self.rewind();
                    return self.state;
                }
                ActivateResult::Error(e) => {
                    self.fail(e);
                    return self.state;
                }
            }

            if signals[pending..].iter().any(|s| s.target() == self.name) {
                return self.state;
            }
        }
    }

    fn warmup(&mut self, tick: u64, global: &mut Scope, signals: &mut Vec<Signal>) -> Result<(), BlockError> {
        for block in &mut self.blocks {
            let mut ctx = Context::new(&self.name, tick, &mut self.scope, global, signals);
            block.warmup(&mut ctx)?;
        }
        self.warmed = true;
        Ok(())
    }

    fn cleanup(&mut self) {
        if self.warmed {
            for block in &mut self.blocks {
                block.cleanup();
            }
            self.warmed = false;
        }
    }

    /// Back to block 0 without leaving `Running`; blocks are warmed again on
    /// the next quantum.
    fn rewind(&mut self) {
        for block in &mut self.blocks {
            block.cleanup();
        }
        self.warmed = false;
        self.cursor = 0;
        self.carry = self.input.clone();
    }

    fn finish(&mut self, state: ChainState) {
        self.cleanup();
        if state == ChainState::Stopped {
            self.cursor = self.blocks.len();
        }
        self.state = state;
        info!(chain = %self.name, id = %self.id, state = ?state, "Chain finished");
    }

    fn fail(&mut self, error: BlockError) {
        warn!(chain = %self.name, cursor = self.cursor, kind = %error.kind, message = %error.message, "Chain failed");
        self.error = Some(error);
        self.finish(ChainState::Failed);
    }

    /// Halts a non-terminal chain. Returns whether the state changed.
    pub(crate) fn stop(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.output = std::mem::take(&mut self.carry);
        self.finish(ChainState::Stopped);
        true
    }

    /// Fails a non-terminal chain with an error injected from outside.
    pub(crate) fn inject_failure(&mut self, error: BlockError) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.fail(error);
        true
    }

    /// Back to `Idle`: cursor 0, output and error cleared, variables kept.
    pub(crate) fn reset(&mut self) {
        self.cleanup();
        self.state = ChainState::Idle;
        self.cursor = 0;
        self.carry = Value::None;
        self.output = Value::None;
        self.error = None;
    }
}

impl Drop for Chain {
    fn drop(&mut self) {
        self.cleanup();
    }
}
