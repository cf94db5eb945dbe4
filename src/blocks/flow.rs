use crate::error::{Error, Result};
use crate::runtime::block::{ActivateResult, Block, BlockDescriptor, ParamInfo};
use crate::runtime::context::Context;
use crate::value::{TypeSet, Value, ValueType};

/// Suspends the chain for `Ticks` ticks, then passes its input through.
#[derive(Debug)]
pub struct Pause {
    ticks: i64,
    remaining: Option<i64>,
}

impl Default for Pause {
    fn default() -> Self {
        Self {
            ticks: 1,
            remaining: None,
        }
    }
}

impl Pause {
    pub fn descriptor() -> BlockDescriptor {
        BlockDescriptor::new("Pause", TypeSet::ANY, TypeSet::ANY)
            .help("Yields to the scheduler for a number of ticks.")
            .param(ParamInfo::new("Ticks", "Ticks to wait before resuming.", ValueType::Int, Value::Int(1)))
    }
}

impl Block for Pause {
    fn set_param(&mut self, index: usize, value: &Value) -> Result<()> {
        match value.as_int() {
            Some(ticks) if ticks >= 0 => {
                self.ticks = ticks;
                Ok(())
            }
            _ => Err(Error::InvalidParam {
                block: "Pause".to_string(),
                index,
                message: format!("expected a non-negative tick count, got {value}"),
            }),
        }
    }

    fn compose(&self, input: TypeSet) -> Option<TypeSet> {
        Some(input)
    }

    fn activate(&mut self, _ctx: &mut Context, input: &Value) -> ActivateResult {
        let remaining = self.remaining.get_or_insert(self.ticks);
        if *remaining > 0 {
            *remaining -= 1;
            return ActivateResult::Suspend;
        }
        self.remaining = None;
        ActivateResult::Produced(input.clone())
    }

    fn cleanup(&mut self) {
        self.remaining = None;
    }
}

/// Stops its chain; the input becomes the chain output.
#[derive(Debug, Default)]
pub struct Stop;

impl Stop {
    pub fn descriptor() -> BlockDescriptor {
        BlockDescriptor::new("Stop", TypeSet::ANY, TypeSet::ANY).help("Stops the chain, keeping the input as its output.")
    }
}

impl Block for Stop {
    fn activate(&mut self, _ctx: &mut Context, _input: &Value) -> ActivateResult {
        ActivateResult::Stop
    }
}

/// Rewinds its chain to the first block.
#[derive(Debug, Default)]
pub struct Restart;

impl Restart {
    pub fn descriptor() -> BlockDescriptor {
        BlockDescriptor::new("Restart", TypeSet::ANY, TypeSet::ANY)
            .help("Restarts the chain from the first block on the next tick.")
    }
}

impl Block for Restart {
    fn activate(&mut self, _ctx: &mut Context, _input: &Value) -> ActivateResult {
        ActivateResult::Restart
    }
}

/// Discards its input and hands the chain input to the next block.
#[derive(Debug, Default)]
pub struct Rebase;

impl Rebase {
    pub fn descriptor() -> BlockDescriptor {
        BlockDescriptor::new("Rebase", TypeSet::ANY, TypeSet::ANY)
            .help("Feeds the chain input to the next block.")
    }
}

impl Block for Rebase {
    fn activate(&mut self, _ctx: &mut Context, _input: &Value) -> ActivateResult {
        ActivateResult::Rebase
    }
}

/// Fails its chain with a `Kind` and `Message`.
#[derive(Debug)]
pub struct Fail {
    kind: String,
    message: String,
}

impl Default for Fail {
    fn default() -> Self {
        Self {
            kind: "Failure".to_string(),
            message: String::new(),
        }
    }
}

impl Fail {
    pub fn descriptor() -> BlockDescriptor {
        BlockDescriptor::new("Fail", TypeSet::ANY, TypeSet::ANY)
            .help("Fails the chain with the given error.")
            .param(ParamInfo::new("Kind", "Error kind.", ValueType::String, Value::from("Failure")))
            .param(ParamInfo::new("Message", "Error message.", ValueType::String, Value::from("")))
    }
}

impl Block for Fail {
    fn set_param(&mut self, index: usize, value: &Value) -> Result<()> {
        let text = value.as_str().unwrap_or_default().to_string();
        match index {
            0 => self.kind = text,
            _ => self.message = text,
        }
        Ok(())
    }

    fn activate(&mut self, _ctx: &mut Context, input: &Value) -> ActivateResult {
        let message = if self.message.is_empty() {
            format!("failed on input {input}")
        } else {
            self.message.clone()
        };
        ActivateResult::error(&self.kind, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainAction {
    Stop,
    Restart,
}

/// Signals another chain of the node (or its own chain when `Chain` is left
/// unset) and passes the input through.
#[derive(Debug)]
pub struct ChainControl {
    action: ChainAction,
    target: Option<String>,
}

impl ChainControl {
    pub fn new(action: ChainAction) -> Self {
        Self { action, target: None }
    }

    pub fn descriptor(action: ChainAction) -> BlockDescriptor {
        let (name, help) = match action {
            ChainAction::Stop => ("Chain.Stop", "Stops a chain of this node."),
            ChainAction::Restart => ("Chain.Restart", "Resets a chain of this node to idle."),
        };
        BlockDescriptor::new(name, TypeSet::ANY, TypeSet::ANY).help(help).param(ParamInfo::new(
            "Chain",
            "Target chain name; defaults to the running chain.",
            ValueType::String | ValueType::None,
            Value::None,
        ))
    }
}

impl Block for ChainControl {
    fn set_param(&mut self, _index: usize, value: &Value) -> Result<()> {
        self.target = value.as_str().map(str::to_string);
        Ok(())
    }

    fn compose(&self, input: TypeSet) -> Option<TypeSet> {
        Some(input)
    }

    fn activate(&mut self, ctx: &mut Context, input: &Value) -> ActivateResult {
        let target = self.target.clone().unwrap_or_else(|| ctx.chain_name().to_string());
        match self.action {
            ChainAction::Stop => ctx.stop_chain(&target),
            ChainAction::Restart => ctx.restart_chain(&target),
        }
        ActivateResult::Produced(input.clone())
    }
}
