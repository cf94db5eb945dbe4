use std::fmt::Debug;
use std::sync::Arc;
use crate::error::{BlockError, Error, Result};
use crate::runtime::context::Context;
use crate::value::{TypeSet, Value};

/// Outcome of one `activate` call.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivateResult {
    /// Normal output; the chain advances to the next block.
    Produced(Value),
    /// Yield to the scheduler without advancing. The block is re-entered with
    /// the same input on the next tick.
    Suspend,
    /// Halt the chain at its terminal sentinel.
    Stop,
    /// Rewind the chain to block 0, keeping its variables.
    Restart,
    /// Continue the pass, feeding the chain input to the next block.
    Rebase,
    Error(BlockError),
}

impl ActivateResult {
    pub fn error(kind: &str, message: impl Into<String>) -> Self {
        ActivateResult::Error(BlockError::new(kind, message))
    }
}

impl From<Result<Value>> for ActivateResult {
    fn from(result: Result<Value>) -> Self {
        match result {
            Ok(v) => ActivateResult::Produced(v),
            Err(e) => ActivateResult::Error(e.into()),
        }
    }
}

/// Executable block contract.
pub trait Block: Send + Debug {
    /// Receives a parameter value already checked against the descriptor's
    /// accepted types.
    fn set_param(&mut self, _index: usize, _value: &Value) -> Result<()> {
        Ok(())
    }

    /// Output types for the given input types, when they are narrower than
    /// the descriptor's declaration.
    fn compose(&self, _input: TypeSet) -> Option<TypeSet> {
        None
    }

    /// Called when the owning chain starts or restarts.
    fn warmup(&mut self, _ctx: &mut Context) -> std::result::Result<(), BlockError> {
        Ok(())
    }

    fn activate(&mut self, ctx: &mut Context, input: &Value) -> ActivateResult;

    /// Drops transient state. Called on restart, stop, failure and drop.
    fn cleanup(&mut self) {}
}

#[derive(Debug, Clone)]
pub struct ParamInfo {
    pub name: String,
    pub help: String,
    pub types: TypeSet,
    pub default: Value,
    pub required: bool,
}

impl ParamInfo {
    pub fn new(name: &str, help: &str, types: impl Into<TypeSet>, default: Value) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            types: types.into(),
            default,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Static description of a block kind, registered once.
#[derive(Debug, Clone)]
pub struct BlockDescriptor {
    pub name: String,
    pub help: String,
    pub input: TypeSet,
    pub output: TypeSet,
    pub params: Vec<ParamInfo>,
}

impl BlockDescriptor {
    pub fn new(name: &str, input: impl Into<TypeSet>, output: impl Into<TypeSet>) -> Self {
        Self {
            name: name.to_string(),
            help: String::new(),
            input: input.into(),
            output: output.into(),
            params: Vec::new(),
        }
    }

    pub fn help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    pub fn param(mut self, param: ParamInfo) -> Self {
        self.params.push(param);
        self
    }

    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }
}

/// A block bound into a chain: descriptor, bound parameters and the block's
/// private state.
#[derive(Debug)]
pub struct BlockInstance {
    descriptor: Arc<BlockDescriptor>,
    params: Vec<Value>,
    bound: Vec<bool>,
    block: Box<dyn Block>,
}

impl BlockInstance {
    pub(crate) fn new(descriptor: Arc<BlockDescriptor>, mut block: Box<dyn Block>) -> Result<Self> {
        let mut params = Vec::with_capacity(descriptor.params.len());
        for (index, info) in descriptor.params.iter().enumerate() {
            if info.types.contains(info.default.value_type()) {
                block.set_param(index, &info.default)?;
            }
            params.push(info.default.clone());
        }
        let bound = vec![false; params.len()];
        Ok(Self {
            descriptor,
            params,
            bound,
            block,
        })
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &BlockDescriptor {
        &self.descriptor
    }

    pub fn param(&self, index: usize) -> Option<&Value> {
        self.params.get(index)
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn set_param(&mut self, index: usize, value: Value) -> Result<()> {
        let info = self.descriptor.params.get(index).ok_or_else(|| Error::ParamIndexOutOfRange {
            block: self.descriptor.name.clone(),
            index,
            count: self.descriptor.params.len(),
        })?;
        if !info.types.contains(value.value_type()) {
            return Err(Error::mismatch(info.types, value.value_type()));
        }
        self.block.set_param(index, &value)?;
        self.params[index] = value;
        self.bound[index] = true;
        Ok(())
    }

    pub fn set_param_named(&mut self, name: &str, value: Value) -> Result<()> {
        let index = self.descriptor.param_index(name).ok_or_else(|| Error::UnknownParam {
            block: self.descriptor.name.clone(),
            name: name.to_string(),
        })?;
        self.set_param(index, value)
    }

    /// First required parameter that was never bound explicitly.
    pub fn missing_required(&self) -> Option<&ParamInfo> {
        self.descriptor
            .params
            .iter()
            .zip(&self.bound)
            .find(|(info, bound)| info.required && !**bound)
            .map(|(info, _)| info)
    }

    pub fn output_types(&self, input: TypeSet) -> TypeSet {
        self.block.compose(input).unwrap_or(self.descriptor.output)
    }

    pub(crate) fn warmup(&mut self, ctx: &mut Context) -> std::result::Result<(), BlockError> {
        self.block.warmup(ctx)
    }

    pub(crate) fn activate(&mut self, ctx: &mut Context, input: &Value) -> ActivateResult {
        self.block.activate(ctx, input)
    }

    pub(crate) fn cleanup(&mut self) {
        self.block.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    #[derive(Debug, Default)]
    struct Probe {
        seen: Vec<Value>,
    }

    impl Block for Probe {
        fn set_param(&mut self, _index: usize, value: &Value) -> Result<()> {
            self.seen.push(value.clone());
            Ok(())
        }

        fn activate(&mut self, _ctx: &mut Context, input: &Value) -> ActivateResult {
            ActivateResult::Produced(input.clone())
        }
    }

    fn descriptor() -> Arc<BlockDescriptor> {
        Arc::new(
            BlockDescriptor::new("Probe", TypeSet::ANY, TypeSet::ANY)
                .param(ParamInfo::new("Amount", "", ValueType::Int, Value::Int(1)))
                .param(ParamInfo::new("Label", "", ValueType::String, Value::None).required()),
        )
    }

    #[test]
    fn test_defaults_and_binding() {
        let mut instance = BlockInstance::new(descriptor(), Box::new(Probe::default())).unwrap();
        assert_eq!(instance.param(0), Some(&Value::Int(1)));
        assert_eq!(instance.missing_required().map(|p| p.name.as_str()), Some("Label"));

        instance.set_param_named("Label", Value::from("x")).unwrap();
        assert!(instance.missing_required().is_none());
    }

    #[test]
    fn test_param_validation() {
        let mut instance = BlockInstance::new(descriptor(), Box::new(Probe::default())).unwrap();

        let err = instance.set_param(2, Value::Int(1)).unwrap_err();
        assert!(matches!(err, Error::ParamIndexOutOfRange { index: 2, count: 2, .. }));

        let err = instance.set_param(0, Value::from("ten")).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { found: ValueType::String, .. }));
        assert_eq!(instance.param(0), Some(&Value::Int(1)));

        let err = instance.set_param_named("Nope", Value::None).unwrap_err();
        assert!(matches!(err, Error::UnknownParam { .. }));
    }
}
