use tracing::info;
use crate::error::Result;
use crate::runtime::block::{ActivateResult, Block, BlockDescriptor, ParamInfo};
use crate::runtime::context::Context;
use crate::value::{TypeSet, Value, ValueType};

/// Emits its `Value` parameter, ignoring the input. `${var}` references are
/// resolved at activation.
#[derive(Debug, Default)]
pub struct Const {
    value: Value,
}

impl Const {
    pub fn descriptor() -> BlockDescriptor {
        BlockDescriptor::new("Const", TypeSet::ANY, TypeSet::ANY)
            .help("Outputs a constant value.")
            .param(ParamInfo::new("Value", "The value to output.", TypeSet::ANY, Value::None))
    }
}

impl Block for Const {
    fn set_param(&mut self, _index: usize, value: &Value) -> Result<()> {
        self.value = value.clone();
        Ok(())
    }

    fn compose(&self, _input: TypeSet) -> Option<TypeSet> {
        match self.value {
            Value::ContextVar(_) => None,
            _ => Some(self.value.value_type().into()),
        }
    }

    fn activate(&mut self, ctx: &mut Context, _input: &Value) -> ActivateResult {
        match self.value {
            Value::ContextVar(_) => ctx.resolve(&self.value).into(),
            _ => ActivateResult::Produced(self.value.clone()),
        }
    }
}

/// Logs its input and passes it through.
#[derive(Debug, Default)]
pub struct Log {
    prefix: String,
}

impl Log {
    pub fn descriptor() -> BlockDescriptor {
        BlockDescriptor::new("Log", TypeSet::ANY, TypeSet::ANY)
            .help("Logs the input value and passes it through.")
            .param(ParamInfo::new("Prefix", "Text printed before the value.", ValueType::String, Value::from("")))
    }
}

impl Block for Log {
    fn set_param(&mut self, _index: usize, value: &Value) -> Result<()> {
        self.prefix = value.as_str().unwrap_or_default().to_string();
        Ok(())
    }

    fn compose(&self, input: TypeSet) -> Option<TypeSet> {
        Some(input)
    }

    fn activate(&mut self, ctx: &mut Context, input: &Value) -> ActivateResult {
        if self.prefix.is_empty() {
            info!(chain = ctx.chain_name(), "[LOG] {}", input);
        } else {
            info!(chain = ctx.chain_name(), "[LOG] {} {}", self.prefix, input);
        }
        ActivateResult::Produced(input.clone())
    }
}
