use crate::error::Result;
use crate::runtime::block::{ActivateResult, Block, BlockDescriptor, ParamInfo};
use crate::runtime::context::Context;
use crate::value::{TypeSet, Value, ValueType};

/// Stores its input in a chain-local (or global) variable and passes it on.
#[derive(Debug, Default)]
pub struct Set {
    name: String,
    global: bool,
}

impl Set {
    pub fn descriptor() -> BlockDescriptor {
        BlockDescriptor::new("Set", TypeSet::ANY, TypeSet::ANY)
            .help("Writes the input into a variable.")
            .param(ParamInfo::new("Name", "Variable name.", ValueType::String, Value::None).required())
            .param(ParamInfo::new(
                "Global",
                "Write to the node's global scope instead of the chain's.",
                ValueType::Bool,
                Value::Bool(false),
            ))
    }
}

impl Block for Set {
    fn set_param(&mut self, index: usize, value: &Value) -> Result<()> {
        match index {
            0 => self.name = value.as_str().unwrap_or_default().to_string(),
            _ => self.global = value.as_bool().unwrap_or(false),
        }
        Ok(())
    }

    fn compose(&self, input: TypeSet) -> Option<TypeSet> {
        Some(input)
    }

    fn activate(&mut self, ctx: &mut Context, input: &Value) -> ActivateResult {
        if self.global {
            ctx.set_global(&self.name, input.clone());
        } else {
            ctx.set_local(&self.name, input.clone());
        }
        ActivateResult::Produced(input.clone())
    }
}

/// Outputs a variable, looked up in the chain scope first, then globally.
#[derive(Debug, Default)]
pub struct Get {
    name: String,
    default: Value,
}

impl Get {
    pub fn descriptor() -> BlockDescriptor {
        BlockDescriptor::new("Get", TypeSet::ANY, TypeSet::ANY)
            .help("Reads a variable; fails when it is unset and no default is given.")
            .param(ParamInfo::new("Name", "Variable name.", ValueType::String, Value::None).required())
            .param(ParamInfo::new("Default", "Value used when the variable is unset.", TypeSet::ANY, Value::None))
    }
}

impl Block for Get {
    fn set_param(&mut self, index: usize, value: &Value) -> Result<()> {
        match index {
            0 => self.name = value.as_str().unwrap_or_default().to_string(),
            _ => self.default = value.clone(),
        }
        Ok(())
    }

    fn activate(&mut self, ctx: &mut Context, _input: &Value) -> ActivateResult {
        match ctx.get_var(&self.name) {
            Some(value) => ActivateResult::Produced(value.clone()),
            None if !self.default.is_none() => ActivateResult::Produced(self.default.clone()),
            None => ActivateResult::error("UnknownVariable", format!("variable '{}' is not set", self.name)),
        }
    }
}
