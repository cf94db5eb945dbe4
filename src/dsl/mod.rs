pub mod builder;
pub mod loader;

use std::collections::{BTreeMap, HashMap};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use crate::config::NodeConfig;
use crate::runtime::node::{BlockSpec, ChainOptions};
use crate::value::Value;

/// A node document: node settings, global variables and chains.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub variables: HashMap<String, Json>,
    #[serde(default)]
    pub chains: Vec<ChainSpec>,
}

impl Document {
    pub fn chain(&self, name: &str) -> Option<&ChainSpec> {
        self.chains.iter().find(|c| c.name == name)
    }
}

/// Serialized form of a chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChainSpec {
    pub name: String,
    #[serde(default)]
    pub looped: bool,
    #[serde(default)]
    pub input: Json,
    #[serde(default)]
    pub blocks: Vec<BlockDoc>,
}

impl ChainSpec {
    pub fn options(&self) -> ChainOptions {
        ChainOptions {
            input: Value::from(self.input.clone()),
            looped: self.looped,
        }
    }

    pub fn block_specs(&self) -> Vec<BlockSpec> {
        self.blocks.iter().map(BlockDoc::to_spec).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockDoc {
    pub block: String,
    #[serde(default)]
    pub params: Params,
}

impl BlockDoc {
    pub fn to_spec(&self) -> BlockSpec {
        let mut spec = BlockSpec::new(&self.block);
        match &self.params {
            Params::Positional(values) => {
                for (index, value) in values.iter().enumerate() {
                    spec = spec.param(index, Value::from(value.clone()));
                }
            }
            Params::Named(values) => {
                for (name, value) in values {
                    spec = spec.named(name, Value::from(value.clone()));
                }
            }
        }
        spec
    }
}

/// Parameter bindings: a list binds by position, a map binds by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Params {
    Positional(Vec<Json>),
    Named(BTreeMap<String, Json>),
}

impl Default for Params {
    fn default() -> Self {
        Params::Positional(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::node::Binding;

    #[test]
    fn test_params_forms() {
        let yaml = r#"
chains:
  - name: main
    input: 1
    blocks:
      - block: Const
        params: [42]
      - block: Math.Add
        params: { Operand: "${step}" }
      - block: Log
"#;
        let doc: Document = serde_yaml::from_str(yaml).unwrap();
        let chain = doc.chain("main").unwrap();
        assert_eq!(chain.options().input, Value::Int(1));

        let specs = chain.block_specs();
        assert_eq!(specs[0].bindings, vec![Binding::Index(0, Value::Int(42))]);
        assert_eq!(
            specs[1].bindings,
            vec![Binding::Named("Operand".to_string(), Value::context_var("step"))]
        );
        assert!(specs[2].bindings.is_empty());
    }
}
