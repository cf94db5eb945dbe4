use std::collections::{BTreeMap, HashMap};
use serde_json::Value as Json;
use crate::config::NodeConfig;
use crate::dsl::{BlockDoc, ChainSpec, Document, Params};

pub struct ChainBuilder {
    name: String,
    looped: bool,
    input: Json,
    blocks: Vec<BlockDoc>,
}

impl ChainBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            looped: false,
            input: Json::Null,
            blocks: Vec::new(),
        }
    }

    pub fn looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    pub fn input(mut self, input: impl Into<Json>) -> Self {
        self.input = input.into();
        self
    }

    /// Appends a block with no explicit parameters.
    pub fn block(mut self, name: &str) -> Self {
        self.blocks.push(BlockDoc {
            block: name.to_string(),
            params: Params::default(),
        });
        self
    }

    /// Starts a block whose parameters are bound by name.
    pub fn with(self, name: &str) -> BlockBuilder {
        BlockBuilder {
            chain: self,
            block: name.to_string(),
            params: BTreeMap::new(),
        }
    }

    /// Appends a block with positional parameters.
    pub fn positional(mut self, name: &str, params: Vec<Json>) -> Self {
        self.blocks.push(BlockDoc {
            block: name.to_string(),
            params: Params::Positional(params),
        });
        self
    }

    pub fn build(self) -> ChainSpec {
        ChainSpec {
            name: self.name,
            looped: self.looped,
            input: self.input,
            blocks: self.blocks,
        }
    }
}

pub struct BlockBuilder {
    chain: ChainBuilder,
    block: String,
    params: BTreeMap<String, Json>,
}

impl BlockBuilder {
    pub fn param(mut self, name: &str, value: impl Into<Json>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn done(mut self) -> ChainBuilder {
        self.chain.blocks.push(BlockDoc {
            block: self.block,
            params: Params::Named(self.params),
        });
        self.chain
    }
}

#[derive(Default)]
pub struct DocumentBuilder {
    node: NodeConfig,
    variables: HashMap<String, Json>,
    chains: Vec<ChainSpec>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, node: NodeConfig) -> Self {
        self.node = node;
        self
    }

    pub fn var(mut self, key: &str, value: impl Into<Json>) -> Self {
        self.variables.insert(key.to_string(), value.into());
        self
    }

    pub fn chain(mut self, chain: ChainSpec) -> Self {
        self.chains.push(chain);
        self
    }

    pub fn build(self) -> Document {
        Document {
            node: self.node,
            variables: self.variables,
            chains: self.chains,
        }
    }
}
