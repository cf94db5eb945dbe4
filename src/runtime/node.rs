use std::sync::Arc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;
use crate::config::NodeConfig;
use crate::dsl::{ChainSpec, Document};
use crate::error::{BlockError, Error, Result};
use crate::runtime::block::BlockInstance;
use crate::runtime::chain::{Chain, ChainState};
use crate::runtime::registry::BlockRegistry;
use crate::runtime::scheduler::{Scheduler, Transition};
use crate::runtime::scope::Scope;
use crate::value::{TypeSet, Value};

/// One parameter binding of a [`BlockSpec`].
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Index(usize, Value),
    Named(String, Value),
}

/// A block kind plus the parameter values to bind on it.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSpec {
    pub block: String,
    pub bindings: Vec<Binding>,
}

impl BlockSpec {
    pub fn new(block: &str) -> Self {
        Self {
            block: block.to_string(),
            bindings: Vec::new(),
        }
    }

    pub fn param(mut self, index: usize, value: impl Into<Value>) -> Self {
        self.bindings.push(Binding::Index(index, value.into()));
        self
    }

    pub fn named(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.bindings.push(Binding::Named(name.to_string(), value.into()));
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainOptions {
    /// Value handed to block 0.
    pub input: Value,
    /// Start over from block 0 after every completed pass.
    pub looped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainHandle {
    pub name: String,
    pub id: Uuid,
}

/// Host of chains: owns them, the global scope and the scheduler.
pub struct Node {
    id: Uuid,
    registry: Arc<BlockRegistry>,
    chains: Vec<Chain>,
    globals: Scope,
    scheduler: Scheduler,
}

impl Node {
    /// Node backed by the process-wide registry.
    pub fn new() -> Self {
        Self::with_registry(BlockRegistry::global())
    }

    pub fn with_registry(registry: Arc<BlockRegistry>) -> Self {
        let id = Uuid::new_v4();
        info!(node = %id, blocks = registry.len(), "Node created");
        Self {
            id,
            registry,
            chains: Vec::new(),
            globals: Scope::new(),
            scheduler: Scheduler::new(id),
        }
    }

    /// Builds a node from a document: global variables first, then every
    /// chain in document order.
    pub fn from_document(document: &Document, registry: Arc<BlockRegistry>) -> Result<Self> {
        let mut node = Self::with_registry(registry);
        for (name, value) in &document.variables {
            node.set_variable(name, Value::from(value.clone()));
        }
        for spec in &document.chains {
            node.load_spec(spec)?;
        }
        Ok(node)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.registry
    }

    pub fn ticks(&self) -> u64 {
        self.scheduler.ticks()
    }

    pub fn load_chain(&mut self, name: &str, blocks: Vec<BlockSpec>) -> Result<ChainHandle> {
        self.load_chain_with(name, blocks, ChainOptions::default())
    }

    pub fn load_spec(&mut self, spec: &ChainSpec) -> Result<ChainHandle> {
        self.load_chain_with(&spec.name, spec.block_specs(), spec.options())
    }

    /// Instantiates, binds and type-checks every block, then appends the chain
    /// in `Idle`. Nothing is added on error.
    pub fn load_chain_with(&mut self, name: &str, blocks: Vec<BlockSpec>, options: ChainOptions) -> Result<ChainHandle> {
        if self.position(name).is_some() {
            return Err(Error::DuplicateName(name.to_string()));
        }

        let mut instances = Vec::with_capacity(blocks.len());
        for spec in blocks {
            instances.push(self.instantiate(spec)?);
        }
        compose(name, &instances, options.input.value_type().into())?;

        let chain = Chain::new(name, instances, options.input, options.looped);
        let handle = ChainHandle {
            name: name.to_string(),
            id: chain.id(),
        };
        info!(node = %self.id, chain = name, id = %handle.id, blocks = chain.len(), "Chain loaded");
        self.chains.push(chain);
        Ok(handle)
    }

    fn instantiate(&self, spec: BlockSpec) -> Result<BlockInstance> {
        let mut instance = self.registry.instantiate(&spec.block)?;
        for binding in spec.bindings {
            match binding {
                Binding::Index(index, value) => instance.set_param(index, value)?,
                Binding::Named(name, value) => instance.set_param_named(&name, value)?,
            }
        }
        Ok(instance)
    }

    /// Advances every runnable chain by one quantum.
    pub fn tick(&mut self) -> Vec<Transition> {
        self.scheduler.tick(&mut self.chains, &mut self.globals)
    }

    pub fn has_runnable(&self) -> bool {
        self.chains.iter().any(|c| c.state().is_runnable())
    }

    /// Ticks until no chain is runnable or `max_ticks` ticks have run.
    pub fn run_until_idle(&mut self, max_ticks: u64) -> Vec<Transition> {
        let mut transitions = Vec::new();
        let mut ticks = 0;
        while ticks < max_ticks && self.has_runnable() {
            transitions.extend(self.tick());
            ticks += 1;
        }
        transitions
    }

    /// Ticks on a fixed interval until no chain is runnable or the configured
    /// tick limit is reached.
    pub async fn run(&mut self, config: &NodeConfig) -> Vec<Transition> {
        let mut interval = tokio::time::interval(config.tick_interval());
        let mut transitions = Vec::new();
        let mut ticks = 0;
        info!(node = %self.id, chains = self.chains.len(), "Node running");

        while self.has_runnable() {
            if config.max_ticks.is_some_and(|max| ticks >= max) {
                warn!(node = %self.id, ticks, "Tick limit reached with runnable chains");
                break;
            }
            interval.tick().await;
            transitions.extend(self.tick());
            ticks += 1;
        }

        info!(node = %self.id, ticks, "Node idle");
        transitions
    }

    /// Stops every chain that is still runnable.
    pub fn shutdown(&mut self) -> Vec<Transition> {
        let mut transitions = Vec::new();
        for chain in &mut self.chains {
            if chain.stop() {
                transitions.push(Transition::new(chain.name(), ChainState::Stopped));
            }
        }
        info!(node = %self.id, stopped = transitions.len(), "Node shut down");
        transitions
    }

    pub fn get_variable(&self, name: &str) -> Result<Value> {
        self.globals
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))
    }

    pub fn set_variable(&mut self, name: &str, value: Value) {
        self.globals.set(name, value);
    }

    pub fn globals(&self) -> &Scope {
        &self.globals
    }

    pub fn chain_variable(&self, chain: &str, name: &str) -> Result<Value> {
        self.find(chain)?
            .scope()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))
    }

    pub fn set_chain_variable(&mut self, chain: &str, name: &str, value: Value) -> Result<()> {
        self.find_mut(chain)?.scope_mut().set(name, value);
        Ok(())
    }

    /// Halts the chain right away, between ticks.
    pub fn stop_chain(&mut self, name: &str) -> Result<()> {
        let node = self.id;
        if self.find_mut(name)?.stop() {
            info!(node = %node, chain = name, "Chain stopped");
        }
        Ok(())
    }

    /// Returns the chain to `Idle`, keeping its variables.
    pub fn restart_chain(&mut self, name: &str) -> Result<()> {
        self.find_mut(name)?.reset();
        info!(node = %self.id, chain = name, "Chain reset");
        Ok(())
    }

    pub fn remove_chain(&mut self, name: &str) -> Result<()> {
        let index = self.position(name).ok_or_else(|| Error::UnknownChain(name.to_string()))?;
        self.chains.remove(index);
        self.scheduler.forget(name);
        info!(node = %self.id, chain = name, "Chain removed");
        Ok(())
    }

    /// Fails the chain with `error` at the start of the next tick.
    pub fn fail_chain(&mut self, name: &str, error: BlockError) -> Result<()> {
        self.find(name)?;
        self.scheduler.inject_failure(name, error);
        Ok(())
    }

    pub fn chain(&self, name: &str) -> Option<&Chain> {
        self.chains.iter().find(|c| c.name() == name)
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn chain_output(&self, name: &str) -> Result<Value> {
        Ok(self.find(name)?.output().clone())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.chains.iter().position(|c| c.name() == name)
    }

    fn find(&self, name: &str) -> Result<&Chain> {
        self.chain(name).ok_or_else(|| Error::UnknownChain(name.to_string()))
    }

    fn find_mut(&mut self, name: &str) -> Result<&mut Chain> {
        self.chains
            .iter_mut()
            .find(|c| c.name() == name)
            .ok_or_else(|| Error::UnknownChain(name.to_string()))
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks that every block accepts what its predecessor may produce and that
/// required parameters are bound.
fn compose(chain: &str, blocks: &[BlockInstance], input: TypeSet) -> Result<()> {
    let mut current = input;
    for (position, block) in blocks.iter().enumerate() {
        if let Some(param) = block.missing_required() {
            return Err(Error::Composition {
                chain: chain.to_string(),
                position,
                message: format!("required parameter '{}' of '{}' is not bound", param.name, block.name()),
            });
        }
        let accepted = block.descriptor().input;
        if !accepted.accepts(current) {
            return Err(Error::Composition {
                chain: chain.to_string(),
                position,
                message: format!("'{}' accepts {} but receives {}", block.name(), accepted, current),
            });
        }
        current = block.output_types(current);
    }
    Ok(())
}
