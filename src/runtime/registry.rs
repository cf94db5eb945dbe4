use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, error, info};
use crate::error::{Error, Result};
use crate::runtime::block::{Block, BlockDescriptor, BlockInstance};

pub type BlockFactory = Arc<dyn Fn() -> Box<dyn Block> + Send + Sync>;

struct Registration {
    descriptor: Arc<BlockDescriptor>,
    factory: BlockFactory,
}

/// Catalog of block kinds: name -> descriptor + factory.
///
/// Write-once per name. After [`seal`](Self::seal) the registry only serves
/// reads, which go through the sharded map without a global lock.
pub struct BlockRegistry {
    entries: DashMap<String, Registration>,
    sealed: AtomicBool,
}

static GLOBAL: LazyLock<Arc<BlockRegistry>> = LazyLock::new(|| Arc::new(BlockRegistry::with_core_blocks()));

impl BlockRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            sealed: AtomicBool::new(false),
        }
    }

    pub fn with_core_blocks() -> Self {
        let registry = Self::new();
        if let Err(e) = crate::blocks::register_core(&registry) {
            error!(error = %e, "Failed to register core blocks");
        }
        registry
    }

    /// Process-wide registry, pre-populated with the core blocks.
    pub fn global() -> Arc<BlockRegistry> {
        GLOBAL.clone()
    }

    pub fn register<F>(&self, descriptor: BlockDescriptor, factory: F) -> Result<()>
    where
        F: Fn() -> Box<dyn Block> + Send + Sync + 'static,
    {
        if self.is_sealed() {
            return Err(Error::RegistrySealed(descriptor.name));
        }
        match self.entries.entry(descriptor.name.clone()) {
            Entry::Occupied(_) => Err(Error::DuplicateName(descriptor.name)),
            Entry::Vacant(slot) => {
                debug!(block = %descriptor.name, "Registered block");
                slot.insert(Registration {
                    descriptor: Arc::new(descriptor),
                    factory: Arc::new(factory),
                });
                Ok(())
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<BlockDescriptor>> {
        self.entries
            .get(name)
            .map(|r| r.descriptor.clone())
            .ok_or_else(|| Error::UnknownBlock(name.to_string()))
    }

    /// Fresh instance with default parameters.
    pub fn instantiate(&self, name: &str) -> Result<BlockInstance> {
        let (descriptor, factory) = {
            let entry = self
                .entries
                .get(name)
                .ok_or_else(|| Error::UnknownBlock(name.to_string()))?;
            (entry.descriptor.clone(), entry.factory.clone())
        };
        BlockInstance::new(descriptor, factory())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ends the registration phase. Further `register` calls fail.
    pub fn seal(&self) {
        if !self.sealed.swap(true, Ordering::AcqRel) {
            info!(blocks = self.len(), "Block registry sealed");
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registers a block kind in the process-wide registry.
pub fn register_block<F>(descriptor: BlockDescriptor, factory: F) -> Result<()>
where
    F: Fn() -> Box<dyn Block> + Send + Sync + 'static,
{
    BlockRegistry::global().register(descriptor, factory)
}
