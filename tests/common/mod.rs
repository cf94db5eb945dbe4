#![allow(dead_code)]

use chainrt::{ActivateResult, Block, BlockDescriptor, BlockError, BlockRegistry, Context, ParamInfo, Result, TypeSet, Value, ValueType};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What the `Record` blocks of a registry have seen.
#[derive(Debug, Default)]
pub struct Journal {
    activations: Mutex<Vec<String>>,
    warmups: AtomicUsize,
    cleanups: AtomicUsize,
}

impl Journal {
    pub fn activations(&self) -> Vec<String> {
        self.activations.lock().unwrap().clone()
    }

    pub fn warmups(&self) -> usize {
        self.warmups.load(Ordering::SeqCst)
    }

    pub fn cleanups(&self) -> usize {
        self.cleanups.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
struct Record {
    tag: String,
    journal: Arc<Journal>,
}

impl Block for Record {
    fn set_param(&mut self, _index: usize, value: &Value) -> Result<()> {
        self.tag = value.as_str().unwrap_or_default().to_string();
        Ok(())
    }

    fn compose(&self, input: TypeSet) -> Option<TypeSet> {
        Some(input)
    }

    fn warmup(&mut self, _ctx: &mut Context) -> std::result::Result<(), BlockError> {
        self.journal.warmups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn activate(&mut self, _ctx: &mut Context, input: &Value) -> ActivateResult {
        self.journal.activations.lock().unwrap().push(self.tag.clone());
        ActivateResult::Produced(input.clone())
    }

    fn cleanup(&mut self) {
        self.journal.cleanups.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
struct BrokenWarmup;

impl Block for BrokenWarmup {
    fn warmup(&mut self, _ctx: &mut Context) -> std::result::Result<(), BlockError> {
        Err(BlockError::new("IO", "device not found"))
    }

    fn activate(&mut self, _ctx: &mut Context, input: &Value) -> ActivateResult {
        ActivateResult::Produced(input.clone())
    }
}

/// Core blocks plus `Record(Tag)` and `BrokenWarmup`, in an isolated registry.
pub fn recording_registry() -> (Arc<BlockRegistry>, Arc<Journal>) {
    let journal = Arc::new(Journal::default());
    let registry = BlockRegistry::with_core_blocks();

    let shared = journal.clone();
    registry
        .register(
            BlockDescriptor::new("Record", TypeSet::ANY, TypeSet::ANY)
                .param(ParamInfo::new("Tag", "Name written to the journal.", ValueType::String, Value::from(""))),
            move || {
                Box::new(Record {
                    tag: String::new(),
                    journal: shared.clone(),
                }) as Box<dyn Block>
            },
        )
        .unwrap();
    registry
        .register(BlockDescriptor::new("BrokenWarmup", TypeSet::ANY, TypeSet::ANY), || {
            Box::new(BrokenWarmup) as Box<dyn Block>
        })
        .unwrap();

    (Arc::new(registry), journal)
}
