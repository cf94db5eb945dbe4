use crate::error::Result;
use crate::runtime::scope::Scope;
use crate::runtime::signal::Signal;
use crate::value::{Resolve, Value};

/// Per-activation view handed to a block.
///
/// Exposes the owning chain's local scope, the owning node's global scope and
/// the capability to signal chains. Lookups go local first, then global.
pub struct Context<'a> {
    chain: &'a str,
    tick: u64,
    local: &'a mut Scope,
    global: &'a mut Scope,
    signals: &'a mut Vec<Signal>,
}

impl<'a> Context<'a> {
    pub fn new(
        chain: &'a str,
        tick: u64,
        local: &'a mut Scope,
        global: &'a mut Scope,
        signals: &'a mut Vec<Signal>,
    ) -> Self {
        Self {
            chain,
            tick,
            local,
            global,
            signals,
        }
    }

    pub fn chain_name(&self) -> &str {
        self.chain
    }

    /// Number of the scheduler tick currently running (first tick is 1).
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn get_var(&self, key: &str) -> Option<&Value> {
        self.local.get(key).or_else(|| self.global.get(key))
    }

    pub fn get_local(&self, key: &str) -> Option<&Value> {
        self.local.get(key)
    }

    pub fn set_local(&mut self, key: &str, value: Value) {
        self.local.set(key, value);
    }

    pub fn get_global(&self, key: &str) -> Option<&Value> {
        self.global.get(key)
    }

    pub fn set_global(&mut self, key: &str, value: Value) {
        self.global.set(key, value);
    }

    pub fn local(&self) -> &Scope {
        self.local
    }

    pub fn global(&self) -> &Scope {
        self.global
    }

    /// Follows `ContextVar` references (recursively, into Seq/Table too).
    pub fn resolve(&self, value: &Value) -> Result<Value> {
        value.resolve_deep(self)
    }

    pub fn stop_chain(&mut self, name: &str) {
        self.signals.push(Signal::Stop(name.to_string()));
    }

    pub fn restart_chain(&mut self, name: &str) {
        self.signals.push(Signal::Restart(name.to_string()));
    }
}

impl Resolve for Context<'_> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get_var(name)
    }
}
