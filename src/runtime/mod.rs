pub mod block;
pub mod chain;
pub mod context;
pub mod node;
pub mod registry;
pub mod scheduler;
pub mod scope;
pub mod signal;
