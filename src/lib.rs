pub mod blocks;
pub mod config;
pub mod dsl;
pub mod error;
pub mod runtime;
pub mod value;

pub use config::NodeConfig;
pub use error::{BlockError, Error, Result};
pub use runtime::block::{ActivateResult, Block, BlockDescriptor, BlockInstance, ParamInfo};
pub use runtime::chain::{Chain, ChainState};
pub use runtime::context::Context;
pub use runtime::node::{Binding, BlockSpec, ChainHandle, ChainOptions, Node};
pub use runtime::registry::{register_block, BlockFactory, BlockRegistry};
pub use runtime::scheduler::Transition;
pub use runtime::scope::Scope;
pub use value::{ObjectRef, ObjectTag, TypeSet, Value, ValueType};
