//! Core block library registered into every registry built with
//! [`BlockRegistry::with_core_blocks`].

pub mod common;
pub mod expr;
pub mod flow;
pub mod math;
pub mod vars;

use crate::error::Result;
use crate::runtime::block::{Block, BlockDescriptor};
use crate::runtime::registry::BlockRegistry;
use self::common::{Const, Log};
use self::expr::Expr;
use self::flow::{ChainAction, ChainControl, Fail, Pause, Rebase, Restart, Stop};
use self::math::{Arith, MathOp};
use self::vars::{Get, Set};

fn register_default<B: Block + Default + 'static>(registry: &BlockRegistry, descriptor: BlockDescriptor) -> Result<()> {
    registry.register(descriptor, || Box::new(B::default()) as Box<dyn Block>)
}

pub fn register_core(registry: &BlockRegistry) -> Result<()> {
    register_default::<Const>(registry, Const::descriptor())?;
    register_default::<Log>(registry, Log::descriptor())?;

    for op in MathOp::ALL {
        registry.register(Arith::descriptor(op), move || Box::new(Arith::new(op)) as Box<dyn Block>)?;
    }

    register_default::<Set>(registry, Set::descriptor())?;
    register_default::<Get>(registry, Get::descriptor())?;
    register_default::<Pause>(registry, Pause::descriptor())?;
    register_default::<Stop>(registry, Stop::descriptor())?;
    register_default::<Restart>(registry, Restart::descriptor())?;
    register_default::<Rebase>(registry, Rebase::descriptor())?;
    register_default::<Fail>(registry, Fail::descriptor())?;
    register_default::<Expr>(registry, Expr::descriptor())?;

    for action in [ChainAction::Stop, ChainAction::Restart] {
        registry.register(ChainControl::descriptor(action), move || {
            Box::new(ChainControl::new(action)) as Box<dyn Block>
        })?;
    }
    Ok(())
}
