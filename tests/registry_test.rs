use chainrt::{register_block, ActivateResult, Block, BlockDescriptor, BlockRegistry, Context, Error, TypeSet, Value};
use std::sync::Arc;
use std::thread;

#[derive(Debug)]
struct Echo(&'static str);

impl Block for Echo {
    fn activate(&mut self, _ctx: &mut Context, _input: &Value) -> ActivateResult {
        ActivateResult::Produced(Value::from(self.0))
    }
}

#[test]
fn test_duplicate_name_keeps_first_registration() {
    let registry = BlockRegistry::new();
    registry
        .register(BlockDescriptor::new("Echo", TypeSet::ANY, TypeSet::ANY).help("first"), || {
            Box::new(Echo("first")) as Box<dyn Block>
        })
        .unwrap();

    let err = registry
        .register(BlockDescriptor::new("Echo", TypeSet::ANY, TypeSet::ANY).help("second"), || {
            Box::new(Echo("second")) as Box<dyn Block>
        })
        .unwrap_err();
    assert_eq!(err, Error::DuplicateName("Echo".to_string()));

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.lookup("Echo").unwrap().help, "first");
    let instance = registry.instantiate("Echo").unwrap();
    assert_eq!(instance.name(), "Echo");
    assert!(format!("{instance:?}").contains("first"));
}

#[test]
fn test_unknown_block() {
    let registry = BlockRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.lookup("Nope").unwrap_err(), Error::UnknownBlock("Nope".to_string()));
    assert!(matches!(registry.instantiate("Nope"), Err(Error::UnknownBlock(_))));
}

#[test]
fn test_sealed_registry_rejects_registration() {
    let registry = BlockRegistry::with_core_blocks();
    let before = registry.len();
    registry.seal();
    assert!(registry.is_sealed());

    let err = registry
        .register(BlockDescriptor::new("Late", TypeSet::ANY, TypeSet::ANY), || {
            Box::new(Echo("late")) as Box<dyn Block>
        })
        .unwrap_err();
    assert_eq!(err, Error::RegistrySealed("Late".to_string()));
    assert_eq!(registry.len(), before);
    assert!(registry.instantiate("Const").is_ok());
}

#[test]
fn test_core_blocks_are_registered() {
    let registry = BlockRegistry::with_core_blocks();
    for name in [
        "Chain.Restart",
        "Chain.Stop",
        "Const",
        "Expr",
        "Fail",
        "Get",
        "Log",
        "Math.Add",
        "Math.Divide",
        "Math.Multiply",
        "Math.Subtract",
        "Pause",
        "Rebase",
        "Restart",
        "Set",
        "Stop",
    ] {
        assert!(registry.contains(name), "missing {name}");
    }

    let names = registry.names();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);

    let add = registry.lookup("Math.Add").unwrap();
    assert_eq!(add.input, TypeSet::NUMBER);
    assert_eq!(add.param_index("Operand"), Some(0));
}

#[test]
fn test_global_registration() {
    register_block(BlockDescriptor::new("Test.GlobalEcho", TypeSet::ANY, TypeSet::ANY), || {
        Box::new(Echo("global")) as Box<dyn Block>
    })
    .unwrap();

    let global = BlockRegistry::global();
    assert!(global.contains("Test.GlobalEcho"));
    assert!(global.contains("Const"));
    assert!(Arc::ptr_eq(&global, &BlockRegistry::global()));
}

#[test]
fn test_concurrent_instantiate() {
    let registry = Arc::new(BlockRegistry::with_core_blocks());
    registry.seal();

    thread::scope(|s| {
        for _ in 0..4 {
            let registry = registry.clone();
            s.spawn(move || {
                for _ in 0..100 {
                    let instance = registry.instantiate("Math.Add").unwrap();
                    assert_eq!(instance.param(0), Some(&Value::Int(0)));
                }
            });
        }
    });
}
