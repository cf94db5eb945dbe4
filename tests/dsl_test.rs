use chainrt::dsl::builder::{ChainBuilder, DocumentBuilder};
use chainrt::dsl::loader::parse_document;
use chainrt::{BlockRegistry, ChainState, Error, Node, NodeConfig, Transition, Value};
use serde_json::json;

#[test]
fn test_builder_matches_document_text() {
    let yaml = r#"
node:
  tick_interval_ms: 5
variables:
  threshold: 10
chains:
  - name: main
    input: 1
    blocks:
      - block: Const
        params: [42]
      - block: Math.Add
        params:
          Operand: "${threshold}"
"#;
    let parsed = parse_document(yaml).unwrap();

    let built = DocumentBuilder::new()
        .config(NodeConfig::default().with_interval_ms(5))
        .var("threshold", 10)
        .chain(
            ChainBuilder::new("main")
                .input(1)
                .positional("Const", vec![json!(42)])
                .with("Math.Add")
                .param("Operand", "${threshold}")
                .done()
                .build(),
        )
        .build();

    assert_eq!(parsed, built);
}

#[test]
fn test_document_drives_node() {
    let document = DocumentBuilder::new()
        .var("step", 5)
        .chain(
            ChainBuilder::new("counter")
                .input(0)
                .with("Math.Add")
                .param("Operand", "${step}")
                .done()
                .with("Set")
                .param("Name", "last")
                .param("Global", true)
                .done()
                .build(),
        )
        .chain(ChainBuilder::new("ticker").looped(true).block("Pause").build())
        .build();

    let mut node = Node::from_document(&document, BlockRegistry::global()).unwrap();
    assert_eq!(node.chains().len(), 2);
    assert!(node.chain("ticker").unwrap().is_looped());

    assert_eq!(node.tick(), vec![Transition::new("counter", ChainState::Stopped)]);
    assert_eq!(node.get_variable("last").unwrap(), Value::Int(5));
}

#[test]
fn test_document_with_bad_chain_fails() {
    let document = DocumentBuilder::new()
        .chain(ChainBuilder::new("bad").block("NoSuchBlock").build())
        .build();
    let err = Node::from_document(&document, BlockRegistry::global()).err().unwrap();
    assert_eq!(err, Error::UnknownBlock("NoSuchBlock".to_string()));
}
