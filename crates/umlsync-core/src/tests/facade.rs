use crate::sequence::NodeKind;
use crate::*;
use serde_json::Value;

#[test]
fn facade_parse_clean_source() {
    let mut parser = PlantUmlParser::new();
    let outcome = parser.parse("@startuml\nactor A\nA -> B : hi\nalt x\nB -> A\nend\n@enduml");
    assert!(outcome.is_clean());
    assert!(!parser.has_errors());

    let stats = parser.statistics().unwrap();
    assert_eq!(stats.participants, 1);
    assert_eq!(stats.messages, 2);
    assert_eq!(stats.control_structures, 1);
    assert_eq!(stats.count(NodeKind::Branch), 1);
    // document + diagram + participant + 2 messages + alt + branch
    assert_eq!(stats.total_nodes, 7);
}

#[test]
fn facade_merges_lexical_then_syntax_errors() {
    let outcome = parse_source("@startuml\nA -> : \"open");
    let kinds: Vec<_> = outcome.errors.iter().map(|e| e.kind).collect();
    assert_eq!(kinds.first(), Some(&DiagnosticKind::Lexical));
    assert!(kinds[1..].iter().all(|k| *k == DiagnosticKind::Syntax));
    assert!(outcome.errors.len() >= 2);
    assert!(outcome.document.is_some());
}

#[test]
fn facade_keeps_only_latest_result() {
    let mut parser = PlantUmlParser::new();
    assert!(parser.last_result().is_none());
    assert!(parser.errors().is_empty());
    assert!(matches!(parser.to_json(), Err(Error::NoParseResult)));

    parser.parse("@startuml\nA -> \n@enduml");
    assert!(parser.has_errors());

    parser.parse("@startuml\nA -> B\n@enduml");
    assert!(!parser.has_errors());
    assert_eq!(parser.last_result().unwrap().input, "@startuml\nA -> B\n@enduml");
}

#[test]
fn facade_to_json_shape() {
    let mut parser = PlantUmlParser::new();
    parser.parse("@startuml\nA --> B : hi\n@enduml");
    let json: Value = serde_json::from_str(&parser.to_json().unwrap()).unwrap();

    let message = &json["document"]["diagrams"][0]["statements"][0];
    assert_eq!(message["type"], "message");
    assert_eq!(message["from"], "A");
    assert_eq!(message["isAsync"], true);
    assert_eq!(json["tokens"][0]["kind"], "START_UML");
    assert_eq!(json["statistics"]["nodeKinds"]["message"], 1);
    assert_eq!(json["errors"].as_array().unwrap().len(), 0);
}

#[test]
fn facade_garbage_input_still_yields_document() {
    let outcome = parse_source("}}}} -> -> @@@ \"");
    assert!(outcome.document.is_some());
    assert!(outcome.has_errors());
    assert_eq!(outcome.tokens.last().unwrap().kind, TokenKind::Eof);
}
