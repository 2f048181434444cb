use crate::*;

#[test]
fn repair_wraps_missing_directives() {
    let repaired = repair_source("A -> B : hi", DEFAULT_MAX_LINES);
    assert_eq!(repaired.code, "@startuml\nA -> B : hi\n@enduml");
    assert!(!repaired.truncated);
}

#[test]
fn repair_empty_input() {
    assert_eq!(repair_source("  \n ", 10).code, "@startuml\n@enduml");
}

#[test]
fn repair_normalizes_line_endings_and_escapes() {
    let repaired = repair_source("@startuml\r\nA -> B\rB -> A\\nC -> D\r\n@enduml", 100);
    assert_eq!(repaired.code, "@startuml\nA -> B\nB -> A\nC -> D\n@enduml");
}

#[test]
fn repair_collapses_blank_runs() {
    let repaired = repair_source("@startuml\nA -> B\n\n\n\n\nB -> A\n@enduml", 100);
    assert_eq!(repaired.code, "@startuml\nA -> B\n\nB -> A\n@enduml");
}

#[test]
fn repair_leaves_clean_source_alone() {
    let source = "@startuml\nA -> B\n@enduml";
    let repaired = repair_source(source, 100);
    assert!(!repaired.changed_from(source));
}

#[test]
fn repair_truncates_and_reappends_enduml() {
    let body: Vec<String> = (0..20).map(|i| format!("A -> B : {i}")).collect();
    let source = format!("@startuml\n{}\n@enduml", body.join("\n"));
    let repaired = repair_source(&source, 5);
    assert!(repaired.truncated);
    let lines: Vec<_> = repaired.code.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "@startuml");
    assert_eq!(lines[4], "A -> B : 3");
    assert_eq!(lines[5], "@enduml");
}
