use super::support::gui;
use crate::*;

fn reparse(code: &str) -> GuiState {
    let outcome = umlsync_core::parse_source(code);
    assert!(outcome.is_clean(), "{:?}\n{code}", outcome.errors);
    document_to_gui(outcome.document.as_ref().unwrap()).apply_to(GuiState::default())
}

fn messages(state: &GuiState) -> Vec<&str> {
    state
        .actions
        .iter()
        .filter_map(|action| match action {
            Action::Message { message, .. } => Some(message.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn generate_declares_actors_with_aliases() {
    let mut state = gui(
        &["Alice", "Bob Smith"],
        vec![Action::message("Alice", "Bob Smith", "hello")],
    );
    state.title = Some("Demo".to_string());

    assert_eq!(
        generate(&state),
        "@startuml\n\
         title Demo\n\
         actor \"Alice\" as Alice\n\
         actor \"Bob Smith\" as Bob_Smith\n\
         \n\
         Alice -> Bob_Smith : hello\n\
         @enduml"
    );
}

#[test]
fn generate_empty_state() {
    assert_eq!(generate(&GuiState::default()), "@startuml\n@enduml");
}

#[test]
fn generate_keeps_aliases_unique_and_parseable() {
    let state = gui(
        &["a b", "a-b", "loop", "1st"],
        vec![Action::message("a b", "a-b", "x")],
    );
    let code = generate(&state);
    assert!(code.contains("actor \"a b\" as a_b\n"));
    assert!(code.contains("actor \"a-b\" as a_b_2\n"));
    assert!(code.contains("actor \"loop\" as loop_\n"));
    assert!(code.contains("actor \"1st\" as _1st\n"));
    assert!(code.contains("a_b -> a_b_2 : x"));

    let outcome = umlsync_core::parse_source(&code);
    assert!(outcome.is_clean(), "{:?}", outcome.errors);
}

#[test]
fn generate_control_structures() {
    let state = gui(
        &["A", "B"],
        vec![
            Action::Alt {
                condition: "ok".into(),
                true_branch: vec![Action::message("A", "B", "yes")],
                false_branch: vec![Action::message("B", "A", "no")],
                else_condition: "failed".into(),
            },
            Action::Loop {
                condition: "".into(),
                actions: vec![Action::Activation { actor: "A".into() }],
            },
            Action::Par {
                branches: vec![
                    vec![Action::message("A", "B", "one")],
                    vec![Action::message("A", "B", "two")],
                ],
            },
            Action::Opt {
                condition: "maybe".into(),
                actions: vec![Action::Deactivation { actor: "A".into() }],
            },
        ],
    );

    let code = generate(&state);
    let body = code
        .split_once("\n\n")
        .map(|(_, body)| body)
        .unwrap_or_default();
    assert_eq!(
        body,
        "alt ok\n  A -> B : yes\nelse failed\n  B -> A : no\nend\n\
         loop\n  activate A\nend\n\
         par\n  A -> B : one\nelse\n  A -> B : two\nend\n\
         opt maybe\n  deactivate A\nend\n\
         @enduml"
    );
}

#[test]
fn generate_flattens_chained_alternatives() {
    let inner = Action::Alt {
        condition: "b".into(),
        true_branch: vec![Action::message("A", "B", "2")],
        false_branch: vec![Action::message("A", "B", "3")],
        else_condition: "c".into(),
    };
    let state = gui(
        &["A", "B"],
        vec![Action::Alt {
            condition: "a".into(),
            true_branch: vec![Action::message("A", "B", "1")],
            false_branch: vec![inner],
            else_condition: String::new(),
        }],
    );

    let code = generate(&state);
    assert!(code.contains(
        "alt a\n  A -> B : 1\nelse b\n  A -> B : 2\nelse c\n  A -> B : 3\nend\n"
    ));
}

#[test]
fn generate_nests_an_alt_without_further_branches() {
    let state = gui(
        &["A", "B"],
        vec![Action::Alt {
            condition: "c1".into(),
            true_branch: vec![Action::message("A", "B", "x")],
            false_branch: vec![Action::Alt {
                condition: "c2".into(),
                true_branch: vec![Action::message("A", "B", "y")],
                false_branch: vec![],
                else_condition: String::new(),
            }],
            else_condition: String::new(),
        }],
    );

    let code = generate(&state);
    assert!(
        code.contains("else
  alt c2
    A -> B : y
  end
end
"),
        "{code}"
    );
    assert_eq!(reparse(&code), state);
}

#[test]
fn generate_keeps_quotes_in_text_from_opening_strings() {
    let state = gui(
        &["A", "B"],
        vec![
            Action::message("A", "B", "say \"go"),
            Action::message("B", "A", "ok"),
            Action::Opt {
                condition: "is \"open".into(),
                actions: vec![Action::message("A", "B", "then \"stop")],
            },
        ],
    );

    let code = generate(&state);
    let reparsed = reparse(&code);
    assert_eq!(messages(&reparsed), ["say 'go", "ok"]);
    let [_, _, Action::Opt { condition, actions }] = reparsed.actions.as_slice() else {
        panic!("{:?}", reparsed.actions);
    };
    assert_eq!(condition, "is 'open");
    assert_eq!(actions, &[Action::message("A", "B", "then 'stop")]);
}

#[test]
fn generate_keeps_comment_openers_in_text_inert() {
    let state = gui(
        &["A", "B"],
        vec![
            Action::message("A", "B", "read/'write"),
            Action::message("B", "A", "done"),
            Action::Note {
                position: "over A".into(),
                text: "'quoted\nplain".into(),
            },
        ],
    );

    let code = generate(&state);
    let reparsed = reparse(&code);
    assert_eq!(messages(&reparsed), ["read/ 'write", "done"]);
    assert_eq!(
        reparsed.actions[2],
        Action::Note {
            position: "over A".into(),
            text: "\u{2019}quoted\nplain".into(),
        }
    );
    assert_eq!(generate(&reparsed), code);
}

#[test]
fn generate_notes() {
    let state = gui(
        &["Web Server", "DB"],
        vec![
            Action::Note {
                position: "over Web Server, DB".into(),
                text: "shared".into(),
            },
            Action::Note {
                position: "left of DB".into(),
                text: "first\nsecond".into(),
            },
            Action::Note {
                position: "right".into(),
                text: "plain".into(),
            },
        ],
    );

    let code = generate(&state);
    assert!(code.contains("note over Web_Server, DB : shared\n"));
    assert!(code.contains("note left of DB\n  first\n  second\nend note\n"));
    assert!(code.contains("note right : plain\n"));
}

#[test]
fn generate_collapses_multiline_text() {
    let state = gui(
        &["A", "B"],
        vec![Action::message("A", "B", "line one\n  line two")],
    );
    assert!(generate(&state).contains("A -> B : line one line two\n"));
}

#[test]
fn export_document_round_trips_through_json() {
    let state = gui(
        &["A", "B"],
        vec![
            Action::message("A", "B", "go"),
            Action::Opt {
                condition: "cached".into(),
                actions: vec![Action::message("B", "A", "hit")],
            },
        ],
    );
    let at = chrono::DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);

    let export = ExportDocument::from_state(&state, at).unwrap();
    assert_eq!(export.metadata.condition_count, 1);
    assert_eq!(export.plant_uml, generate(&state));

    let json = export.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["metadata"]["exportedAt"], "2024-05-01T12:00:00Z");
    assert_eq!(value["metadata"]["conditionCount"], 1);
    assert!(value["plantUML"].as_str().unwrap().starts_with("@startuml"));

    let back = ExportDocument::from_json(&json).unwrap();
    assert_eq!(back, export);
    assert_eq!(back.import().unwrap().actions, state.actions);
}

#[test]
fn export_import_rejects_broken_json() {
    assert!(matches!(
        ExportDocument::from_json("{\"plantUML\": 3}"),
        Err(SyncError::Json(_))
    ));
}
