use std::path::{Path, PathBuf};
use umlsync_core::{PlantUmlParser, TokenKind};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

fn fixtures_root() -> PathBuf {
    workspace_root().join("fixtures")
}

fn list_fixture_puml_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if path.extension().is_some_and(|e| e == "puml") {
                out.push(path);
            }
        }
    }
    out.sort();
    out
}

#[test]
fn fixtures_parse_without_diagnostics() {
    let files = list_fixture_puml_files(&fixtures_root());
    assert!(!files.is_empty(), "no fixtures found");

    let mut parser = PlantUmlParser::new();
    let mut failures = Vec::new();
    for path in files {
        let text = match std::fs::read_to_string(&path) {
            Ok(v) => v,
            Err(err) => {
                failures.push(format!("failed to read {}: {err}", path.display()));
                continue;
            }
        };

        let outcome = parser.parse(&text);
        if outcome.has_errors() {
            let messages: Vec<String> = outcome.errors.iter().map(|e| e.to_string()).collect();
            failures.push(format!("{}: {}", path.display(), messages.join("; ")));
            continue;
        }
        if outcome.tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            failures.push(format!("{}: token stream not terminated", path.display()));
        }
        let Some(doc) = &outcome.document else {
            failures.push(format!("{}: no document", path.display()));
            continue;
        };
        if doc.diagrams.is_empty() || doc.diagrams.iter().any(|d| !d.terminated) {
            failures.push(format!("{}: diagram not closed", path.display()));
        }
    }

    assert!(
        failures.is_empty(),
        "fixture failures:\n{}",
        failures.join("\n")
    );
}
