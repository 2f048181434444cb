//! Best-effort repair of hand-edited PlantUML before it is parsed.

use regex::Regex;

pub const DEFAULT_MAX_LINES: usize = 1000;

const EMPTY_DIAGRAM: &str = "@startuml\n@enduml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairResult {
    pub code: String,
    /// Set when the input was cut down to the line limit.
    pub truncated: bool,
}

impl RepairResult {
    pub fn changed_from(&self, input: &str) -> bool {
        self.code != input
    }
}

fn start_directive_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)@startuml").expect("valid regex"))
}

fn end_directive_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)@enduml").expect("valid regex"))
}

fn line_ending_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r\n?|\\n").expect("valid regex"))
}

fn blank_run_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("valid regex"))
}

/// Wraps the text in `@startuml`/`@enduml` when either is missing, normalizes line endings
/// (including literal `\n` escapes), collapses runs of blank lines and caps the line count.
pub fn repair_source(input: &str, max_lines: usize) -> RepairResult {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return RepairResult {
            code: EMPTY_DIAGRAM.to_string(),
            truncated: false,
        };
    }

    let mut code = trimmed.to_string();
    if !start_directive_regex().is_match(&code) {
        code.insert_str(0, "@startuml\n");
    }
    if !end_directive_regex().is_match(&code) {
        code.push_str("\n@enduml");
    }

    let code = line_ending_regex().replace_all(&code, "\n");
    let mut code = blank_run_regex().replace_all(&code, "\n\n").into_owned();

    let line_count = code.split('\n').count();
    let truncated = line_count > max_lines;
    if truncated {
        tracing::warn!(
            lines = line_count,
            max_lines,
            "source exceeds line limit, truncating"
        );
        code = code
            .split('\n')
            .take(max_lines)
            .collect::<Vec<_>>()
            .join("\n");
        if !end_directive_regex().is_match(&code) {
            code.push_str("\n@enduml");
        }
    }

    RepairResult { code, truncated }
}
