use crate::sequence::{TokenKind, tokenize};
use crate::*;
use proptest::prelude::*;

const WORDS: &[&str] = &[
    "@startuml", "@enduml", "participant", "actor", "as", "alt", "else", "also", "end", "loop",
    "par", "opt", "group", "note", "left", "over", "of", "title", "activate", "deactivate",
    "autonumber", ":", ",", "->", "-->", "<<-", "---", "A", "B", "ユーザー", "\"s\"", "\"", "/'",
    "'/", "'", "\n", "\n", "\n",
];

fn token_soup() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 0..80).prop_map(|words| words.join(" "))
}

fn assert_lexer_covers_input(input: &str) {
    let lexed = tokenize(input);
    let (last, rest) = lexed.tokens.split_last().expect("at least EOF");
    assert_eq!(last.kind, TokenKind::Eof);
    assert_eq!(last.offset, input.len());
    assert!(rest.iter().all(|t| t.kind != TokenKind::Eof));

    let mut cursor = 0;
    for tok in rest {
        assert!(tok.offset >= cursor, "overlapping token {tok}");
        assert!(
            input[cursor..tok.offset]
                .chars()
                .all(|c| matches!(c, ' ' | '\t' | '\r')),
            "non-whitespace dropped before {tok}"
        );
        assert_eq!(&input[tok.offset..tok.end()], tok.text);
        assert!(tok.length > 0);
        cursor = tok.end();
    }
    assert!(
        input[cursor..]
            .chars()
            .all(|c| matches!(c, ' ' | '\t' | '\r'))
    );
}

proptest! {
    #[test]
    fn lexer_total_coverage_on_arbitrary_text(input in "[ -~\t\r\nあア漢ー]{0,200}") {
        assert_lexer_covers_input(&input);
    }

    #[test]
    fn lexer_total_coverage_on_token_soup(input in token_soup()) {
        assert_lexer_covers_input(&input);
    }

    #[test]
    fn parser_terminates_and_positions_are_in_bounds(input in token_soup()) {
        let outcome = parse_source(&input);
        prop_assert!(outcome.document.is_some());
        for err in &outcome.errors {
            prop_assert!(err.position <= input.len());
            prop_assert!(err.line >= 1);
        }
    }

    #[test]
    fn parser_diagnostics_point_into_the_source(input in "[ -~\n]{0,200}") {
        let outcome = parse_source(&input);
        let last_line = outcome.tokens.last().map_or(1, |t| t.line);
        for err in &outcome.errors {
            prop_assert!(err.line <= last_line);
            prop_assert!(err.position <= input.len());
        }
    }
}
