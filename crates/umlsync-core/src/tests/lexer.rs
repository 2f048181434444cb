use crate::sequence::{TokenKind, tokenize};

fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input).tokens.iter().map(|t| t.kind).collect()
}

#[test]
fn lexer_simple_message_yields_identifier_arrow_identifier() {
    let lexed = tokenize("A->B");
    assert!(lexed.errors.is_empty());
    let pairs: Vec<_> = lexed
        .tokens
        .iter()
        .map(|t| (t.kind, t.text.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (TokenKind::Identifier, "A"),
            (TokenKind::Arrow, "->"),
            (TokenKind::Identifier, "B"),
            (TokenKind::Eof, ""),
        ]
    );
}

#[test]
fn lexer_arrows_are_maximal() {
    for arrow in ["->", "->>", "-->", "-->>", "<-", "<--", "<<-", "<<--", "-\\", "--\\", "/-", "/--"] {
        let input = format!("A {arrow} B");
        let lexed = tokenize(&input);
        assert_eq!(lexed.tokens[1].kind, TokenKind::Arrow, "{arrow}");
        assert_eq!(lexed.tokens[1].text, arrow);
    }
}

#[test]
fn lexer_unknown_arrow_backtracks_to_one_char() {
    let lexed = tokenize("A --- B");
    assert_eq!(lexed.tokens[1].kind, TokenKind::Unknown);
    assert_eq!(lexed.tokens[1].text, "-");
    // The remaining `--` is re-lexed on its own and is not an arrow either.
    assert_eq!(lexed.tokens[2].text, "-");
    assert_eq!(lexed.tokens[3].text, "-");
    assert_eq!(lexed.tokens[4].kind, TokenKind::Identifier);
}

#[test]
fn lexer_keywords_are_case_insensitive() {
    assert_eq!(
        kinds("@StartUML\nALT x\nElse\nEND\n@enduml"),
        vec![
            TokenKind::StartUml,
            TokenKind::Newline,
            TokenKind::Alt,
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Else,
            TokenKind::Newline,
            TokenKind::End,
            TokenKind::Newline,
            TokenKind::EndUml,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lexer_unknown_directive_is_unknown() {
    let lexed = tokenize("@startmindmap");
    assert_eq!(lexed.tokens[0].kind, TokenKind::Unknown);
    assert_eq!(lexed.tokens[0].text, "@startmindmap");
}

#[test]
fn lexer_tracks_lines_and_columns() {
    let lexed = tokenize("A -> B\n  C -> D");
    let c = &lexed.tokens[4];
    assert_eq!(c.text, "C");
    assert_eq!((c.line, c.column, c.offset), (2, 3, 9));
    let eof = lexed.tokens.last().unwrap();
    assert_eq!(eof.kind, TokenKind::Eof);
    assert_eq!(eof.offset, 15);
}

#[test]
fn lexer_columns_count_characters_not_bytes() {
    let lexed = tokenize("ユーザー -> B");
    assert_eq!(lexed.tokens[0].kind, TokenKind::Identifier);
    assert_eq!(lexed.tokens[0].text, "ユーザー");
    assert_eq!(lexed.tokens[1].column, 6);
    assert_eq!(lexed.tokens[1].offset, "ユーザー ".len());
}

#[test]
fn lexer_identifiers_may_mix_scripts() {
    let lexed = tokenize("user_1さん 漢字ABC");
    assert_eq!(lexed.tokens[0].text, "user_1さん");
    assert_eq!(lexed.tokens[1].text, "漢字ABC");
    assert!(lexed.tokens[..2].iter().all(|t| t.kind == TokenKind::Identifier));
}

#[test]
fn lexer_numbers_fold_into_identifiers() {
    let lexed = tokenize("autonumber 10 3.14 1.");
    assert_eq!(lexed.tokens[1].kind, TokenKind::Identifier);
    assert_eq!(lexed.tokens[2].text, "3.14");
    assert_eq!(lexed.tokens[3].text, "1");
    assert_eq!(lexed.tokens[4].kind, TokenKind::Unknown);
}

#[test]
fn lexer_strings_keep_quotes_in_text() {
    let lexed = tokenize(r#"actor "Web User" as W"#);
    let s = &lexed.tokens[1];
    assert_eq!(s.kind, TokenKind::String);
    assert_eq!(s.text, "\"Web User\"");
    assert_eq!(s.value(), "Web User");
    assert_eq!(s.length, 10);
}

#[test]
fn lexer_unterminated_string_reports_once_and_keeps_rest() {
    let lexed = tokenize("A -> B : \"oops\nC -> D");
    assert_eq!(lexed.errors.len(), 1);
    assert_eq!(lexed.errors[0].message, "Unterminated string");
    assert_eq!((lexed.errors[0].line, lexed.errors[0].column), (1, 10));

    let last = &lexed.tokens[lexed.tokens.len() - 2];
    assert_eq!(last.kind, TokenKind::Unknown);
    assert_eq!(last.text, "\"oops\nC -> D");
}

#[test]
fn lexer_block_comment_spans_lines() {
    let lexed = tokenize("/' one\ntwo '/\nA");
    assert_eq!(lexed.tokens[0].kind, TokenKind::Comment);
    assert_eq!(lexed.tokens[0].text, "/' one\ntwo '/");
    let a = &lexed.tokens[2];
    assert_eq!((a.text.as_str(), a.line), ("A", 3));
}

#[test]
fn lexer_unterminated_block_comment_is_absorbed_silently() {
    let lexed = tokenize("A\n/' never closed\nB -> C");
    assert!(lexed.errors.is_empty());
    assert_eq!(
        kinds("A\n/' never closed\nB -> C"),
        vec![
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Comment,
            TokenKind::Eof
        ]
    );
}

#[test]
fn lexer_apostrophe_is_comment_only_at_line_start() {
    assert_eq!(
        kinds("  ' a comment\nA -> B : don't"),
        vec![
            TokenKind::Comment,
            TokenKind::Newline,
            TokenKind::Identifier,
            TokenKind::Arrow,
            TokenKind::Identifier,
            TokenKind::Colon,
            TokenKind::Identifier,
            TokenKind::Unknown,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lexer_punctuation() {
    assert_eq!(
        kinds(":;,()[]"),
        vec![
            TokenKind::Colon,
            TokenKind::Semicolon,
            TokenKind::Comma,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lexer_empty_input_is_just_eof() {
    let lexed = tokenize("");
    assert_eq!(lexed.tokens.len(), 1);
    assert_eq!(lexed.tokens[0].kind, TokenKind::Eof);
    assert_eq!((lexed.tokens[0].line, lexed.tokens[0].column), (1, 1));
}
