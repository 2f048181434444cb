use super::token::{Token, TokenKind, arrow_class, keyword};
use crate::Diagnostic;

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub errors: Vec<Diagnostic>,
}

pub fn tokenize(input: &str) -> Lexed {
    Lexer::new(input).tokenize()
}

/// Hiragana, katakana and the CJK unified ideograph block.
pub fn is_japanese(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' | '\u{4E00}'..='\u{9FAF}')
}

pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || is_japanese(c)
}

pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || is_japanese(c)
}

pub(crate) struct Lexer<'input> {
    input: &'input str,
    pos: usize,
    line: usize,
    column: usize,
    line_has_content: bool,
    tokens: Vec<Token>,
    errors: Vec<Diagnostic>,
}

impl<'input> Lexer<'input> {
    pub(crate) fn new(input: &'input str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            line_has_content: false,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn tokenize(mut self) -> Lexed {
        while self.pos < self.input.len() {
            self.scan_token();
        }
        self.tokens.push(Token::eof(self.line, self.column, self.pos));
        Lexed {
            tokens: self.tokens,
            errors: self.errors,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize, column: usize) {
        self.line_has_content = kind != TokenKind::Newline;
        let text = &self.input[start..self.pos];
        self.tokens.push(Token::new(kind, text, line, column, start));
    }

    fn scan_token(&mut self) {
        let start = self.pos;
        let (line, column) = (self.line, self.column);
        let Some(c) = self.bump() else {
            return;
        };

        match c {
            ' ' | '\t' | '\r' => {}
            '\n' => self.push(TokenKind::Newline, start, line, column),
            ':' => self.push(TokenKind::Colon, start, line, column),
            ';' => self.push(TokenKind::Semicolon, start, line, column),
            ',' => self.push(TokenKind::Comma, start, line, column),
            '(' => self.push(TokenKind::LParen, start, line, column),
            ')' => self.push(TokenKind::RParen, start, line, column),
            '[' => self.push(TokenKind::LBracket, start, line, column),
            ']' => self.push(TokenKind::RBracket, start, line, column),
            '/' => match self.peek() {
                Some('\'') => {
                    self.bump();
                    self.block_comment(start, line, column);
                }
                Some('-') => self.arrow(start, line, column),
                _ => self.push(TokenKind::Unknown, start, line, column),
            },
            // `'` only opens a comment at the start of a line; mid-line it is an apostrophe.
            '\'' if !self.line_has_content => self.line_comment(start, line, column),
            '-' | '<' => self.arrow(start, line, column),
            '"' => self.string(start, line, column),
            '@' => self.directive(start, line, column),
            c if is_ident_start(c) => self.identifier(start, line, column),
            c if c.is_ascii_digit() => self.number(start, line, column),
            _ => self.push(TokenKind::Unknown, start, line, column),
        }
    }

    fn block_comment(&mut self, start: usize, line: usize, column: usize) {
        // An unterminated block comment runs to end of input without a diagnostic.
        while self.pos < self.input.len() {
            if self.peek() == Some('\'') && self.peek_next() == Some('/') {
                self.bump();
                self.bump();
                break;
            }
            self.bump();
        }
        self.push(TokenKind::Comment, start, line, column);
    }

    fn line_comment(&mut self, start: usize, line: usize, column: usize) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
        self.push(TokenKind::Comment, start, line, column);
    }

    fn string(&mut self, start: usize, line: usize, column: usize) {
        while let Some(c) = self.peek() {
            if c == '"' {
                break;
            }
            self.bump();
        }

        if self.peek().is_none() {
            self.errors
                .push(Diagnostic::lexical("Unterminated string", line, column, start));
            self.push(TokenKind::Unknown, start, line, column);
            return;
        }

        self.bump();
        self.push(TokenKind::String, start, line, column);
    }

    fn arrow(&mut self, start: usize, line: usize, column: usize) {
        while let Some(c) = self.peek() {
            if !matches!(c, '-' | '>' | '<' | '\\') {
                break;
            }
            self.bump();
        }

        if arrow_class(&self.input[start..self.pos]).is_some() {
            self.push(TokenKind::Arrow, start, line, column);
            return;
        }

        // Not a known arrow: back off to a single character so the rest is lexed normally.
        self.pos = start;
        self.line = line;
        self.column = column;
        self.bump();
        self.push(TokenKind::Unknown, start, line, column);
    }

    fn directive(&mut self, start: usize, line: usize, column: usize) {
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
            self.bump();
        }
        let word = self.input[start..self.pos].to_ascii_lowercase();
        let kind = keyword(&word).unwrap_or(TokenKind::Unknown);
        self.push(kind, start, line, column);
    }

    fn identifier(&mut self, start: usize, line: usize, column: usize) {
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        let word = self.input[start..self.pos].to_ascii_lowercase();
        let kind = keyword(&word).unwrap_or(TokenKind::Identifier);
        self.push(kind, start, line, column);
    }

    fn number(&mut self, start: usize, line: usize, column: usize) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        // Numbers have no kind of their own.
        self.push(TokenKind::Identifier, start, line, column);
    }
}
