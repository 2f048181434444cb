use super::ast::{Branch, Diagram, Document, NoteSide, ParticipantKind, Span, Statement};
use super::token::{ArrowClass, Token, TokenKind, arrow_class};
use crate::Diagnostic;

#[derive(Debug, Clone, Default)]
pub struct Parsed {
    pub document: Document,
    pub errors: Vec<Diagnostic>,
}

/// Parses a token stream produced by [`super::tokenize`].
///
/// Never fails: malformed statements are reported in `errors` and skipped, and the returned
/// document holds everything that could be recovered.
pub fn parse(tokens: &[Token]) -> Parsed {
    Parser::new(tokens).parse_document()
}

struct Parser<'t> {
    tokens: &'t [Token],
    current: usize,
    eof: Token,
    errors: Vec<Diagnostic>,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        // Tolerate streams that were not produced by the lexer and lack a trailing EOF.
        let eof = match tokens.last() {
            Some(last) if last.is(TokenKind::Eof) => last.clone(),
            Some(last) => {
                let column = last.column + last.text.chars().count();
                Token::eof(last.line, column, last.end())
            }
            None => Token::eof(1, 1, 0),
        };
        Self {
            tokens,
            current: 0,
            eof,
            errors: Vec::new(),
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.current).unwrap_or(&self.eof)
    }

    fn peek_at(&self, ahead: usize) -> &Token {
        self.tokens.get(self.current + ahead).unwrap_or(&self.eof)
    }

    fn previous(&self) -> &Token {
        self.current
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .unwrap_or(&self.eof)
    }

    fn is_at_end(&self) -> bool {
        self.peek().is(TokenKind::Eof)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().is(kind)
    }

    fn check_word(&self, word: &str) -> bool {
        let tok = self.peek();
        tok.is(TokenKind::Identifier) && tok.text.eq_ignore_ascii_case(word)
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        tok
    }

    fn error_at_current(&mut self, message: impl Into<String>) {
        let diagnostic = Diagnostic::syntax(message, self.peek());
        self.errors.push(diagnostic);
    }

    fn span_from(&self, start: Span) -> Span {
        start.to(Span::of(self.previous()))
    }

    fn skip_separators(&mut self) {
        while self.peek().kind.is_statement_separator() {
            self.current += 1;
        }
    }

    fn at_line_end(&self) -> bool {
        let kind = self.peek().kind;
        kind.is_statement_separator() || matches!(kind, TokenKind::Eof | TokenKind::EndUml)
    }

    /// Drops the remaining tokens of the current line, leaving boundary keywords in place.
    fn skip_line(&mut self) {
        while !self.at_line_end() && !self.peek().kind.is_block_boundary() {
            self.current += 1;
        }
    }

    /// Panic-mode recovery: step over the offending token, then stop at the next newline or at
    /// a token that can start a construct.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            let kind = self.peek().kind;
            if kind == TokenKind::Newline
                || kind == TokenKind::StartUml
                || kind == TokenKind::EndUml
                || kind.is_participant_keyword()
                || kind.is_block_boundary()
            {
                return;
            }
            self.current += 1;
        }
    }

    fn parse_document(mut self) -> Parsed {
        let start = Span::of(self.peek());
        let mut diagrams = Vec::new();

        loop {
            self.skip_separators();
            if self.is_at_end() {
                break;
            }
            if self.check(TokenKind::StartUml) {
                diagrams.push(self.diagram());
                continue;
            }
            let unexpected = self.advance();
            tracing::trace!(token = %unexpected, "skipping token outside of a diagram");
            self.errors.push(Diagnostic::syntax(
                format!("Unexpected token: {}", unexpected.text),
                &unexpected,
            ));
        }

        let span = start.to(Span::of(self.peek()));
        Parsed {
            document: Document { diagrams, span },
            errors: self.errors,
        }
    }

    fn diagram(&mut self) -> Diagram {
        let start = Span::of(&self.advance());
        let statements = self.parse_block(&[]);

        let terminated = self.check(TokenKind::EndUml);
        if terminated {
            self.advance();
        } else {
            self.error_at_current("Expected @enduml");
        }

        Diagram {
            statements,
            span: self.span_from(start),
            terminated,
        }
    }

    /// Statements until one of `terminators`, `@enduml` or end of input. The terminator itself
    /// is left for the caller.
    fn parse_block(&mut self, terminators: &[TokenKind]) -> Vec<Statement> {
        let mut statements = Vec::new();
        loop {
            self.skip_separators();
            let kind = self.peek().kind;
            if matches!(kind, TokenKind::Eof | TokenKind::EndUml) || terminators.contains(&kind) {
                break;
            }

            let before = self.current;
            match self.statement() {
                Some(stmt) => statements.push(stmt),
                None if self.current == before => self.synchronize(),
                None => self.skip_line(),
            }
        }
        statements
    }

    fn statement(&mut self) -> Option<Statement> {
        let kind = self.peek().kind;
        match kind {
            k if k.is_participant_keyword() => self.participant(),
            TokenKind::Title => Some(self.title()),
            TokenKind::Note => self.note(),
            TokenKind::Alt => Some(self.alternative()),
            TokenKind::Loop => Some(self.loop_block()),
            TokenKind::Par => Some(self.parallel()),
            TokenKind::Opt => Some(self.optional()),
            TokenKind::Activate => self.activation(),
            TokenKind::Deactivate => self.deactivation(),
            TokenKind::Autonumber => Some(self.autonumber()),
            TokenKind::Skinparam => {
                self.advance();
                self.skip_line();
                None
            }
            TokenKind::Break | TokenKind::Critical | TokenKind::Group => {
                Some(self.unsupported_block())
            }
            _ => self.message(),
        }
    }

    fn name(&mut self) -> Option<Token> {
        if self.check(TokenKind::Identifier) || self.check(TokenKind::String) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn participant(&mut self) -> Option<Statement> {
        let keyword = self.advance();
        let kind = match keyword.kind {
            TokenKind::Actor => ParticipantKind::Actor,
            TokenKind::Boundary => ParticipantKind::Boundary,
            TokenKind::Control => ParticipantKind::Control,
            TokenKind::Entity => ParticipantKind::Entity,
            TokenKind::Database => ParticipantKind::Database,
            TokenKind::Collections => ParticipantKind::Collections,
            TokenKind::Queue => ParticipantKind::Queue,
            _ => ParticipantKind::Participant,
        };

        let Some(name) = self.name() else {
            self.error_at_current("Expected participant name");
            return None;
        };

        let mut alias = None;
        if self.check_word("as") {
            self.advance();
            match self.name() {
                Some(tok) => alias = Some(tok.value().to_string()),
                None => self.error_at_current("Expected participant alias"),
            }
        }
        let span = self.span_from(Span::of(&keyword));

        // Colors, stereotypes and ordering hints are accepted and dropped.
        self.skip_line();

        Some(Statement::Participant {
            kind,
            name: name.value().to_string(),
            alias,
            span,
        })
    }

    fn message(&mut self) -> Option<Statement> {
        let Some(from) = self.name() else {
            self.error_at_current("Expected message sender");
            return None;
        };
        if !self.check(TokenKind::Arrow) {
            self.error_at_current("Expected arrow");
            return None;
        }
        let arrow = self.advance();
        let Some(to) = self.name() else {
            self.error_at_current("Expected message receiver");
            return None;
        };

        let text = if self.check(TokenKind::Colon) {
            self.advance();
            self.rest_of_line()
        } else {
            String::new()
        };

        let class = arrow_class(&arrow.text);
        Some(Statement::Message {
            from: from.value().to_string(),
            to: to.value().to_string(),
            text,
            is_async: class == Some(ArrowClass::Async),
            is_return: class == Some(ArrowClass::Return),
            arrow: arrow.text,
            span: self.span_from(Span::of(&from)),
        })
    }

    fn title(&mut self) -> Statement {
        let start = Span::of(&self.advance());
        let text = self.rest_of_line();
        Statement::Title {
            text,
            span: self.span_from(start),
        }
    }

    fn autonumber(&mut self) -> Statement {
        let start = Span::of(&self.advance());
        let mut first = None;
        if self.check(TokenKind::Identifier) {
            first = self.peek().text.parse::<u32>().ok();
            if first.is_some() {
                self.advance();
            }
        }
        let span = self.span_from(start);
        // Step and format arguments are not modelled.
        self.skip_line();
        Statement::Autonumber { start: first, span }
    }

    fn activation(&mut self) -> Option<Statement> {
        let start = Span::of(&self.advance());
        let Some(target) = self.name() else {
            self.error_at_current("Expected target for activation");
            return None;
        };
        Some(Statement::Activation {
            target: target.value().to_string(),
            span: self.span_from(start),
        })
    }

    fn deactivation(&mut self) -> Option<Statement> {
        let start = Span::of(&self.advance());
        let Some(target) = self.name() else {
            self.error_at_current("Expected target for deactivation");
            return None;
        };
        Some(Statement::Deactivation {
            target: target.value().to_string(),
            span: self.span_from(start),
        })
    }

    fn note(&mut self) -> Option<Statement> {
        let start = Span::of(&self.advance());

        let mut side = NoteSide::Right;
        let mut target = None;
        if self.check_word("left") || self.check_word("right") {
            if self.advance().text.eq_ignore_ascii_case("left") {
                side = NoteSide::Left;
            }
            if self.check_word("of") {
                self.advance();
            }
            target = self.note_targets();
        } else if self.check_word("over") {
            self.advance();
            side = NoteSide::Over;
            target = self.note_targets();
            if target.is_none() {
                self.error_at_current("Expected note target");
                return None;
            }
        }

        let text = if self.check(TokenKind::Colon) {
            self.advance();
            self.rest_of_line()
        } else if self.at_line_end() {
            self.multiline_note()?
        } else {
            self.error_at_current("Expected ':' after note");
            return None;
        };

        Some(Statement::Note {
            text,
            target,
            side,
            span: self.span_from(start),
        })
    }

    /// `A` or `A, B`, joined as written.
    fn note_targets(&mut self) -> Option<String> {
        let first = self.name()?;
        let mut targets = first.value().to_string();
        while self.check(TokenKind::Comma) {
            let next = self.peek_at(1);
            if !matches!(next.kind, TokenKind::Identifier | TokenKind::String) {
                break;
            }
            self.advance();
            let next = self.advance();
            targets.push_str(", ");
            targets.push_str(next.value());
        }
        Some(targets)
    }

    /// Body lines of a note closed by `end note`.
    fn multiline_note(&mut self) -> Option<String> {
        let mut lines = Vec::new();
        loop {
            self.skip_separators();
            if self.is_at_end() || self.check(TokenKind::EndUml) {
                self.error_at_current("Expected end note");
                return None;
            }
            if self.check(TokenKind::End) && self.peek_at(1).is(TokenKind::Note) {
                self.advance();
                self.advance();
                return Some(lines.join("\n"));
            }
            lines.push(self.rest_of_line());
        }
    }

    fn alternative(&mut self) -> Statement {
        let start = Span::of(&self.advance());
        let condition = self.collect_condition();
        let statements = self.parse_block(&[TokenKind::Else, TokenKind::End]);

        let mut branches = vec![Branch {
            condition: condition.clone(),
            statements,
            span: self.span_from(start),
        }];
        while self.check(TokenKind::Else) {
            branches.push(self.branch(&[TokenKind::Else, TokenKind::End]));
        }

        self.expect_end("alt");
        Statement::Alternative {
            condition,
            branches,
            span: self.span_from(start),
        }
    }

    fn parallel(&mut self) -> Statement {
        const TERMINATORS: &[TokenKind] = &[TokenKind::Else, TokenKind::Also, TokenKind::End];

        let start = Span::of(&self.advance());
        let condition = self.collect_condition();
        let statements = self.parse_block(TERMINATORS);

        let mut branches = vec![Branch {
            condition,
            statements,
            span: self.span_from(start),
        }];
        while self.check(TokenKind::Else) || self.check(TokenKind::Also) {
            branches.push(self.branch(TERMINATORS));
        }

        self.expect_end("par");
        Statement::Parallel {
            branches,
            span: self.span_from(start),
        }
    }

    /// One `else`/`also` branch: separator keyword, label, body.
    fn branch(&mut self, terminators: &[TokenKind]) -> Branch {
        let start = Span::of(&self.advance());
        let condition = self.collect_condition();
        let statements = self.parse_block(terminators);
        Branch {
            condition,
            statements,
            span: self.span_from(start),
        }
    }

    fn loop_block(&mut self) -> Statement {
        let start = Span::of(&self.advance());
        let condition = self.collect_condition();
        let statements = self.parse_block(&[TokenKind::End]);
        self.expect_end("loop");
        Statement::Loop {
            condition,
            statements,
            span: self.span_from(start),
        }
    }

    fn optional(&mut self) -> Statement {
        let start = Span::of(&self.advance());
        let condition = self.collect_condition();
        let statements = self.parse_block(&[TokenKind::End]);
        self.expect_end("opt");
        Statement::Optional {
            condition,
            statements,
            span: self.span_from(start),
        }
    }

    /// `break`, `critical` and `group` are recognized so their `end` pairs up, but their body
    /// is not modelled.
    fn unsupported_block(&mut self) -> Statement {
        let keyword = self.advance();
        let name = keyword.text.to_ascii_lowercase();
        let message = format!("Unsupported block: {name}");
        self.errors.push(Diagnostic::syntax(message.clone(), &keyword));

        self.collect_condition();
        let discarded = self.parse_block(&[TokenKind::End]);
        tracing::debug!(
            block = %name,
            statements = discarded.len(),
            "discarding unsupported block"
        );
        self.expect_end(&name);

        Statement::Error {
            message,
            span: self.span_from(Span::of(&keyword)),
        }
    }

    fn expect_end(&mut self, block: &str) {
        if self.check(TokenKind::End) {
            self.advance();
        } else {
            self.error_at_current(format!("Expected end for {block} block"));
        }
    }

    /// Free-form condition text up to the end of the line or the next block keyword.
    fn collect_condition(&mut self) -> String {
        let start = self.current;
        while !self.at_line_end()
            && !self.peek().kind.is_block_boundary()
            && !self.check(TokenKind::StartUml)
        {
            self.current += 1;
        }
        join_tokens(&self.tokens[start..self.current])
    }

    /// Everything up to the end of the line, keywords included.
    fn rest_of_line(&mut self) -> String {
        let start = self.current;
        while !self.at_line_end() {
            self.current += 1;
        }
        join_tokens(&self.tokens[start..self.current])
    }
}

/// Rejoins a run of tokens with a single space wherever the source had a gap. A lone string
/// token yields its unquoted value.
fn join_tokens(tokens: &[Token]) -> String {
    if let [only] = tokens {
        return only.value().to_string();
    }

    let mut out = String::new();
    let mut prev_end = None;
    for tok in tokens {
        if prev_end.is_some_and(|end| tok.offset > end) {
            out.push(' ');
        }
        out.push_str(&tok.text);
        prev_end = Some(tok.end());
    }
    out
}
