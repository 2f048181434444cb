use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    StartUml,
    EndUml,

    Participant,
    Actor,
    Boundary,
    Control,
    Entity,
    Database,
    Collections,
    Queue,

    Title,
    Note,
    Autonumber,
    Activate,
    Deactivate,
    Skinparam,

    Alt,
    Else,
    Also,
    End,
    Loop,
    Par,
    Opt,
    Break,
    Critical,
    Group,

    Colon,
    Semicolon,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,

    Arrow,
    String,
    Identifier,
    Comment,
    Newline,
    Unknown,
    Eof,
}

impl TokenKind {
    pub fn is_participant_keyword(self) -> bool {
        matches!(
            self,
            Self::Participant
                | Self::Actor
                | Self::Boundary
                | Self::Control
                | Self::Entity
                | Self::Database
                | Self::Collections
                | Self::Queue
        )
    }

    pub fn is_block_start(self) -> bool {
        matches!(
            self,
            Self::Alt
                | Self::Loop
                | Self::Par
                | Self::Opt
                | Self::Break
                | Self::Critical
                | Self::Group
        )
    }

    /// Tokens that open, split or close a block. Free-text collection stops here.
    pub fn is_block_boundary(self) -> bool {
        self.is_block_start() || matches!(self, Self::Else | Self::Also | Self::End)
    }

    pub fn is_statement_separator(self) -> bool {
        matches!(self, Self::Newline | Self::Comment)
    }
}

/// Maps a lower-cased word (or `@directive`) to its keyword kind.
pub fn keyword(lowercase: &str) -> Option<TokenKind> {
    let kind = match lowercase {
        "@startuml" => TokenKind::StartUml,
        "@enduml" => TokenKind::EndUml,
        "participant" => TokenKind::Participant,
        "actor" => TokenKind::Actor,
        "boundary" => TokenKind::Boundary,
        "control" => TokenKind::Control,
        "entity" => TokenKind::Entity,
        "database" => TokenKind::Database,
        "collections" => TokenKind::Collections,
        "queue" => TokenKind::Queue,
        "title" => TokenKind::Title,
        "note" => TokenKind::Note,
        "autonumber" => TokenKind::Autonumber,
        "activate" => TokenKind::Activate,
        "deactivate" => TokenKind::Deactivate,
        "skinparam" => TokenKind::Skinparam,
        "alt" => TokenKind::Alt,
        "else" => TokenKind::Else,
        "also" => TokenKind::Also,
        "end" => TokenKind::End,
        "loop" => TokenKind::Loop,
        "par" => TokenKind::Par,
        "opt" => TokenKind::Opt,
        "break" => TokenKind::Break,
        "critical" => TokenKind::Critical,
        "group" => TokenKind::Group,
        _ => return None,
    };
    Some(kind)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowClass {
    Sync,
    Async,
    Return,
    Reverse,
    Lost,
    Found,
}

/// Recognized arrow spellings. Anything else that looks like an arrow lexes as `Unknown`.
pub fn arrow_class(text: &str) -> Option<ArrowClass> {
    let class = match text {
        "->" | "->>" => ArrowClass::Sync,
        "-->" | "-->>" => ArrowClass::Async,
        "<<-" | "<<--" => ArrowClass::Return,
        "<-" | "<--" => ArrowClass::Reverse,
        "-\\" | "--\\" => ArrowClass::Lost,
        "/-" | "/--" => ArrowClass::Found,
        _ => return None,
    };
    Some(class)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source slice, quotes included for strings.
    pub text: String,
    pub line: usize,
    pub column: usize,
    /// Byte offset into the source.
    pub offset: usize,
    /// Byte length of `text`.
    pub length: usize,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        line: usize,
        column: usize,
        offset: usize,
    ) -> Self {
        let text = text.into();
        let length = text.len();
        Self {
            kind,
            text,
            line,
            column,
            offset,
            length,
        }
    }

    pub fn eof(line: usize, column: usize, offset: usize) -> Self {
        Self::new(TokenKind::Eof, "", line, column, offset)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Semantic value: string tokens lose their quotes, everything else is returned verbatim.
    pub fn value(&self) -> &str {
        if self.kind == TokenKind::String {
            let inner = self.text.strip_prefix('"').unwrap_or(&self.text);
            return inner.strip_suffix('"').unwrap_or(inner);
        }
        &self.text
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Token({:?}, {:?}, {}:{})",
            self.kind, self.text, self.line, self.column
        )
    }
}
