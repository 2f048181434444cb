//! PlantUML sequence diagrams: tokens, lexer, AST and recursive-descent parser.

mod ast;
mod lexer;
mod parse;
mod stats;
mod token;

pub use ast::{Branch, Diagram, Document, NodeKind, NoteSide, ParticipantKind, Span, Statement};
pub use lexer::{Lexed, is_ident_char, is_ident_start, is_japanese, tokenize};
pub use parse::{Parsed, parse};
pub use stats::AstStatistics;
pub use token::{ArrowClass, Token, TokenKind, arrow_class, keyword};
