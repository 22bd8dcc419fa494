//! Template lexer and parser

pub mod lexer;
pub mod message_parser;

pub use lexer::{Lexer, Token, TokenType};
pub use message_parser::MessageParser;
