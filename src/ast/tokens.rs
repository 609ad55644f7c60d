use std::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::value::Value;

/// Lexical category of a token.
///
/// The set is closed: every token the lexer can produce belongs to exactly
/// one of these categories, and every reserved keyword has its own category.
/// Keyword membership is answered by [`TokenType::keyword`], which is the
/// single source of truth for the reserved-word set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // single-char tokens
    /// `*`
    Star,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `.`
    Dot,
    /// `=`
    Equal,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `,`
    Comma,
    /// `;`
    SemiColon,

    // 2-char tokens
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `<>` or `!=`
    NotEqual,

    // misc
    Eof,
    Identifier,
    Number,
    String,

    // keywords
    Select,
    From,
    Where,
    Join,
    On,
    Group,
    Order,
    By,
    Having,
    Case,
    Or,
    And,
    Not,
    Null,
    Create,
    Delete,
    Drop,
    Truncate,
    Update,
    Insert,
    Into,
    Table,
    Values,
    Set,
    Primary,
    Key,

    // datatype keywords
    Integer,
    Real,
    Text,
    Blob,
}

impl TokenType {
    /// Every keyword category, in declaration order.
    pub const KEYWORDS: &'static [TokenType] = &[
        TokenType::Select,
        TokenType::From,
        TokenType::Where,
        TokenType::Join,
        TokenType::On,
        TokenType::Group,
        TokenType::Order,
        TokenType::By,
        TokenType::Having,
        TokenType::Case,
        TokenType::Or,
        TokenType::And,
        TokenType::Not,
        TokenType::Null,
        TokenType::Create,
        TokenType::Delete,
        TokenType::Drop,
        TokenType::Truncate,
        TokenType::Update,
        TokenType::Insert,
        TokenType::Into,
        TokenType::Table,
        TokenType::Values,
        TokenType::Set,
        TokenType::Primary,
        TokenType::Key,
        TokenType::Integer,
        TokenType::Real,
        TokenType::Text,
        TokenType::Blob,
    ];

    /// Look up the keyword category for `text`, case-insensitively.
    ///
    /// Returns `None` for anything that is not a reserved word; the lexer
    /// then treats the text as an identifier.
    pub fn keyword(text: &str) -> Option<TokenType> {
        let lowered = text.to_ascii_lowercase();
        let kind = match lowered.as_str() {
            "select" => TokenType::Select,
            "from" => TokenType::From,
            "where" => TokenType::Where,
            "join" => TokenType::Join,
            "on" => TokenType::On,
            "group" => TokenType::Group,
            "order" => TokenType::Order,
            "by" => TokenType::By,
            "having" => TokenType::Having,
            "case" => TokenType::Case,
            "or" => TokenType::Or,
            "and" => TokenType::And,
            "not" => TokenType::Not,
            "null" => TokenType::Null,
            "create" => TokenType::Create,
            "delete" => TokenType::Delete,
            "drop" => TokenType::Drop,
            "truncate" => TokenType::Truncate,
            "update" => TokenType::Update,
            "insert" => TokenType::Insert,
            "into" => TokenType::Into,
            "table" => TokenType::Table,
            "values" => TokenType::Values,
            "set" => TokenType::Set,
            "primary" => TokenType::Primary,
            "key" => TokenType::Key,
            "integer" => TokenType::Integer,
            "real" => TokenType::Real,
            "text" => TokenType::Text,
            "blob" => TokenType::Blob,
            _ => return None,
        };
        Some(kind)
    }

    /// The reserved word this category stands for, if it is a keyword.
    pub fn keyword_lexeme(self) -> Option<&'static str> {
        let lexeme = match self {
            TokenType::Select => "select",
            TokenType::From => "from",
            TokenType::Where => "where",
            TokenType::Join => "join",
            TokenType::On => "on",
            TokenType::Group => "group",
            TokenType::Order => "order",
            TokenType::By => "by",
            TokenType::Having => "having",
            TokenType::Case => "case",
            TokenType::Or => "or",
            TokenType::And => "and",
            TokenType::Not => "not",
            TokenType::Null => "null",
            TokenType::Create => "create",
            TokenType::Delete => "delete",
            TokenType::Drop => "drop",
            TokenType::Truncate => "truncate",
            TokenType::Update => "update",
            TokenType::Insert => "insert",
            TokenType::Into => "into",
            TokenType::Table => "table",
            TokenType::Values => "values",
            TokenType::Set => "set",
            TokenType::Primary => "primary",
            TokenType::Key => "key",
            TokenType::Integer => "integer",
            TokenType::Real => "real",
            TokenType::Text => "text",
            TokenType::Blob => "blob",
            _ => return None,
        };
        Some(lexeme)
    }

    pub fn is_keyword(self) -> bool {
        self.keyword_lexeme().is_some()
    }
}

/// A token of the source text.
///
/// Tokens are produced by the external lexer and consumed by the external
/// parser; this crate only sees them as parse-tree leaves, for diagnostics
/// and printing.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenType,
    /// Raw source text of the token.
    pub lexeme: String,
    /// Decoded literal value, for number and string tokens.
    pub literal: Option<Value>,
    /// Source line the token starts on.
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenType, lexeme: String, literal: Option<Value>, line: usize) -> Self {
        Token {
            kind,
            lexeme,
            literal,
            line,
        }
    }

    pub fn identifier(name: &str, line: usize) -> Self {
        Token::new(TokenType::Identifier, name.to_string(), None, line)
    }

    /// A number token with its literal decoded from the lexeme.
    ///
    /// Returns `None` if the lexeme is not a valid numeric literal; the
    /// lexer reports that as its own lexical error.
    pub fn number(lexeme: &str, line: usize) -> Option<Self> {
        let literal = decode_number(lexeme)?;
        Some(Token::new(
            TokenType::Number,
            lexeme.to_string(),
            Some(literal),
            line,
        ))
    }

    /// A string token; `text` is the unquoted content.
    pub fn string(text: &str, line: usize) -> Self {
        Token::new(
            TokenType::String,
            text.to_string(),
            Some(Value::Text(text.to_string())),
            line,
        )
    }

    /// A keyword token, with the reserved word as its lexeme.
    ///
    /// Returns `None` if `kind` is not a keyword category.
    pub fn keyword(kind: TokenType, line: usize) -> Option<Self> {
        let lexeme = kind.keyword_lexeme()?;
        Some(Token::new(kind, lexeme.to_string(), None, line))
    }

    /// A punctuation token (operators, delimiters).
    pub fn punct(kind: TokenType, lexeme: &str, line: usize) -> Self {
        Token::new(kind, lexeme.to_string(), None, line)
    }

    pub fn eof(line: usize) -> Self {
        Token::new(TokenType::Eof, String::new(), None, line)
    }
}

impl fmt::Display for Token {
    /// `Category[tail]` where the tail is the decoded literal if present,
    /// else the raw lexeme; omitted entirely when both are empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tail = match &self.literal {
            Some(value) => value.to_string(),
            None => self.lexeme.clone(),
        };
        if tail.is_empty() {
            write!(f, "{:?}", self.kind)
        } else {
            write!(f, "{:?}[{}]", self.kind, tail)
        }
    }
}

/// Decode a numeric lexeme into a value.
///
/// Lexemes with a decimal point decode to `Real`; all-digit lexemes decode
/// to `Integer`, falling back to `Real` only when the magnitude exceeds the
/// integer range. Going through `Decimal` keeps large integers exact
/// instead of routing them through a float parse.
pub fn decode_number(lexeme: &str) -> Option<Value> {
    let decimal = Decimal::from_str_exact(lexeme).ok()?;
    if !lexeme.contains('.')
        && let Some(n) = decimal.to_i64()
    {
        return Some(Value::Integer(n));
    }
    decimal.to_f64().map(Value::Real)
}

#[test]
fn test_keyword_lookup_is_case_insensitive() {
    assert_eq!(TokenType::keyword("SELECT"), Some(TokenType::Select));
    assert_eq!(TokenType::keyword("Select"), Some(TokenType::Select));
    assert_eq!(TokenType::keyword("blob"), Some(TokenType::Blob));
    assert_eq!(TokenType::keyword("foo"), None);
}

#[test]
fn test_keyword_set_in_sync_with_categories() {
    // Round trip category -> lexeme -> category over the whole set.
    for kind in TokenType::KEYWORDS {
        let lexeme = kind.keyword_lexeme().expect("keyword without a lexeme");
        assert_eq!(TokenType::keyword(lexeme), Some(*kind));
    }
    // Non-keyword categories have no reserved word.
    assert!(!TokenType::Identifier.is_keyword());
    assert!(!TokenType::Star.is_keyword());
    assert!(!TokenType::Eof.is_keyword());
}

#[test]
fn test_number_decoding() {
    assert_eq!(decode_number("42"), Some(Value::Integer(42)));
    assert_eq!(decode_number("2.0"), Some(Value::Real(2.0)));
    // Exact at a magnitude where an f64 round trip would drift.
    assert_eq!(
        decode_number("9007199254740993"),
        Some(Value::Integer(9007199254740993))
    );
    assert_eq!(decode_number("4x"), None);
}

#[test]
fn test_token_display() {
    let tok = Token::number("42", 1).unwrap();
    assert_eq!(tok.to_string(), "Number[42]");
    let tok = Token::identifier("cola", 1);
    assert_eq!(tok.to_string(), "Identifier[cola]");
    assert_eq!(Token::eof(1).to_string(), "Eof");
}
