//! Token types for JavaScript, Flow and JSX.
//!
//! Contextual words (`of`, `as`, `from`, `get`, `set`, `static`, `async`)
//! are always produced as identifiers. `await`, `yield`, `type` and
//! `interface` become keyword kinds only when the parser has told the lexer
//! that the surrounding context makes them keywords.

use std::fmt;

use crate::span::Span;

/// A token with its kind and source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// A line terminator was crossed between the previous token and this one.
    pub newline_before: bool,
    /// An automatic semicolon may be inserted before this token.
    pub asi: bool,
}

impl Token {
    /// Create a new token.
    #[inline]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span, newline_before: false, asi: false }
    }

    /// The exact source text this token was scanned from.
    pub fn literal<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.span.start as usize..self.span.end as usize).unwrap_or("")
    }
}

/// Cooked and raw text of one template literal chunk.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplateChunk {
    pub cooked: String,
    pub raw: String,
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // === Literals ===
    /// Identifier: `foo`, `_bar`, `$baz`
    Identifier(String),
    /// Private class name: `#field`
    PrivateName(String),
    /// String literal (cooked value): `"hello"`, `'world'`
    String(String),
    /// Number literal: `42`, `3.14`, `0xff`, `017`
    Number(f64),
    /// BigInt literal digits without the `n`: `42n`
    BigInt(String),
    /// Regular expression: `/pattern/flags`
    Regex { pattern: String, flags: String },
    /// Template literal without substitutions
    TemplateNoSub(TemplateChunk),
    /// Template head: `` `hello ${``
    TemplateHead(TemplateChunk),
    /// Template middle: `` } middle ${``
    TemplateMiddle(TemplateChunk),
    /// Template tail: `` } end` ``
    TemplateTail(TemplateChunk),

    // === JSX (only produced by the JSX scan methods) ===
    /// Text between JSX tags
    JsxText(String),
    /// `<>`
    JsxFragmentOpen,
    /// `</`
    JsxCloseTag,
    /// `</>`
    JsxFragmentClose,
    /// `/>`
    JsxSelfClose,

    // === Keywords ===
    Var,
    Let,
    Const,
    Function,
    Class,
    If,
    Else,
    Switch,
    Case,
    Default,
    For,
    While,
    Do,
    Break,
    Continue,
    Return,
    Try,
    Catch,
    Finally,
    Throw,
    New,
    Delete,
    Typeof,
    Void,
    In,
    Instanceof,
    This,
    Super,
    Null,
    True,
    False,
    Import,
    Export,
    Extends,
    With,
    Debugger,
    Enum,

    // === Contextual keywords (promoted by lexer context) ===
    Await,
    Yield,
    Type,
    Interface,

    // === Punctuation ===
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Colon,
    Dot,
    /// `...`
    Spread,
    Question,
    /// `?.`
    QuestionDot,
    /// `=>`
    Arrow,
    At,

    // === Operators ===
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,
    PlusPlus,
    MinusMinus,
    Lt,
    LtEq,
    Gt,
    GtEq,
    EqEq,
    EqEqEq,
    BangEq,
    BangEqEq,
    LtLt,
    GtGt,
    GtGtGt,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Bang,
    AmpAmp,
    PipePipe,
    QuestionQuestion,

    // === Assignment ===
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    StarStarEq,
    LtLtEq,
    GtGtEq,
    GtGtGtEq,
    AmpEq,
    PipeEq,
    CaretEq,
    AmpAmpEq,
    PipePipeEq,
    QuestionQuestionEq,

    // === Special ===
    Eof,
    /// A malformed token. Carries the diagnostic the parser reports.
    Illegal(String),
}

impl TokenKind {
    /// Check if this is a reserved keyword (contextual keywords excluded).
    pub fn is_keyword(&self) -> bool {
        self.keyword_text().is_some()
    }

    /// Spelling of a keyword token, including promoted contextual keywords.
    pub fn keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Var => "var",
            TokenKind::Let => "let",
            TokenKind::Const => "const",
            TokenKind::Function => "function",
            TokenKind::Class => "class",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::Switch => "switch",
            TokenKind::Case => "case",
            TokenKind::Default => "default",
            TokenKind::For => "for",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Return => "return",
            TokenKind::Try => "try",
            TokenKind::Catch => "catch",
            TokenKind::Finally => "finally",
            TokenKind::Throw => "throw",
            TokenKind::New => "new",
            TokenKind::Delete => "delete",
            TokenKind::Typeof => "typeof",
            TokenKind::Void => "void",
            TokenKind::In => "in",
            TokenKind::Instanceof => "instanceof",
            TokenKind::This => "this",
            TokenKind::Super => "super",
            TokenKind::Null => "null",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Import => "import",
            TokenKind::Export => "export",
            TokenKind::Extends => "extends",
            TokenKind::With => "with",
            TokenKind::Debugger => "debugger",
            TokenKind::Enum => "enum",
            TokenKind::Await => "await",
            TokenKind::Yield => "yield",
            TokenKind::Type => "type",
            TokenKind::Interface => "interface",
            _ => return None,
        };
        Some(text)
    }

    /// The word this token spells if it is an identifier or any keyword.
    ///
    /// Property names after `.` and in object literals accept every word.
    pub fn as_word(&self) -> Option<&str> {
        match self {
            TokenKind::Identifier(name) => Some(name),
            other => other.keyword_text(),
        }
    }

    /// Whether this token can start an expression.
    pub fn can_start_expr(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier(_)
                | TokenKind::PrivateName(_)
                | TokenKind::String(_)
                | TokenKind::Number(_)
                | TokenKind::BigInt(_)
                | TokenKind::Regex { .. }
                | TokenKind::TemplateNoSub(_)
                | TokenKind::TemplateHead(_)
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::Function
                | TokenKind::Class
                | TokenKind::New
                | TokenKind::Delete
                | TokenKind::Typeof
                | TokenKind::Void
                | TokenKind::This
                | TokenKind::Super
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Import
                | TokenKind::Await
                | TokenKind::Yield
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::Tilde
                | TokenKind::Bang
                | TokenKind::Slash
                | TokenKind::SlashEq
                | TokenKind::Lt
                | TokenKind::Spread
        )
    }

    /// Tokens after which a line break opens an automatic-semicolon slot.
    pub fn ends_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier(_)
                | TokenKind::PrivateName(_)
                | TokenKind::String(_)
                | TokenKind::Number(_)
                | TokenKind::BigInt(_)
                | TokenKind::Regex { .. }
                | TokenKind::TemplateNoSub(_)
                | TokenKind::TemplateTail(_)
                | TokenKind::This
                | TokenKind::Super
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Debugger
                | TokenKind::Yield
                | TokenKind::Await
                | TokenKind::Type
                | TokenKind::Interface
                | TokenKind::Gt
                | TokenKind::JsxSelfClose
        )
    }

    /// Check if this is an assignment operator.
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::PercentEq
                | TokenKind::StarStarEq
                | TokenKind::AmpEq
                | TokenKind::PipeEq
                | TokenKind::CaretEq
                | TokenKind::LtLtEq
                | TokenKind::GtGtEq
                | TokenKind::GtGtGtEq
                | TokenKind::AmpAmpEq
                | TokenKind::PipePipeEq
                | TokenKind::QuestionQuestionEq
        )
    }

    /// Get the precedence of a binary operator (higher = binds tighter).
    /// Returns None if not a binary operator.
    pub fn binary_precedence(&self) -> Option<u8> {
        match self {
            TokenKind::QuestionQuestion => Some(1),
            TokenKind::PipePipe => Some(2),
            TokenKind::AmpAmp => Some(3),
            TokenKind::Pipe => Some(4),
            TokenKind::Caret => Some(5),
            TokenKind::Amp => Some(6),
            TokenKind::EqEq | TokenKind::EqEqEq | TokenKind::BangEq | TokenKind::BangEqEq => Some(7),
            TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq
            | TokenKind::In
            | TokenKind::Instanceof => Some(8),
            TokenKind::LtLt | TokenKind::GtGt | TokenKind::GtGtGt => Some(9),
            TokenKind::Plus | TokenKind::Minus => Some(10),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some(11),
            TokenKind::StarStar => Some(12),
            _ => None,
        }
    }

    /// Check if this binary operator is right associative.
    pub fn is_right_associative(&self) -> bool {
        matches!(self, TokenKind::StarStar)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(word) = self.keyword_text() {
            return f.write_str(word);
        }
        let text = match self {
            TokenKind::Identifier(name) => return f.write_str(name),
            TokenKind::PrivateName(name) => return write!(f, "#{name}"),
            TokenKind::String(value) => return write!(f, "{value:?}"),
            TokenKind::Number(value) => return write!(f, "{value}"),
            TokenKind::BigInt(digits) => return write!(f, "{digits}n"),
            TokenKind::Regex { pattern, flags } => return write!(f, "/{pattern}/{flags}"),
            TokenKind::TemplateNoSub(_)
            | TokenKind::TemplateHead(_)
            | TokenKind::TemplateMiddle(_)
            | TokenKind::TemplateTail(_) => "template literal",
            TokenKind::JsxText(_) => "JSX text",
            TokenKind::JsxFragmentOpen => "<>",
            TokenKind::JsxCloseTag => "</",
            TokenKind::JsxFragmentClose => "</>",
            TokenKind::JsxSelfClose => "/>",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Dot => ".",
            TokenKind::Spread => "...",
            TokenKind::Question => "?",
            TokenKind::QuestionDot => "?.",
            TokenKind::Arrow => "=>",
            TokenKind::At => "@",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::StarStar => "**",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::EqEq => "==",
            TokenKind::EqEqEq => "===",
            TokenKind::BangEq => "!=",
            TokenKind::BangEqEq => "!==",
            TokenKind::LtLt => "<<",
            TokenKind::GtGt => ">>",
            TokenKind::GtGtGt => ">>>",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::Bang => "!",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::QuestionQuestion => "??",
            TokenKind::Eq => "=",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::StarStarEq => "**=",
            TokenKind::LtLtEq => "<<=",
            TokenKind::GtGtEq => ">>=",
            TokenKind::GtGtGtEq => ">>>=",
            TokenKind::AmpEq => "&=",
            TokenKind::PipeEq => "|=",
            TokenKind::CaretEq => "^=",
            TokenKind::AmpAmpEq => "&&=",
            TokenKind::PipePipeEq => "||=",
            TokenKind::QuestionQuestionEq => "??=",
            TokenKind::Eof => "end of input",
            TokenKind::Illegal(message) => return f.write_str(message),
            _ => "token",
        };
        f.write_str(text)
    }
}

/// Look up a reserved keyword from an identifier string.
///
/// Contextual keywords are not in this table; see [`contextual_keyword`].
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    match s {
        "var" => Some(TokenKind::Var),
        "let" => Some(TokenKind::Let),
        "const" => Some(TokenKind::Const),
        "function" => Some(TokenKind::Function),
        "class" => Some(TokenKind::Class),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "switch" => Some(TokenKind::Switch),
        "case" => Some(TokenKind::Case),
        "default" => Some(TokenKind::Default),
        "for" => Some(TokenKind::For),
        "while" => Some(TokenKind::While),
        "do" => Some(TokenKind::Do),
        "break" => Some(TokenKind::Break),
        "continue" => Some(TokenKind::Continue),
        "return" => Some(TokenKind::Return),
        "try" => Some(TokenKind::Try),
        "catch" => Some(TokenKind::Catch),
        "finally" => Some(TokenKind::Finally),
        "throw" => Some(TokenKind::Throw),
        "new" => Some(TokenKind::New),
        "delete" => Some(TokenKind::Delete),
        "typeof" => Some(TokenKind::Typeof),
        "void" => Some(TokenKind::Void),
        "in" => Some(TokenKind::In),
        "instanceof" => Some(TokenKind::Instanceof),
        "this" => Some(TokenKind::This),
        "super" => Some(TokenKind::Super),
        "null" => Some(TokenKind::Null),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "import" => Some(TokenKind::Import),
        "export" => Some(TokenKind::Export),
        "extends" => Some(TokenKind::Extends),
        "with" => Some(TokenKind::With),
        "debugger" => Some(TokenKind::Debugger),
        "enum" => Some(TokenKind::Enum),
        _ => None,
    }
}

/// Keyword kind for a contextual word, if it has one.
pub fn contextual_keyword(s: &str) -> Option<TokenKind> {
    match s {
        "await" => Some(TokenKind::Await),
        "yield" => Some(TokenKind::Yield),
        "type" => Some(TokenKind::Type),
        "interface" => Some(TokenKind::Interface),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_table() {
        assert_eq!(keyword_from_str("typeof"), Some(TokenKind::Typeof));
        assert_eq!(keyword_from_str("of"), None);
        assert_eq!(keyword_from_str("await"), None);
        assert_eq!(contextual_keyword("await"), Some(TokenKind::Await));
    }

    #[test]
    fn test_precedence_ladder() {
        let mul = TokenKind::Star.binary_precedence().unwrap();
        let add = TokenKind::Plus.binary_precedence().unwrap();
        let nullish = TokenKind::QuestionQuestion.binary_precedence().unwrap();
        assert!(mul > add);
        assert!(add > nullish);
        assert!(TokenKind::StarStar.is_right_associative());
        assert!(!TokenKind::Minus.is_right_associative());
    }

    #[test]
    fn test_display() {
        assert_eq!(TokenKind::GtGtGtEq.to_string(), ">>>=");
        assert_eq!(TokenKind::Identifier("foo".into()).to_string(), "foo");
        assert_eq!(TokenKind::Yield.to_string(), "yield");
    }

    #[test]
    fn test_literal_slice() {
        let source = "let answer = 42;";
        let token = Token::new(TokenKind::Number(42.0), Span::new(13, 15));
        assert_eq!(token.literal(source), "42");
    }
}
