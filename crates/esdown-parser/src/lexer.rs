//! Lexer (tokenizer) for JavaScript, Flow and JSX.
//!
//! The lexer converts source text into tokens on demand. It is driven by
//! the parser, which knows things the lexer cannot: whether a `/` starts a
//! regular expression, whether a `}` resumes a template literal, whether a
//! `<` opens a JSX element, and whether `await`/`yield`/`type` are keywords
//! in the current context. For those cases the parser asks the lexer to
//! rescan the current token from its start offset.
//!
//! Malformed input never panics and never silently recovers: it produces a
//! [`TokenKind::Illegal`] carrying the diagnostic, which the parser reports
//! at the first grammar decision that meets it.

use crate::span::Span;
use crate::token::{contextual_keyword, keyword_from_str, TemplateChunk, Token, TokenKind};

/// Parser-supplied flags that change how words and `>` are tokenized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexContext {
    /// `await` is an operator (async function body or module top level).
    pub await_keyword: bool,
    /// `yield` is an operator (generator body).
    pub yield_keyword: bool,
    /// `type`/`interface` may start a Flow declaration (module root only).
    pub flow_declarations: bool,
    /// Inside a type annotation: `>` never merges into `>>`, `>=`, ...
    pub in_type: bool,
}

/// The lexer state.
///
/// Cloning is cheap (the source is borrowed), which is what parser
/// snapshots and one-token lookahead rely on.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    /// Source code as bytes (for fast indexing).
    bytes: &'a [u8],
    /// Current byte position.
    pos: usize,
    /// Start position of the current token.
    token_start: usize,
    /// A line terminator was crossed while skipping trivia.
    newline_before: bool,
    /// The previous token is in the statement-ending set.
    last_ends_statement: bool,
    context: LexContext,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            token_start: 0,
            newline_before: false,
            last_ends_statement: false,
            context: LexContext::default(),
        }
    }

    /// Get the current byte position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The source text being scanned.
    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn context(&self) -> LexContext {
        self.context
    }

    /// Replace the parser-supplied context flags.
    ///
    /// Tokens already handed out are unaffected; use [`Lexer::rescan`] to
    /// reclassify the current token under the new flags.
    pub fn set_context(&mut self, context: LexContext) {
        self.context = context;
    }

    /// Let a line break after the current token end the statement. Keywords
    /// read as property names (`a.default`) behave like identifiers there.
    pub fn mark_statement_end(&mut self) {
        self.last_ends_statement = true;
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Token {
        self.newline_before = false;
        if let Some(comment_start) = self.skip_whitespace_and_comments() {
            self.token_start = comment_start;
            return self.finish(TokenKind::Illegal("Unterminated comment".into()));
        }
        self.token_start = self.pos;
        let kind = self.scan_token();
        self.finish(kind)
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&self) -> Token {
        let mut probe = self.clone();
        probe.next_token()
    }

    /// Rescan `token` under the current context flags.
    pub fn rescan(&mut self, token: &Token) -> Token {
        self.reset_to(token);
        let kind = self.scan_token();
        self.finish_like(kind, token)
    }

    /// Rescan a `/` or `/=` token as a regular expression literal.
    pub fn rescan_regex(&mut self, token: &Token) -> Token {
        self.reset_to(token);
        let kind = self.scan_regex();
        self.finish_like(kind, token)
    }

    /// Rescan a `<` token in JSX context, recognizing the `<>` fragment opener.
    pub fn rescan_jsx_open(&mut self, token: &Token) -> Token {
        self.reset_to(token);
        let kind = if self.peek_char() == b'>' {
            self.advance_n(2);
            TokenKind::JsxFragmentOpen
        } else {
            self.advance();
            TokenKind::Lt
        };
        self.finish_like(kind, token)
    }

    /// Continue a template literal after the `}` that closed a substitution.
    pub fn continue_template(&mut self, close_brace: &Token) -> Token {
        self.reset_to(close_brace);
        self.advance(); // Skip }
        let kind = self.scan_template_chunk(false);
        self.finish_like(kind, close_brace)
    }

    /// Next token inside a JSX tag: names may contain `-`, strings have no
    /// escapes, and `/>` closes the element.
    pub fn next_jsx_tag_token(&mut self) -> Token {
        self.newline_before = false;
        if let Some(comment_start) = self.skip_whitespace_and_comments() {
            self.token_start = comment_start;
            return self.finish(TokenKind::Illegal("Unterminated comment".into()));
        }
        self.token_start = self.pos;
        let kind = match self.current() {
            b'/' if self.peek_char() == b'>' => {
                self.advance_n(2);
                TokenKind::JsxSelfClose
            }
            b'>' => {
                self.advance();
                TokenKind::Gt
            }
            quote @ (b'"' | b'\'') => self.scan_jsx_string(quote),
            _ if self.at_identifier_start() => self.scan_jsx_name(),
            _ => self.scan_token(),
        };
        self.finish(kind)
    }

    /// Next token among JSX children: text runs, `{`, or a tag opener.
    pub fn next_jsx_child_token(&mut self) -> Token {
        self.newline_before = false;
        self.token_start = self.pos;
        let kind = match self.current() {
            _ if self.is_eof() => TokenKind::Eof,
            b'{' => {
                self.advance();
                TokenKind::LBrace
            }
            b'<' => match (self.peek_char(), self.peek_char_n(2)) {
                (b'/', b'>') => {
                    self.advance_n(3);
                    TokenKind::JsxFragmentClose
                }
                (b'/', _) => {
                    self.advance_n(2);
                    TokenKind::JsxCloseTag
                }
                (b'>', _) => {
                    self.advance_n(2);
                    TokenKind::JsxFragmentOpen
                }
                _ => {
                    self.advance();
                    TokenKind::Lt
                }
            },
            _ => {
                while !self.is_eof() && !matches!(self.current(), b'{' | b'<') {
                    self.advance();
                }
                TokenKind::JsxText(self.token_slice().to_string())
            }
        };
        self.finish(kind)
    }

    // === Helper methods ===

    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn current(&self) -> u8 {
        self.bytes.get(self.pos).copied().unwrap_or(0)
    }

    fn peek_char(&self) -> u8 {
        self.bytes.get(self.pos + 1).copied().unwrap_or(0)
    }

    fn peek_char_n(&self, n: usize) -> u8 {
        self.bytes.get(self.pos + n).copied().unwrap_or(0)
    }

    /// Decode the (possibly multi-byte) character at the current position.
    fn current_char(&self) -> Option<char> {
        self.source.get(self.pos..).and_then(|rest| rest.chars().next())
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        self.source.get(start..end).unwrap_or("")
    }

    fn token_slice(&self) -> &'a str {
        self.slice(self.token_start, self.pos)
    }

    fn reset_to(&mut self, token: &Token) {
        self.pos = token.span.start as usize;
        self.token_start = self.pos;
    }

    fn finish(&mut self, kind: TokenKind) -> Token {
        let token = Token {
            span: Span::new(self.token_start as u32, self.pos as u32),
            newline_before: self.newline_before,
            asi: self.newline_before && self.last_ends_statement,
            kind,
        };
        self.last_ends_statement = token.kind.ends_statement();
        token
    }

    /// Finish a rescanned token, keeping the line-break facts of the original.
    fn finish_like(&mut self, kind: TokenKind, original: &Token) -> Token {
        let token = Token {
            span: Span::new(self.token_start as u32, self.pos as u32),
            newline_before: original.newline_before,
            asi: original.asi,
            kind,
        };
        self.last_ends_statement = token.kind.ends_statement();
        token
    }

    // === Whitespace and comments ===

    /// Skip trivia. Returns the start of an unterminated block comment.
    fn skip_whitespace_and_comments(&mut self) -> Option<usize> {
        if self.pos == 0 && self.current() == b'#' && self.peek_char() == b'!' {
            self.skip_line_comment();
        }
        loop {
            match self.current() {
                b' ' | b'\t' | 0x0B | 0x0C => self.advance(),
                b'\n' | b'\r' => {
                    self.newline_before = true;
                    self.advance();
                }
                b'/' if self.peek_char() == b'/' => self.skip_line_comment(),
                b'/' if self.peek_char() == b'*' => {
                    let start = self.pos;
                    if !self.skip_block_comment() {
                        return Some(start);
                    }
                }
                byte if byte >= 0x80 => match self.current_char() {
                    Some(c @ ('\u{2028}' | '\u{2029}')) => {
                        self.newline_before = true;
                        self.advance_n(c.len_utf8());
                    }
                    Some(c) if c.is_whitespace() || c == '\u{feff}' => self.advance_n(c.len_utf8()),
                    _ => break,
                },
                _ => break,
            }
        }
        None
    }

    fn skip_line_comment(&mut self) {
        self.advance_n(2); // Skip //
        while !self.is_eof() && !matches!(self.current(), b'\n' | b'\r') {
            self.advance();
        }
    }

    /// Returns false if the comment runs to end of input.
    fn skip_block_comment(&mut self) -> bool {
        self.advance_n(2); // Skip /*
        while !self.is_eof() {
            match self.current() {
                b'*' if self.peek_char() == b'/' => {
                    self.advance_n(2);
                    return true;
                }
                b'\n' | b'\r' => {
                    self.newline_before = true;
                    self.advance();
                }
                0xE2 if matches!(self.current_char(), Some('\u{2028}' | '\u{2029}')) => {
                    self.newline_before = true;
                    self.advance_n(3);
                }
                _ => self.advance(),
            }
        }
        false
    }

    // === Token scanning ===

    fn scan_token(&mut self) -> TokenKind {
        if self.is_eof() {
            return TokenKind::Eof;
        }

        let ch = self.current();
        match ch {
            b'0'..=b'9' => self.scan_number(),
            b'"' | b'\'' => self.scan_string(ch),
            b'`' => {
                self.advance();
                self.scan_template_chunk(true)
            }

            b'(' => { self.advance(); TokenKind::LParen }
            b')' => { self.advance(); TokenKind::RParen }
            b'{' => { self.advance(); TokenKind::LBrace }
            b'}' => { self.advance(); TokenKind::RBrace }
            b'[' => { self.advance(); TokenKind::LBracket }
            b']' => { self.advance(); TokenKind::RBracket }
            b';' => { self.advance(); TokenKind::Semicolon }
            b',' => { self.advance(); TokenKind::Comma }
            b':' => { self.advance(); TokenKind::Colon }
            b'@' => { self.advance(); TokenKind::At }
            b'~' => { self.advance(); TokenKind::Tilde }
            b'#' => self.scan_private_name(),

            b'.' => self.scan_dot(),
            b'?' => self.scan_question(),
            b'+' => self.scan_plus(),
            b'-' => self.scan_minus(),
            b'*' => self.scan_star(),
            b'/' => self.scan_slash(),
            b'%' => self.scan_percent(),
            b'=' => self.scan_equals(),
            b'!' => self.scan_bang(),
            b'<' => self.scan_less_than(),
            b'>' => self.scan_greater_than(),
            b'&' => self.scan_ampersand(),
            b'|' => self.scan_pipe(),
            b'^' => self.scan_caret(),

            _ if self.at_identifier_start() => self.scan_identifier(),

            _ => {
                let c = self.current_char().unwrap_or('\u{fffd}');
                self.advance_n(c.len_utf8().max(1));
                TokenKind::Illegal(format!("Illegal character '{c}'"))
            }
        }
    }

    fn at_identifier_start(&self) -> bool {
        match self.current() {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => true,
            b'\\' => self.peek_char() == b'u',
            byte if byte >= 0x80 => self.current_char().is_some_and(is_id_start),
            _ => false,
        }
    }

    /// Scan identifier characters into `name`. Returns false on a bad escape.
    fn scan_identifier_chars(&mut self, name: &mut String, has_escape: &mut bool) -> bool {
        loop {
            match self.current() {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'$' => {
                    name.push(self.current() as char);
                    self.advance();
                }
                b'\\' if self.peek_char() == b'u' => {
                    self.advance_n(2);
                    *has_escape = true;
                    match self.scan_unicode_escape_body() {
                        Some(c) if is_id_continue(c) => name.push(c),
                        _ => return false,
                    }
                }
                byte if byte >= 0x80 => match self.current_char() {
                    Some(c) if is_id_continue(c) => {
                        name.push(c);
                        self.advance_n(c.len_utf8());
                    }
                    _ => return true,
                },
                _ => return true,
            }
        }
    }

    fn scan_identifier(&mut self) -> TokenKind {
        let mut name = String::new();
        let mut has_escape = false;
        if !self.scan_identifier_chars(&mut name, &mut has_escape) {
            return TokenKind::Illegal("Invalid Unicode escape sequence".into());
        }
        if has_escape {
            return TokenKind::Identifier(name);
        }
        self.classify_word(name)
    }

    /// Resolve a scanned word to a keyword, promoted contextual keyword, or
    /// identifier under the current context flags.
    fn classify_word(&self, name: String) -> TokenKind {
        if let Some(keyword) = keyword_from_str(&name) {
            return keyword;
        }
        match contextual_keyword(&name) {
            Some(TokenKind::Await) if self.context.await_keyword => TokenKind::Await,
            Some(TokenKind::Yield) if self.context.yield_keyword => TokenKind::Yield,
            Some(kind @ (TokenKind::Type | TokenKind::Interface)) if self.context.flow_declarations => kind,
            _ => TokenKind::Identifier(name),
        }
    }

    fn scan_private_name(&mut self) -> TokenKind {
        self.advance(); // Skip #
        if !self.at_identifier_start() {
            return TokenKind::Illegal("Invalid character '#'".into());
        }
        let mut name = String::new();
        let mut has_escape = false;
        if !self.scan_identifier_chars(&mut name, &mut has_escape) {
            return TokenKind::Illegal("Invalid Unicode escape sequence".into());
        }
        TokenKind::PrivateName(name)
    }

    // === Numbers ===

    fn scan_number(&mut self) -> TokenKind {
        if self.current() == b'0' {
            match self.peek_char() {
                b'x' | b'X' => return self.scan_radix_number(16, "Illegal hexadecimal number"),
                b'b' | b'B' => return self.scan_radix_number(2, "Illegal binary number"),
                b'o' | b'O' => return self.scan_radix_number(8, "Illegal octal number"),
                b'0'..=b'9' => return self.scan_legacy_octal(),
                _ => {}
            }
        }

        let start = self.pos;
        self.skip_decimal_digits();

        let mut is_integer = true;
        if self.current() == b'.' {
            is_integer = false;
            self.advance();
            self.skip_decimal_digits();
        }

        if matches!(self.current(), b'e' | b'E') {
            is_integer = false;
            self.advance();
            if matches!(self.current(), b'+' | b'-') {
                self.advance();
            }
            if !self.current().is_ascii_digit() {
                return self.illegal_number_tail("Illegal number");
            }
            self.skip_decimal_digits();
        }

        if is_integer && self.current() == b'n' {
            let digits = self.slice(start, self.pos).replace('_', "");
            self.advance();
            return self.check_number_end(TokenKind::BigInt(digits));
        }

        let text = self.slice(start, self.pos).replace('_', "");
        match text.parse::<f64>() {
            Ok(value) => self.check_number_end(TokenKind::Number(value)),
            Err(_) => self.illegal_number_tail("Illegal number"),
        }
    }

    fn skip_decimal_digits(&mut self) {
        while self.current().is_ascii_digit() || (self.current() == b'_' && self.peek_char().is_ascii_digit()) {
            self.advance();
        }
    }

    /// `0x`, `0b`, `0o` literals. The error span starts at the leading `0`.
    fn scan_radix_number(&mut self, radix: u32, message: &str) -> TokenKind {
        self.advance_n(2); // Skip 0x / 0b / 0o
        let digits_start = self.pos;
        let mut value = 0f64;
        loop {
            let c = self.current();
            if c == b'_' && (self.peek_char() as char).is_digit(radix) && self.pos > digits_start {
                self.advance();
                continue;
            }
            match (c as char).to_digit(radix) {
                Some(digit) => {
                    value = value * f64::from(radix) + f64::from(digit);
                    self.advance();
                }
                None => break,
            }
        }

        if self.pos == digits_start {
            return self.illegal_number_tail(message);
        }
        if self.current() == b'n' {
            let digits = self.slice(self.token_start, self.pos).replace('_', "");
            self.advance();
            return self.check_number_end(TokenKind::BigInt(digits));
        }
        if self.current().is_ascii_alphanumeric() {
            return self.illegal_number_tail(message);
        }
        TokenKind::Number(value)
    }

    /// Leading-zero octal such as `017`. Digits 8 and 9 are rejected.
    fn scan_legacy_octal(&mut self) -> TokenKind {
        self.advance(); // Skip 0
        let mut value = 0f64;
        while self.current().is_ascii_digit() {
            let digit = u32::from(self.current() - b'0');
            if digit > 7 {
                return self.illegal_number_tail("Illegal octal number");
            }
            value = value * 8.0 + f64::from(digit);
            self.advance();
        }
        self.check_number_end(TokenKind::Number(value))
    }

    /// A number may not run straight into an identifier (`3in`, `1_`).
    fn check_number_end(&mut self, kind: TokenKind) -> TokenKind {
        if self.at_identifier_start() || self.current().is_ascii_digit() || self.current() == b'_' {
            return self.illegal_number_tail("Illegal number");
        }
        kind
    }

    fn illegal_number_tail(&mut self, message: &str) -> TokenKind {
        while self.current().is_ascii_alphanumeric() || matches!(self.current(), b'_' | b'$') {
            self.advance();
        }
        TokenKind::Illegal(message.to_string())
    }

    // === Strings and templates ===

    fn scan_string(&mut self, quote: u8) -> TokenKind {
        self.advance(); // Skip opening quote
        let mut value = String::new();
        let mut run_start = self.pos;

        loop {
            if self.is_eof() {
                return TokenKind::Illegal("Unterminated string literal".into());
            }
            match self.current() {
                c if c == quote => {
                    value.push_str(self.slice(run_start, self.pos));
                    self.advance(); // Skip closing quote
                    return TokenKind::String(value);
                }
                b'\n' | b'\r' => {
                    return TokenKind::Illegal("Unterminated string literal".into());
                }
                b'\\' => {
                    value.push_str(self.slice(run_start, self.pos));
                    self.advance();
                    if let Err(message) = self.scan_escape_sequence(&mut value) {
                        return TokenKind::Illegal(message.into());
                    }
                    run_start = self.pos;
                }
                _ => self.advance(),
            }
        }
    }

    /// Decode one escape sequence (the backslash is already consumed).
    fn scan_escape_sequence(&mut self, out: &mut String) -> Result<(), &'static str> {
        if self.is_eof() {
            return Err("Unterminated string literal");
        }
        let ch = self.current();
        self.advance();

        match ch {
            b'n' => out.push('\n'),
            b'r' => {
                out.push('\r');
            }
            b't' => out.push('\t'),
            b'b' => out.push('\u{8}'),
            b'f' => out.push('\u{c}'),
            b'v' => out.push('\u{b}'),
            b'0'..=b'7' => {
                // Legacy octal escape: up to three digits, value <= 0o377.
                let mut value = u32::from(ch - b'0');
                let max_len = if ch <= b'3' { 3 } else { 2 };
                let mut len = 1;
                while len < max_len && matches!(self.current(), b'0'..=b'7') {
                    value = value * 8 + u32::from(self.current() - b'0');
                    self.advance();
                    len += 1;
                }
                out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
            }
            b'x' => {
                let value = self.scan_hex_digits(2).ok_or("Invalid hexadecimal escape sequence")?;
                out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
            }
            b'u' => {
                let c = self.scan_unicode_escape_body().ok_or("Invalid Unicode escape sequence")?;
                out.push(c);
            }
            // Line continuations produce nothing.
            b'\n' => {}
            b'\r' => {
                if self.current() == b'\n' {
                    self.advance();
                }
            }
            byte if byte >= 0x80 => {
                self.pos -= 1;
                let c = self.current_char().unwrap_or('\u{fffd}');
                self.advance_n(c.len_utf8());
                if !matches!(c, '\u{2028}' | '\u{2029}') {
                    out.push(c);
                }
            }
            other => out.push(other as char),
        }
        Ok(())
    }

    fn scan_hex_digits(&mut self, len: usize) -> Option<u32> {
        let mut value = 0u32;
        for _ in 0..len {
            let digit = (self.current() as char).to_digit(16)?;
            value = value * 16 + digit;
            self.advance();
        }
        Some(value)
    }

    /// Body of a `\u` escape: `XXXX` or `{X...}`, with surrogate pairs joined.
    fn scan_unicode_escape_body(&mut self) -> Option<char> {
        if self.current() == b'{' {
            self.advance();
            let mut value = 0u32;
            let start = self.pos;
            while self.current() != b'}' {
                let digit = (self.current() as char).to_digit(16)?;
                value = value.checked_mul(16)?.checked_add(digit)?;
                self.advance();
            }
            if self.pos == start || value > 0x10FFFF {
                return None;
            }
            self.advance(); // Skip }
            return Some(char::from_u32(value).unwrap_or('\u{fffd}'));
        }

        let high = self.scan_hex_digits(4)?;
        if (0xD800..0xDC00).contains(&high) && self.current() == b'\\' && self.peek_char() == b'u' {
            let mut probe = self.clone();
            probe.advance_n(2);
            if let Some(low) = probe.scan_hex_digits(4) {
                if (0xDC00..0xE000).contains(&low) {
                    *self = probe;
                    let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(combined);
                }
            }
        }
        Some(char::from_u32(high).unwrap_or('\u{fffd}'))
    }

    /// Scan a template chunk up to the closing backtick or the next `${`.
    fn scan_template_chunk(&mut self, is_head: bool) -> TokenKind {
        let raw_start = self.pos;
        let mut cooked = String::new();
        let mut run_start = self.pos;

        while !self.is_eof() {
            match self.current() {
                b'`' => {
                    cooked.push_str(self.slice(run_start, self.pos));
                    let chunk = self.template_chunk(cooked, raw_start, self.pos);
                    self.advance();
                    return if is_head { TokenKind::TemplateNoSub(chunk) } else { TokenKind::TemplateTail(chunk) };
                }
                b'$' if self.peek_char() == b'{' => {
                    cooked.push_str(self.slice(run_start, self.pos));
                    let chunk = self.template_chunk(cooked, raw_start, self.pos);
                    self.advance_n(2);
                    return if is_head { TokenKind::TemplateHead(chunk) } else { TokenKind::TemplateMiddle(chunk) };
                }
                b'\\' => {
                    cooked.push_str(self.slice(run_start, self.pos));
                    self.advance();
                    if let Err(message) = self.scan_escape_sequence(&mut cooked) {
                        return TokenKind::Illegal(message.into());
                    }
                    run_start = self.pos;
                }
                b'\r' => {
                    // Template line endings are normalized to \n.
                    cooked.push_str(self.slice(run_start, self.pos));
                    cooked.push('\n');
                    self.advance();
                    if self.current() == b'\n' {
                        self.advance();
                    }
                    run_start = self.pos;
                }
                _ => self.advance(),
            }
        }

        TokenKind::Illegal("Unterminated template literal".into())
    }

    fn template_chunk(&self, cooked: String, raw_start: usize, raw_end: usize) -> TemplateChunk {
        let raw = self.slice(raw_start, raw_end).replace("\r\n", "\n").replace('\r', "\n");
        TemplateChunk { cooked, raw }
    }

    // === Regular expressions ===

    fn scan_regex(&mut self) -> TokenKind {
        self.advance(); // Skip opening /
        let pattern_start = self.pos;

        let mut in_class = false;
        loop {
            if self.is_eof() {
                return TokenKind::Illegal("Unterminated regular expression".into());
            }
            match self.current() {
                b'/' if !in_class => break,
                b'[' => {
                    in_class = true;
                    self.advance();
                }
                b']' => {
                    in_class = false;
                    self.advance();
                }
                b'\\' => {
                    self.advance();
                    if self.is_eof() || matches!(self.current(), b'\n' | b'\r') {
                        return TokenKind::Illegal("Unterminated regular expression".into());
                    }
                    let c = self.current_char().unwrap_or('\u{fffd}');
                    self.advance_n(c.len_utf8());
                }
                b'\n' | b'\r' => {
                    return TokenKind::Illegal("Unterminated regular expression".into());
                }
                _ => self.advance(),
            }
        }

        let pattern = self.slice(pattern_start, self.pos).to_string();
        self.advance(); // Skip closing /

        let flags_start = self.pos;
        while self.current().is_ascii_alphanumeric() || matches!(self.current(), b'_' | b'$') {
            self.advance();
        }
        let flags = self.slice(flags_start, self.pos).to_string();

        TokenKind::Regex { pattern, flags }
    }

    // === JSX ===

    fn scan_jsx_name(&mut self) -> TokenKind {
        let start = self.pos;
        while self.current().is_ascii_alphanumeric() || matches!(self.current(), b'_' | b'$' | b'-') {
            self.advance();
        }
        while let Some(c) = self.current_char().filter(|c| !c.is_ascii() && is_id_continue(*c)) {
            self.advance_n(c.len_utf8());
            while self.current().is_ascii_alphanumeric() || matches!(self.current(), b'_' | b'$' | b'-') {
                self.advance();
            }
        }
        TokenKind::Identifier(self.slice(start, self.pos).to_string())
    }

    fn scan_jsx_string(&mut self, quote: u8) -> TokenKind {
        self.advance(); // Skip opening quote
        let start = self.pos;
        while !self.is_eof() && self.current() != quote {
            self.advance();
        }
        if self.is_eof() {
            return TokenKind::Illegal("Unterminated string literal".into());
        }
        let value = self.slice(start, self.pos).to_string();
        self.advance(); // Skip closing quote
        TokenKind::String(value)
    }

    // === Multi-character operators ===

    fn scan_dot(&mut self) -> TokenKind {
        if self.peek_char().is_ascii_digit() {
            return self.scan_number();
        }
        self.advance();
        if self.current() == b'.' && self.peek_char() == b'.' {
            self.advance_n(2);
            TokenKind::Spread
        } else {
            TokenKind::Dot
        }
    }

    fn scan_question(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'?' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::QuestionQuestionEq
                } else {
                    TokenKind::QuestionQuestion
                }
            }
            b'.' if !self.peek_char().is_ascii_digit() => {
                self.advance();
                TokenKind::QuestionDot
            }
            _ => TokenKind::Question,
        }
    }

    fn scan_plus(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'+' => { self.advance(); TokenKind::PlusPlus }
            b'=' => { self.advance(); TokenKind::PlusEq }
            _ => TokenKind::Plus,
        }
    }

    fn scan_minus(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'-' => { self.advance(); TokenKind::MinusMinus }
            b'=' => { self.advance(); TokenKind::MinusEq }
            _ => TokenKind::Minus,
        }
    }

    fn scan_star(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'*' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::StarStarEq
                } else {
                    TokenKind::StarStar
                }
            }
            b'=' => { self.advance(); TokenKind::StarEq }
            _ => TokenKind::Star,
        }
    }

    /// Always division here; the parser rescans as a regex where one may start.
    fn scan_slash(&mut self) -> TokenKind {
        self.advance();
        if self.current() == b'=' {
            self.advance();
            TokenKind::SlashEq
        } else {
            TokenKind::Slash
        }
    }

    fn scan_percent(&mut self) -> TokenKind {
        self.advance();
        if self.current() == b'=' {
            self.advance();
            TokenKind::PercentEq
        } else {
            TokenKind::Percent
        }
    }

    fn scan_equals(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'=' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::EqEqEq
                } else {
                    TokenKind::EqEq
                }
            }
            b'>' => { self.advance(); TokenKind::Arrow }
            _ => TokenKind::Eq,
        }
    }

    fn scan_bang(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'=' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::BangEqEq
                } else {
                    TokenKind::BangEq
                }
            }
            _ => TokenKind::Bang,
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'<' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::LtLtEq
                } else {
                    TokenKind::LtLt
                }
            }
            b'=' => { self.advance(); TokenKind::LtEq }
            _ => TokenKind::Lt,
        }
    }

    fn scan_greater_than(&mut self) -> TokenKind {
        self.advance();
        if self.context.in_type {
            return TokenKind::Gt;
        }
        match self.current() {
            b'>' => {
                self.advance();
                match self.current() {
                    b'>' => {
                        self.advance();
                        if self.current() == b'=' {
                            self.advance();
                            TokenKind::GtGtGtEq
                        } else {
                            TokenKind::GtGtGt
                        }
                    }
                    b'=' => { self.advance(); TokenKind::GtGtEq }
                    _ => TokenKind::GtGt,
                }
            }
            b'=' => { self.advance(); TokenKind::GtEq }
            _ => TokenKind::Gt,
        }
    }

    fn scan_ampersand(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'&' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::AmpAmpEq
                } else {
                    TokenKind::AmpAmp
                }
            }
            b'=' => { self.advance(); TokenKind::AmpEq }
            _ => TokenKind::Amp,
        }
    }

    fn scan_pipe(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'|' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::PipePipeEq
                } else {
                    TokenKind::PipePipe
                }
            }
            b'=' => { self.advance(); TokenKind::PipeEq }
            _ => TokenKind::Pipe,
        }
    }

    fn scan_caret(&mut self) -> TokenKind {
        self.advance();
        if self.current() == b'=' {
            self.advance();
            TokenKind::CaretEq
        } else {
            TokenKind::Caret
        }
    }
}

fn is_id_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

fn is_id_continue(c: char) -> bool {
    c == '$' || c == '_' || c == '\u{200c}' || c == '\u{200d}' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            if matches!(token.kind, TokenKind::Eof) {
                break;
            }
            tokens.push(token.kind);
        }
        tokens
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(name.into())
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            tokenize("foo bar _baz $qux café"),
            vec![ident("foo"), ident("bar"), ident("_baz"), ident("$qux"), ident("café")]
        );
    }

    #[test]
    fn test_unicode_escape_identifier() {
        assert_eq!(tokenize("\\u0061bc"), vec![ident("abc")]);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            tokenize("const let var function"),
            vec![TokenKind::Const, TokenKind::Let, TokenKind::Var, TokenKind::Function]
        );
    }

    #[test]
    fn test_contextual_keywords_need_context() {
        assert_eq!(tokenize("await yield of type"), vec![ident("await"), ident("yield"), ident("of"), ident("type")]);

        let mut lexer = Lexer::new("await yield type");
        lexer.set_context(LexContext { await_keyword: true, yield_keyword: true, flow_declarations: true, in_type: false });
        assert_eq!(lexer.next_token().kind, TokenKind::Await);
        assert_eq!(lexer.next_token().kind, TokenKind::Yield);
        assert_eq!(lexer.next_token().kind, TokenKind::Type);
    }

    #[test]
    fn test_rescan_under_new_context() {
        let mut lexer = Lexer::new("await x");
        let token = lexer.next_token();
        assert_eq!(token.kind, ident("await"));
        lexer.set_context(LexContext { await_keyword: true, ..LexContext::default() });
        let token = lexer.rescan(&token);
        assert_eq!(token.kind, TokenKind::Await);
        assert_eq!(lexer.next_token().kind, ident("x"));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokenize("42 3.14 0xff 0b101 0o77 017 .5 1e3 1_000"),
            vec![
                TokenKind::Number(42.0),
                TokenKind::Number(3.14),
                TokenKind::Number(255.0),
                TokenKind::Number(5.0),
                TokenKind::Number(63.0),
                TokenKind::Number(15.0),
                TokenKind::Number(0.5),
                TokenKind::Number(1000.0),
                TokenKind::Number(1000.0),
            ]
        );
    }

    #[test]
    fn test_bigint() {
        assert_eq!(tokenize("10n 0x1fn"), vec![TokenKind::BigInt("10".into()), TokenKind::BigInt("0x1f".into())]);
    }

    #[test]
    fn test_hex_without_digits_is_illegal() {
        let mut lexer = Lexer::new("0x");
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Illegal("Illegal hexadecimal number".into()));
        assert_eq!(token.span.start, 0);
    }

    #[test]
    fn test_digits_outside_base_are_illegal() {
        assert_eq!(tokenize("0b102"), vec![TokenKind::Illegal("Illegal binary number".into())]);
        assert_eq!(tokenize("09"), vec![TokenKind::Illegal("Illegal octal number".into())]);
        assert_eq!(tokenize("3in"), vec![TokenKind::Illegal("Illegal number".into())]);
        assert_eq!(tokenize("1e+"), vec![TokenKind::Illegal("Illegal number".into())]);
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            tokenize(r#""hello" 'world' "a\nb" "\x41B\u{43}" "\101" "é""#),
            vec![
                TokenKind::String("hello".into()),
                TokenKind::String("world".into()),
                TokenKind::String("a\nb".into()),
                TokenKind::String("ABC".into()),
                TokenKind::String("A".into()),
                TokenKind::String("é".into()),
            ]
        );
    }

    #[test]
    fn test_surrogate_pair_escape() {
        assert_eq!(tokenize(r#""\uD83D\uDE00""#), vec![TokenKind::String("😀".into())]);
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(tokenize("'abc\n'"), vec![
            TokenKind::Illegal("Unterminated string literal".into()),
            TokenKind::Illegal("Unterminated string literal".into()),
        ]);
        assert_eq!(tokenize("\"abc"), vec![TokenKind::Illegal("Unterminated string literal".into())]);
    }

    #[test]
    fn test_line_continuation() {
        assert_eq!(tokenize("'a\\\nb'"), vec![TokenKind::String("ab".into())]);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            tokenize("+ - * / % ** ++ -- ?? ?. ??= **= >>>="),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::StarStar,
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::QuestionQuestion,
                TokenKind::QuestionDot,
                TokenKind::QuestionQuestionEq,
                TokenKind::StarStarEq,
                TokenKind::GtGtGtEq,
            ]
        );
    }

    #[test]
    fn test_optional_chain_vs_conditional_number() {
        assert_eq!(tokenize("a?.5:1"), vec![
            ident("a"),
            TokenKind::Question,
            TokenKind::Number(0.5),
            TokenKind::Colon,
            TokenKind::Number(1.0),
        ]);
    }

    #[test]
    fn test_type_context_splits_angle_brackets() {
        let mut lexer = Lexer::new(">>");
        lexer.set_context(LexContext { in_type: true, ..LexContext::default() });
        assert_eq!(lexer.next_token().kind, TokenKind::Gt);
        assert_eq!(lexer.next_token().kind, TokenKind::Gt);
    }

    #[test]
    fn test_comments() {
        assert_eq!(tokenize("a // line comment\nb /* block */ c"), vec![ident("a"), ident("b"), ident("c")]);
        assert_eq!(tokenize("/* open"), vec![TokenKind::Illegal("Unterminated comment".into())]);
    }

    #[test]
    fn test_hashbang() {
        assert_eq!(tokenize("#!/usr/bin/env node\nx"), vec![ident("x")]);
    }

    #[test]
    fn test_newline_and_asi_flags() {
        let mut lexer = Lexer::new("a\nb\n+c");
        let a = lexer.next_token();
        let b = lexer.next_token();
        let plus = lexer.next_token();
        assert!(!a.newline_before);
        assert!(b.newline_before && b.asi);
        assert!(plus.newline_before && plus.asi);

        let mut lexer = Lexer::new("a +\nb");
        lexer.next_token();
        lexer.next_token();
        let b = lexer.next_token();
        assert!(b.newline_before);
        assert!(!b.asi);
    }

    #[test]
    fn test_newline_inside_block_comment() {
        let mut lexer = Lexer::new("a /*\n*/ b");
        lexer.next_token();
        assert!(lexer.next_token().newline_before);
    }

    #[test]
    fn test_regex_rescan() {
        let mut lexer = Lexer::new("/[/]+/gi.test(x)");
        let slash = lexer.next_token();
        assert_eq!(slash.kind, TokenKind::Slash);
        let regex = lexer.rescan_regex(&slash);
        assert_eq!(regex.kind, TokenKind::Regex { pattern: "[/]+".into(), flags: "gi".into() });
        assert_eq!(lexer.next_token().kind, TokenKind::Dot);
    }

    #[test]
    fn test_unterminated_regex() {
        let mut lexer = Lexer::new("/abc\n/");
        let slash = lexer.next_token();
        let regex = lexer.rescan_regex(&slash);
        assert_eq!(regex.kind, TokenKind::Illegal("Unterminated regular expression".into()));
    }

    #[test]
    fn test_template_literal_no_sub() {
        assert_eq!(
            tokenize("`hello world`"),
            vec![TokenKind::TemplateNoSub(TemplateChunk { cooked: "hello world".into(), raw: "hello world".into() })]
        );
    }

    #[test]
    fn test_template_continuation() {
        let mut lexer = Lexer::new("`a${x}b\\n${y}c`");
        let head = lexer.next_token();
        assert!(matches!(head.kind, TokenKind::TemplateHead(ref chunk) if chunk.cooked == "a"));
        assert_eq!(lexer.next_token().kind, ident("x"));
        let close = lexer.next_token();
        assert_eq!(close.kind, TokenKind::RBrace);
        let middle = lexer.continue_template(&close);
        assert_eq!(
            middle.kind,
            TokenKind::TemplateMiddle(TemplateChunk { cooked: "b\n".into(), raw: "b\\n".into() })
        );
        assert_eq!(lexer.next_token().kind, ident("y"));
        let close = lexer.next_token();
        let tail = lexer.continue_template(&close);
        assert!(matches!(tail.kind, TokenKind::TemplateTail(ref chunk) if chunk.cooked == "c"));
    }

    #[test]
    fn test_unterminated_template() {
        assert_eq!(tokenize("`abc"), vec![TokenKind::Illegal("Unterminated template literal".into())]);
    }

    #[test]
    fn test_jsx_tokens() {
        let mut lexer = Lexer::new("<div data-id='x'/>");
        let lt = lexer.next_token();
        assert_eq!(lexer.rescan_jsx_open(&lt).kind, TokenKind::Lt);
        assert_eq!(lexer.next_jsx_tag_token().kind, ident("div"));
        assert_eq!(lexer.next_jsx_tag_token().kind, ident("data-id"));
        assert_eq!(lexer.next_jsx_tag_token().kind, TokenKind::Eq);
        assert_eq!(lexer.next_jsx_tag_token().kind, TokenKind::String("x".into()));
        assert_eq!(lexer.next_jsx_tag_token().kind, TokenKind::JsxSelfClose);
    }

    #[test]
    fn test_jsx_children() {
        let mut lexer = Lexer::new("hi {x}</>");
        assert_eq!(lexer.next_jsx_child_token().kind, TokenKind::JsxText("hi ".into()));
        assert_eq!(lexer.next_jsx_child_token().kind, TokenKind::LBrace);
        assert_eq!(lexer.next_token().kind, ident("x"));
        assert_eq!(lexer.next_token().kind, TokenKind::RBrace);
        assert_eq!(lexer.next_jsx_child_token().kind, TokenKind::JsxFragmentClose);
    }

    #[test]
    fn test_private_name() {
        assert_eq!(tokenize("#count"), vec![TokenKind::PrivateName("count".into())]);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut lexer = Lexer::new("a b");
        assert_eq!(lexer.peek().kind, ident("a"));
        assert_eq!(lexer.next_token().kind, ident("a"));
        assert_eq!(lexer.peek().kind, ident("b"));
        assert_eq!(lexer.next_token().kind, ident("b"));
    }

    #[test]
    fn test_illegal_character() {
        assert_eq!(tokenize("a ¬"), vec![ident("a"), TokenKind::Illegal("Illegal character '¬'".into())]);
    }
}
