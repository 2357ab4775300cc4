//! Lexical analysis for Opal source text. The lexer is a hand written
//! cursor over the input characters which produces a flat token stream with
//! positions. Documentation comments (`/** ... */`) are a separate channel:
//! their tags accumulate into a [`Documentation`] value which is attached to
//! the next emitted token.

mod token;

pub use token::*;

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::{error::Error, fmt::Display};

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert("class", TokenKind::Class);
    m.insert("variant", TokenKind::Variant);
    m.insert("interface", TokenKind::Interface);
    m.insert("enum", TokenKind::Enum);
    m.insert("fn", TokenKind::Fn);
    m.insert("cfn", TokenKind::Cfn);
    m.insert("coroutine", TokenKind::Coroutine);
    m.insert("let", TokenKind::Let);
    m.insert("const", TokenKind::Const);
    m.insert("mut", TokenKind::Mut);
    m.insert("mutate", TokenKind::Mutate);
    m.insert("for", TokenKind::For);
    m.insert("foreach", TokenKind::Foreach);
    m.insert("while", TokenKind::While);
    m.insert("do", TokenKind::Do);
    m.insert("if", TokenKind::If);
    m.insert("else", TokenKind::Else);
    m.insert("match", TokenKind::Match);
    m.insert("return", TokenKind::Return);
    m.insert("break", TokenKind::Break);
    m.insert("continue", TokenKind::Continue);
    m.insert("new", TokenKind::New);
    m.insert("spawn", TokenKind::Spawn);
    m.insert("this", TokenKind::This);
    m.insert("static", TokenKind::Static);
    m.insert("strict", TokenKind::Strict);
    m.insert("struct", TokenKind::Struct);
    m.insert("throw", TokenKind::Throw);
    m.insert("override", TokenKind::Override);
    m.insert("unreachable", TokenKind::Unreachable);
    m.insert("impl", TokenKind::Impl);
    m.insert("from", TokenKind::From);
    m.insert("import", TokenKind::Import);
    m.insert("namespace", TokenKind::Namespace);
    m.insert("local", TokenKind::Local);
    m.insert("partial", TokenKind::Partial);
    m.insert("type", TokenKind::Type);
    m.insert("in", TokenKind::In);
    m.insert("is", TokenKind::Is);
    m.insert("true", TokenKind::True);
    m.insert("false", TokenKind::False);
    m.insert("null", TokenKind::Null);

    m
});

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LexError(pub String);

pub type LexResult<T> = Result<T, LexError>;

impl Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Error for LexError {}

pub struct Lexer<'a> {
    input: &'a str,
    chars: Vec<char>,
    position: usize,
    line: usize,
    col: usize,
    tokens: Vec<Token>,
    pending_doc: Option<Documentation>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            position: 0,
            line: 0,
            col: 0,
            tokens: vec![],
            pending_doc: None,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.get(self.position + n).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn eat_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                return;
            }
            self.bump();
        }
    }

    fn span_from(&self, start: (usize, usize)) -> Span {
        Span {
            start,
            end: (self.line, self.col),
            source: self.input.to_string(),
        }
    }

    fn push(&mut self, kind: TokenKind, start: (usize, usize)) {
        let mut token = Token::new(kind, self.span_from(start));
        token.documentation = self.pending_doc.take();
        self.tokens.push(token);
    }

    fn error(&self, msg: impl ToString) -> LexError {
        LexError(format!(
            "{} at line {}, column {}",
            msg.to_string(),
            self.line + 1,
            self.col + 1
        ))
    }

    pub fn lex(mut self) -> LexResult<Vec<Token>> {
        loop {
            self.eat_whitespace();

            let Some(c) = self.peek() else {
                break;
            };

            if c == '/' && self.peek_nth(1) == Some('/') {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
                continue;
            }

            if c == '/' && self.peek_nth(1) == Some('*') {
                self.lex_block_comment()?;
                continue;
            }

            let start = (self.line, self.col);

            if c.is_ascii_digit() {
                let kind = self.lex_number()?;
                self.push(kind, start);
                continue;
            }

            if c == 'b' && self.peek_nth(1) == Some('"') {
                self.bump();
                let value = self.lex_string_body()?;
                self.push(
                    TokenKind::BinaryStringLiteral(value.into_bytes()),
                    start,
                );
                continue;
            }

            if c == '"' {
                let value = self.lex_string_body()?;
                self.push(TokenKind::StringLiteral(value), start);
                continue;
            }

            if c == '\'' {
                let value = self.lex_char_body()?;
                self.push(TokenKind::CharLiteral(value), start);
                continue;
            }

            if c.is_alphabetic() || c == '_' {
                let kind = self.lex_word();
                self.push(kind, start);
                continue;
            }

            let kind = self.lex_punctuation()?;
            self.push(kind, start);
        }

        let start = (self.line, self.col);
        self.push(TokenKind::Eof, start);

        Ok(self.tokens)
    }

    fn lex_block_comment(&mut self) -> LexResult<()> {
        // Consume the opening "/*". A third '*' (but not "/**/") marks a
        // documentation comment whose body feeds the documentation channel.
        self.bump();
        self.bump();
        let is_doc = self.peek() == Some('*') && self.peek_nth(1) != Some('/');
        if is_doc {
            self.bump();
        }

        let mut body = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(self.error("unterminated block comment"));
            };
            if c == '*' && self.peek_nth(1) == Some('/') {
                self.bump();
                self.bump();
                break;
            }
            body.push(c);
            self.bump();
        }

        if is_doc {
            let doc = parse_documentation(&body);
            if !doc.is_empty() {
                self.pending_doc = Some(doc);
            }
        }

        Ok(())
    }

    fn lex_number(&mut self) -> LexResult<TokenKind> {
        if self.peek() == Some('0') {
            match self.peek_nth(1) {
                Some('x') | Some('X') => {
                    self.bump();
                    self.bump();
                    let digits = self.take_while(|c| c.is_ascii_hexdigit());
                    let value = u64::from_str_radix(&digits, 16)
                        .map_err(|_| self.error("invalid hex literal"))?;
                    return Ok(TokenKind::HexIntLiteral(value));
                }
                Some('o') | Some('O') => {
                    self.bump();
                    self.bump();
                    let digits = self.take_while(|c| ('0'..='7').contains(&c));
                    let value = u64::from_str_radix(&digits, 8)
                        .map_err(|_| self.error("invalid octal literal"))?;
                    return Ok(TokenKind::OctIntLiteral(value));
                }
                Some('b') | Some('B') => {
                    self.bump();
                    self.bump();
                    let digits = self.take_while(|c| c == '0' || c == '1');
                    let value = u64::from_str_radix(&digits, 2)
                        .map_err(|_| self.error("invalid binary literal"))?;
                    return Ok(TokenKind::BinaryIntLiteral(value));
                }
                _ => {}
            }
        }

        let mut text = self.take_while(|c| c.is_ascii_digit());
        let mut is_float = false;

        if self.peek() == Some('.') && self.peek_nth(1).map(|c| c.is_ascii_digit()) == Some(true) {
            is_float = true;
            text.push('.');
            self.bump();
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let sign_ok = matches!(self.peek_nth(1), Some(c) if c.is_ascii_digit() || c == '+' || c == '-');
            if sign_ok {
                is_float = true;
                text.push('e');
                self.bump();
                if matches!(self.peek(), Some('+') | Some('-')) {
                    text.push(self.bump().unwrap());
                }
                text.push_str(&self.take_while(|c| c.is_ascii_digit()));
            }
        }

        if is_float {
            let value = text
                .parse::<f64>()
                .map_err(|_| self.error("invalid float literal"))?;
            if self.peek() == Some('f') {
                self.bump();
                return Ok(TokenKind::FloatLiteral(value));
            }
            return Ok(TokenKind::DoubleLiteral(value));
        }

        let value = text
            .parse::<u64>()
            .map_err(|_| self.error("integer literal too large"))?;
        Ok(TokenKind::IntLiteral(value))
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    fn lex_string_body(&mut self) -> LexResult<String> {
        // Caller sits on the opening quote.
        self.bump();
        let mut raw = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(self.error("unterminated string literal"));
            };
            if c == '"' {
                self.bump();
                break;
            }
            if c == '\\' {
                raw.push(c);
                self.bump();
                let Some(escaped) = self.bump() else {
                    return Err(self.error("unterminated string literal"));
                };
                raw.push(escaped);
                continue;
            }
            raw.push(c);
            self.bump();
        }

        unescape::unescape(&raw).ok_or_else(|| self.error("invalid escape sequence"))
    }

    fn lex_char_body(&mut self) -> LexResult<char> {
        self.bump();
        let mut raw = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(self.error("unterminated char literal"));
            };
            if c == '\'' {
                self.bump();
                break;
            }
            if c == '\\' {
                raw.push(c);
                self.bump();
                let Some(escaped) = self.bump() else {
                    return Err(self.error("unterminated char literal"));
                };
                raw.push(escaped);
                continue;
            }
            raw.push(c);
            self.bump();
        }

        let unescaped =
            unescape::unescape(&raw).ok_or_else(|| self.error("invalid escape sequence"))?;
        let mut chars = unescaped.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(self.error("char literal must contain exactly one character")),
        }
    }

    fn lex_word(&mut self) -> TokenKind {
        let word = self.take_while(|c| c.is_alphanumeric() || c == '_');

        if word == "_" {
            return TokenKind::Underscore;
        }

        if word == "yield" {
            if self.peek() == Some('!') {
                self.bump();
                return TokenKind::YieldBang;
            }
            return TokenKind::Yield;
        }

        if word == "as" {
            match self.peek() {
                Some('!') => {
                    self.bump();
                    return TokenKind::AsBang;
                }
                Some('?') => {
                    self.bump();
                    return TokenKind::AsQuestion;
                }
                _ => return TokenKind::As,
            }
        }

        match KEYWORDS.get(word.as_str()) {
            Some(kind) => kind.clone(),
            None => TokenKind::Identifier(word),
        }
    }

    fn lex_punctuation(&mut self) -> LexResult<TokenKind> {
        let c = self.bump().expect("caller checked for a character");

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' => {
                if self.peek() == Some(':') {
                    self.bump();
                    TokenKind::PathSep
                } else {
                    TokenKind::Colon
                }
            }
            '.' => {
                if self.peek() == Some('.') && self.peek_nth(1) == Some('.') {
                    self.bump();
                    self.bump();
                    TokenKind::Ellipsis
                } else {
                    TokenKind::Dot
                }
            }
            '?' => {
                if self.peek() == Some('.') {
                    self.bump();
                    TokenKind::QuestionDot
                } else {
                    TokenKind::QuestionMark
                }
            }
            '-' => {
                if self.peek() == Some('>') {
                    self.bump();
                    TokenKind::SmallRightArrow
                } else {
                    TokenKind::Minus
                }
            }
            '=' => match self.peek() {
                Some('>') => {
                    self.bump();
                    TokenKind::BigRightArrow
                }
                Some('=') => {
                    self.bump();
                    TokenKind::Equal
                }
                _ => TokenKind::Assign,
            },
            '!' => {
                if self.peek() == Some('=') {
                    self.bump();
                    TokenKind::NotEqual
                } else {
                    TokenKind::ExclamationMark
                }
            }
            '<' => match self.peek() {
                Some('=') => {
                    self.bump();
                    TokenKind::LessOrEqual
                }
                Some('<') => {
                    self.bump();
                    TokenKind::ShiftLeft
                }
                _ => TokenKind::LessThan,
            },
            '>' => match self.peek() {
                Some('=') => {
                    self.bump();
                    TokenKind::GreaterOrEqual
                }
                Some('>') => {
                    self.bump();
                    TokenKind::ShiftRight
                }
                _ => TokenKind::GreaterThan,
            },
            '&' => {
                if self.peek() == Some('&') {
                    self.bump();
                    TokenKind::DoubleAmpersand
                } else {
                    TokenKind::Ampersand
                }
            }
            '|' => {
                if self.peek() == Some('|') {
                    self.bump();
                    TokenKind::DoublePipe
                } else {
                    TokenKind::Pipe
                }
            }
            '+' => TokenKind::Plus,
            '*' => TokenKind::Times,
            '/' => TokenKind::Divide,
            '%' => TokenKind::Percent,
            '^' => TokenKind::Caret,
            '~' => TokenKind::Tilde,
            '\\' => TokenKind::Backslash,
            other => {
                return Err(self.error(format!("unexpected character '{other}'")));
            }
        };

        Ok(kind)
    }
}

fn parse_documentation(body: &str) -> Documentation {
    let mut doc = Documentation::default();

    for line in body.lines() {
        let line = line.trim().trim_start_matches('*').trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("@brief") {
            doc.brief = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("@param") {
            let rest = rest.trim();
            let (name, desc) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            doc.params.push((name.to_string(), desc.trim().to_string()));
        } else if let Some(rest) = line.strip_prefix("@prop") {
            let rest = rest.trim();
            let (name, desc) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            doc.props.push((name.to_string(), desc.trim().to_string()));
        } else if let Some(rest) = line.strip_prefix("@extraComments") {
            doc.extra_comments.push(rest.trim().to_string());
        } else if doc.brief.is_none() {
            doc.brief = Some(line.to_string());
        } else {
            doc.extra_comments.push(line.to_string());
        }
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .lex()
            .expect("lexing failed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_lex_let_statement() {
        assert_eq!(
            kinds("let foo = 42;"),
            vec![
                TokenKind::Let,
                TokenKind::Identifier("foo".into()),
                TokenKind::Assign,
                TokenKind::IntLiteral(42),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_keywords_and_wildcard() {
        assert_eq!(
            kinds("match _ variant is"),
            vec![
                TokenKind::Match,
                TokenKind::Underscore,
                TokenKind::Variant,
                TokenKind::Is,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_numeric_bases() {
        assert_eq!(
            kinds("0xff 0o17 0b101 3.5 2.0f 1e3"),
            vec![
                TokenKind::HexIntLiteral(255),
                TokenKind::OctIntLiteral(15),
                TokenKind::BinaryIntLiteral(5),
                TokenKind::DoubleLiteral(3.5),
                TokenKind::FloatLiteral(2.0),
                TokenKind::DoubleLiteral(1000.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_cast_forms() {
        assert_eq!(
            kinds("x as i32 as! u8 as? Foo"),
            vec![
                TokenKind::Identifier("x".into()),
                TokenKind::As,
                TokenKind::Identifier("i32".into()),
                TokenKind::AsBang,
                TokenKind::Identifier("u8".into()),
                TokenKind::AsQuestion,
                TokenKind::Identifier("Foo".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_strings() {
        assert_eq!(
            kinds(r#""hello" b"ab""#),
            vec![
                TokenKind::StringLiteral("hello".into()),
                TokenKind::BinaryStringLiteral(vec![b'a', b'b']),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_nullable_punctuation() {
        assert_eq!(
            kinds("a?.b ...rest"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::QuestionDot,
                TokenKind::Identifier("b".into()),
                TokenKind::Ellipsis,
                TokenKind::Identifier("rest".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_documentation_channel() {
        let tokens = Lexer::new(
            "/**\n * @brief Adds numbers\n * @param a left operand\n */\nfn add() -> i32 = 0",
        )
        .lex()
        .expect("lexing failed");

        let doc = tokens[0]
            .documentation
            .as_ref()
            .expect("documentation should attach to the next token");
        assert_eq!(doc.brief.as_deref(), Some("Adds numbers"));
        assert_eq!(doc.params, vec![("a".to_string(), "left operand".to_string())]);
        assert_eq!(tokens[0].kind, TokenKind::Fn);
    }

    #[test]
    fn test_line_comments_are_skipped() {
        assert_eq!(
            kinds("let x // trailing\n= 1"),
            vec![
                TokenKind::Let,
                TokenKind::Identifier("x".into()),
                TokenKind::Assign,
                TokenKind::IntLiteral(1),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_error_on_unknown_character() {
        assert!(Lexer::new("let § = 1").lex().is_err());
    }
}
