use colored::Colorize;

/// Source range of a token or AST node. `start` and `end` are
/// `(line, column)` pairs (zero based); `source` keeps the full input so
/// diagnostics can be rendered without threading the file around.
#[derive(Default, Debug, Clone, Eq, serde::Serialize, serde::Deserialize)]
pub struct Span {
    pub start: (usize, usize),
    pub end: (usize, usize),
    pub source: String,
}

impl Span {
    /// Render a diagnostic message pointing at this span, with the offending
    /// range colored red.
    pub fn to_string(&self, msg: impl ToString) -> String {
        let Span { start, end, source } = self;
        let lines = source.lines().collect::<Vec<_>>();

        let Some(line_str) = lines.get(start.0) else {
            return msg.to_string();
        };

        let left_margin = format!("{}", start.0 + 1).len();
        let left_margin_fill = " ".repeat(left_margin);

        let col = start.1.min(line_str.len());
        let (left, rest) = line_str.split_at(col);
        let marked = if start.0 == end.0 {
            let split = (end.1.saturating_sub(start.1)).min(rest.len());
            let (err_str, after) = rest.split_at(split);
            format!("{left}{}{after}", err_str.red())
        } else {
            format!("{left}{}", rest.red())
        };

        let squiggle_fill = " ".repeat(col);

        format!(
            "{left_margin_fill} |\n{line} |{marked}\n{left_margin_fill} |{squiggle_fill}^--- {}",
            msg.to_string(),
            line = start.0 + 1
        )
    }

    /// Combine two spans into one covering both.
    pub fn merge(&self, other: &Span) -> Span {
        let Span { start, source, .. } = self.clone();
        let Span { end, .. } = other.clone();

        Span { start, end, source }
    }
}

impl PartialEq<Span> for Span {
    fn eq(&self, _other: &Span) -> bool {
        // Positions never take part in semantic equality; this keeps AST and
        // token comparisons in tests independent of concrete locations.
        true
    }
}

/// Documentation extracted from a `/** ... */` comment. Tags accumulate into
/// this object, which the lexer attaches to the next emitted token.
#[derive(Default, Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Documentation {
    pub brief: Option<String>,
    pub params: Vec<(String, String)>,
    pub props: Vec<(String, String)>,
    pub extra_comments: Vec<String>,
}

impl Documentation {
    pub fn is_empty(&self) -> bool {
        self.brief.is_none()
            && self.params.is_empty()
            && self.props.is_empty()
            && self.extra_comments.is_empty()
    }
}

/// The closed set of token kinds of the surface language.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TokenKind {
    // Keywords
    Class,
    Variant,
    Interface,
    Enum,
    Fn,
    Cfn,
    Coroutine,
    Let,
    Const,
    Mut,
    Mutate,
    For,
    Foreach,
    While,
    Do,
    If,
    Else,
    Match,
    Return,
    Break,
    Continue,
    New,
    Spawn,
    This,
    Static,
    Strict,
    Struct,
    Throw,
    Yield,
    YieldBang,
    Override,
    Unreachable,
    Impl,
    From,
    Import,
    Namespace,
    Local,
    Partial,
    Type,
    In,
    Is,
    As,
    AsBang,
    AsQuestion,

    // Literals
    Identifier(String),
    IntLiteral(u64),
    BinaryIntLiteral(u64),
    OctIntLiteral(u64),
    HexIntLiteral(u64),
    FloatLiteral(f64),
    DoubleLiteral(f64),
    StringLiteral(String),
    BinaryStringLiteral(Vec<u8>),
    CharLiteral(char),
    True,
    False,
    Null,
    Underscore,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    PathSep,
    Dot,
    QuestionDot,
    Ellipsis,
    SmallRightArrow,
    BigRightArrow,
    Assign,
    Equal,
    NotEqual,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    ShiftLeft,
    ShiftRight,
    Plus,
    Minus,
    Times,
    Divide,
    Percent,
    ExclamationMark,
    DoubleAmpersand,
    DoublePipe,
    Ampersand,
    Pipe,
    Caret,
    Tilde,
    QuestionMark,
    Backslash,

    Eof,
}

impl TokenKind {
    /// Loose kind comparison: variants match regardless of carried values.
    pub fn matches(&self, other: &TokenKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn describe(&self) -> String {
        match self {
            TokenKind::Identifier(name) => format!("identifier '{name}'"),
            TokenKind::StringLiteral(_) => "string literal".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("{other:?}"),
        }
    }
}

/// A single lexed token: kind, source position and (rarely) the
/// documentation block that preceded it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Span,
    pub documentation: Option<Documentation>,
}

impl Token {
    pub fn new(kind: TokenKind, position: Span) -> Token {
        Token {
            kind,
            position,
            documentation: None,
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        // Documentation and position do not take part in equality.
        self.kind == other.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loose_kind_matching() {
        assert!(TokenKind::Identifier("foo".into()).matches(&TokenKind::Identifier("bar".into())));
        assert!(TokenKind::IntLiteral(1).matches(&TokenKind::IntLiteral(2)));
        assert!(!TokenKind::IntLiteral(1).matches(&TokenKind::HexIntLiteral(1)));
    }

    #[test]
    fn test_token_equality_ignores_position() {
        let lhs = Token::new(TokenKind::Let, Span::default());
        let rhs = Token::new(
            TokenKind::Let,
            Span {
                start: (4, 2),
                end: (4, 5),
                source: "let".into(),
            },
        );

        assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_span_merge() {
        let lhs = Span {
            start: (0, 0),
            end: (0, 3),
            source: "let x".into(),
        };
        let rhs = Span {
            start: (0, 4),
            end: (0, 5),
            source: "let x".into(),
        };

        let merged = lhs.merge(&rhs);
        assert_eq!(merged.start, (0, 0));
        assert_eq!(merged.end, (0, 5));
    }
}
