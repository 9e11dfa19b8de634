use crate::symbol::{is_epsilon_glyph, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    LeftParen,
    RightParen,
    Asterisk,
    Pipe,
    QuestionMark,
    Plus,
    Symbol(Symbol),
    Eof,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Asterisk => write!(f, "*"),
            Token::Pipe => write!(f, "|"),
            Token::QuestionMark => write!(f, "?"),
            Token::Plus => write!(f, "+"),
            Token::Symbol(sym) => write!(f, "{}", sym),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

/// 把正则表达式切分成记号，最后总是以`Token::Eof`结尾。
///
/// 只认字母、数字、空串符号和`| * + ? ( )`，其他字符（包括空白）直接丢掉，不算错误。
pub fn lex(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = text
        .chars()
        .filter_map(|c| match c {
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            '*' => Some(Token::Asterisk),
            '+' => Some(Token::Plus),
            '|' => Some(Token::Pipe),
            '?' => Some(Token::QuestionMark),
            c if c.is_ascii_alphanumeric() => Some(Token::Symbol(Symbol::Char(c))),
            c if is_epsilon_glyph(c) => Some(Token::Symbol(Symbol::Epsilon)),
            _ => None,
        })
        .collect();
    tokens.push(Token::Eof);
    tokens
}
