use std::fmt;

use crate::error::Result;
use crate::symbol::Symbol;

/// 正则表达式的词法分析。
pub mod lexer;

/// 正则表达式的语法分析。
pub mod parser;

/// 正则表达式的语法树。
///
/// 每种遍历（构造NFA、打印）都对它做模式匹配，漏掉某种节点会被编译器发现。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(Symbol),
    Concat(Box<Expr>, Box<Expr>),
    Union(Box<Expr>, Box<Expr>),
    Option(Box<Expr>),
    Star(Box<Expr>),
    Plus(Box<Expr>),
    Group(Box<Expr>),
}

/// 解析正则表达式。
///
/// 过滤掉不认识的字符之后如果什么都不剩，返回`Ok(None)`，表示只含空串的语言。
pub fn parse(text: &str) -> Result<Option<Expr>> {
    let tokens = lexer::lex(text);
    if tokens.len() == 1 {
        return Ok(None);
    }
    parser::Parser::new(&tokens).parse().map(Some)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(sym) => write!(f, "{}", sym),
            Expr::Concat(left, right) => write!(f, "{}{}", left, right),
            Expr::Union(left, right) => write!(f, "{}|{}", left, right),
            Expr::Option(expr) => write!(f, "{}?", expr),
            Expr::Star(expr) => write!(f, "{}*", expr),
            Expr::Plus(expr) => write!(f, "{}+", expr),
            Expr::Group(expr) => write!(f, "({})", expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn stripped_input_is_the_empty_string_language() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse(" - ").unwrap(), None);
    }

    #[test_log::test]
    fn ignored_characters_do_not_matter() {
        assert_eq!(
            parse("a b | c").unwrap().unwrap().to_string(),
            parse("ab|c").unwrap().unwrap().to_string()
        );
    }
}
