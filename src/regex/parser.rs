use super::lexer::Token;
use super::Expr;
use crate::error::{ParseError, Result};

/// 递归下降的正则表达式解析器。
///
/// 文法（优先级从高到低）：
///
/// ```text
/// union        := concat ('|' union)?
/// concat       := option (concat)?
/// option       := star '?'?
/// star         := plus '*'?
/// plus         := primary '+'?
/// primary      := '(' union ')' | symbol
/// ```
///
/// 连接没有运算符，两个相邻的项之间只要不是`)`、`|`或输入结尾，就当作连接。
pub struct Parser<'t> {
    tokens: &'t [Token],
    current: usize,
}

impl<'t> Parser<'t> {
    /// `tokens`必须以`Token::Eof`结尾，`lexer::lex`的输出满足这一点。
    pub fn new(tokens: &'t [Token]) -> Self {
        Parser { tokens, current: 0 }
    }

    pub fn parse(mut self) -> Result<Expr> {
        let expr = self.union()?;
        match self.peek() {
            Token::Eof => Ok(expr),
            Token::RightParen => Err(ParseError::UnmatchedParen.into()),
            other => Err(ParseError::UnexpectedToken {
                found: other.to_string(),
            }
            .into()),
        }
    }

    fn union(&mut self) -> Result<Expr> {
        let expr = self.concat()?;
        if self.matches(Token::Pipe) {
            let rest = self.union()?;
            return Ok(Expr::Union(Box::new(expr), Box::new(rest)));
        }
        Ok(expr)
    }

    fn concat(&mut self) -> Result<Expr> {
        let expr = self.option()?;
        if !self.is_at_end() && !self.check(Token::RightParen) && !self.check(Token::Pipe) {
            let rest = self.concat()?;
            return Ok(Expr::Concat(Box::new(expr), Box::new(rest)));
        }
        Ok(expr)
    }

    fn option(&mut self) -> Result<Expr> {
        let expr = self.star()?;
        if self.matches(Token::QuestionMark) {
            return Ok(Expr::Option(Box::new(expr)));
        }
        Ok(expr)
    }

    fn star(&mut self) -> Result<Expr> {
        let expr = self.plus()?;
        if self.matches(Token::Asterisk) {
            return Ok(Expr::Star(Box::new(expr)));
        }
        Ok(expr)
    }

    fn plus(&mut self) -> Result<Expr> {
        let expr = self.primary()?;
        if self.matches(Token::Plus) {
            return Ok(Expr::Plus(Box::new(expr)));
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr> {
        if self.matches(Token::LeftParen) {
            let expr = self.union()?;
            if !self.matches(Token::RightParen) {
                return Err(ParseError::UnmatchedParen.into());
            }
            return Ok(Expr::Group(Box::new(expr)));
        }

        match self.peek() {
            Token::Symbol(sym) => {
                self.advance();
                Ok(Expr::Literal(sym))
            }
            other => Err(ParseError::UnexpectedToken {
                found: other.to_string(),
            }
            .into()),
        }
    }

    fn matches(&mut self, kind: Token) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, kind: Token) -> bool {
        !self.is_at_end() && self.peek() == kind
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.peek() == Token::Eof
    }

    fn peek(&self) -> Token {
        self.tokens.get(self.current).copied().unwrap_or(Token::Eof)
    }
}
