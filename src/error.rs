use thiserror::Error;

/// 整个引擎共用的错误类型。
///
/// 错误只有两类：输入文本解析失败，和内部不变量被破坏。
/// “没有结果”（比如DFA没有可达的接收状态）不是错误，用`Option::None`表示。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("parse failure: {0}")]
    Parse(#[from] ParseError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// 解析失败的原因。不带行号列号，调用方只需要知道“解析失败”。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected token {found:?}")]
    UnexpectedToken { found: String },

    #[error("unmatched parenthesis")]
    UnmatchedParen,

    #[error("malformed production {0:?}")]
    MalformedProduction(String),

    #[error("malformed edge {0:?}")]
    MalformedEdge(String),

    #[error("malformed state list {0:?}")]
    MalformedStateList(String),

    #[error("malformed alphabet {0:?}")]
    MalformedAlphabet(String),
}

pub type Result<T> = std::result::Result<T, Error>;
