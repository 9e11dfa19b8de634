/// 空串符号。
pub const EPSILON: char = 'ε';

/// 空串符号的另一种写法，方便在键盘上输入。
pub const ALT_EPSILON: char = '~';

/// 文法里的空串符号。文法的符号是字符串，所以单独定义一个字符串常量。
pub const EPSILON_STR: &str = "ε";

/// 自动机转移上的标签：要么是一个输入字符，要么是空转移。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Epsilon,
    Char(char),
}

impl Symbol {
    /// 把一个输入字符转换为标签，`ε`和`~`都会被当作空转移。
    pub fn from_char(c: char) -> Self {
        if is_epsilon_glyph(c) {
            Symbol::Epsilon
        } else {
            Symbol::Char(c)
        }
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Epsilon => write!(f, "{}", EPSILON),
            Symbol::Char(c) => write!(f, "{}", c),
        }
    }
}

pub fn is_epsilon_glyph(c: char) -> bool {
    c == EPSILON || c == ALT_EPSILON
}

/// 文本里的`~`统一换成`ε`。
pub fn normalize_epsilon(token: &str) -> String {
    if token.chars().count() == 1 && token.chars().all(is_epsilon_glyph) {
        EPSILON_STR.to_string()
    } else {
        token.to_string()
    }
}
