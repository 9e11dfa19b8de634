use std::collections::BTreeSet;
use std::fmt;

use itertools::Itertools;

use super::{Rule, CFG};
use crate::error::{ParseError, Result};
use crate::symbol::{normalize_epsilon, EPSILON_STR};

impl CFG {
    /// 解析文法文本。
    ///
    /// 每行一个产生式`V -> r1 | r2 | ...`，规则里的符号用空白分隔，`ε`或`~`表示空规则。
    /// 终结符就是`alphabet`里的符号，右部其他符号都是变元。
    /// 第一行的变元是开始变元；同一个变元出现在多行时规则合并；空行忽略。
    pub fn parse(alphabet: &BTreeSet<String>, text: &str) -> Result<CFG> {
        let mut grammar: Option<CFG> = None;

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let malformed = || ParseError::MalformedProduction(line.to_string());
            let (variable, body) = line.split_once("->").ok_or_else(malformed)?;

            let variable = variable.trim();
            if variable.is_empty()
                || variable.contains(char::is_whitespace)
                || alphabet.contains(variable)
                || normalize_epsilon(variable) == EPSILON_STR
            {
                return Err(malformed().into());
            }

            let grammar = grammar.get_or_insert_with(|| CFG::new(alphabet.clone(), variable));
            grammar.variables.insert(variable.to_string());
            if body.trim().is_empty() {
                continue;
            }
            for alternative in body.split('|') {
                let rule: Rule = alternative
                    .split_whitespace()
                    .map(normalize_epsilon)
                    .collect();
                if rule.is_empty() {
                    return Err(malformed().into());
                }
                grammar.add_rule(variable, rule);
            }
        }

        grammar.ok_or_else(|| ParseError::MalformedProduction(text.to_string()).into())
    }

    /// 不给字母表的解析：没有出现在任何产生式左边的符号都是终结符。
    pub fn parse_inferring_terminals(text: &str) -> Result<CFG> {
        let productions = || text.lines().filter_map(|line| line.split_once("->"));
        let heads: BTreeSet<String> = productions()
            .map(|(variable, _)| variable.trim().to_string())
            .collect();
        let terminals: BTreeSet<String> = productions()
            .flat_map(|(_, body)| body.split(|c: char| c == '|' || c.is_whitespace()))
            .filter(|sym| !sym.is_empty())
            .map(normalize_epsilon)
            .filter(|sym| sym != EPSILON_STR && !heads.contains(sym))
            .collect();
        CFG::parse(&terminals, text)
    }
}

/// 每个变元一行，按变元顺序输出；同一行的规则按字典序排列。
impl fmt::Display for CFG {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self.variables.iter().map(|variable| {
            let rules = self.rules(variable).map(|rule| rule.join(" ")).sorted().join(" | ");
            format!("{}\t-> {}", variable, rules)
        });
        write!(f, "{}", lines.format("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn ab() -> BTreeSet<String> {
        BTreeSet::from(["a".to_string(), "b".to_string()])
    }

    #[test_log::test]
    fn parse_and_print() {
        let g = CFG::parse(&ab(), "S -> a S b | ~\n\nS -> b T\nT -> a").unwrap();
        assert_eq!(g.start(), "S");
        assert_eq!(g.to_string(), "S\t-> a S b | b T | ε\nT\t-> a");
        assert_eq!(CFG::parse(&ab(), &g.to_string()).unwrap(), g);
    }

    #[test_log::test]
    fn variable_order_follows_first_appearance() {
        let g = CFG::parse(&ab(), "S -> X Y\nY -> b\nX -> a").unwrap();
        let order: Vec<_> = g.variables().iter().cloned().collect();
        assert_eq!(order, vec!["S", "X", "Y"]);
    }

    #[test_log::test]
    fn terminals_can_be_inferred() {
        let g = CFG::parse_inferring_terminals("S -> a S b | ~\nS -> T\nT -> c").unwrap();
        assert_eq!(
            g.terminals(),
            &BTreeSet::from(["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert_eq!(g.variables().len(), 2);
    }

    #[test_log::test]
    fn malformed_productions() {
        for text in ["", "S a b", "-> a", "a -> b", "S -> a | | b", "S T -> a"] {
            assert!(
                matches!(
                    CFG::parse(&ab(), text),
                    Err(Error::Parse(ParseError::MalformedProduction(_)))
                ),
                "{:?}",
                text
            );
        }
    }
}
