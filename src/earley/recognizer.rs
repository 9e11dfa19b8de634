use std::collections::BTreeSet;

use tracing::trace;

use super::Chart;
use crate::cfg::CFG;

/// 判断串是否属于文法的语言。
///
/// 文法按原样使用，不做化简；空规则、单元规则、无用变元都可以有。
#[derive(Debug, Clone)]
pub struct Recognizer {
    chart: Chart,
}

impl Recognizer {
    pub fn new(cfg: &CFG) -> Self {
        Recognizer {
            chart: Chart::new(cfg),
        }
    }

    /// 每个字符是一个终结符。
    pub fn accepts(&self, text: &str) -> bool {
        let tokens: Vec<String> = text.chars().map(String::from).collect();
        self.accepts_tokens(&tokens)
    }

    pub fn accepts_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        let mut columns = vec![BTreeSet::from([self.chart.start_item()])];
        for token in tokens {
            let Some(terminal) = self.chart.terminal(token.as_ref()) else {
                return false;
            };
            let mut scans = self.chart.expand(&mut columns);
            match scans.remove(&terminal) {
                Some(next) => columns.push(next),
                None => {
                    trace!("no item expects {:?} at column {}", token.as_ref(), columns.len() - 1);
                    return false;
                }
            }
        }
        self.chart.expand(&mut columns);
        columns
            .last()
            .is_some_and(|column| column.contains(&self.chart.stop_item()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn grammar(alphabet: &[&str], text: &str) -> CFG {
        let alphabet: BTreeSet<String> = alphabet.iter().map(|s| s.to_string()).collect();
        CFG::parse(&alphabet, text).unwrap()
    }

    #[test_log::test]
    fn anbn() {
        let recognizer = Recognizer::new(&grammar(&["a", "b"], "S -> a S b | ε"));
        for word in ["", "ab", "aabb"] {
            assert!(recognizer.accepts(word), "{}", word);
        }
        for word in ["a", "aab", "ba", "abc"] {
            assert!(!recognizer.accepts(word), "{}", word);
        }
    }

    #[test_log::test]
    fn nullable_variables_late_in_column() {
        let recognizer = Recognizer::new(&grammar(&["a"], "S -> A A a\nA -> B\nB -> ε"));
        assert!(recognizer.accepts("a"));
        assert!(!recognizer.accepts(""));
        assert!(!recognizer.accepts("aa"));
    }

    #[test_log::test]
    fn left_recursion_and_unit_cycles() {
        let recognizer = Recognizer::new(&grammar(&["a", "b"], "S -> S a | T\nT -> S | b"));
        for word in ["b", "ba", "baaa"] {
            assert!(recognizer.accepts(word), "{}", word);
        }
        for word in ["", "a", "ab", "bb"] {
            assert!(!recognizer.accepts(word), "{}", word);
        }
    }

    #[test_log::test]
    fn multi_character_terminals() {
        let recognizer = Recognizer::new(&grammar(&["if", "x"], "S -> if S | x"));
        assert!(recognizer.accepts_tokens(&["if", "if", "x"]));
        assert!(!recognizer.accepts_tokens(&["if"]));
        assert!(!recognizer.accepts("ifx"));
    }

    #[test_log::test]
    fn empty_language() {
        let recognizer = Recognizer::new(&grammar(&["a"], "S -> a S"));
        assert!(!recognizer.accepts(""));
        assert!(!recognizer.accepts("a"));
    }
}
