//! 找出两个正则表达式或两个文法的语言之间的差别。

use std::collections::BTreeSet;

use tracing::debug;

use crate::cfg::CFG;
use crate::dfa::DFA;
use crate::earley::Generator;
use crate::error::Result;
use crate::nfa::{Builder, NFA};

/// 比较文法时的搜索上限。
///
/// 两个文法是否等价不可判定，只能按长度逐个比较，到上限就停止。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    /// 比较的最大串长度（含）。
    pub max_length: usize,
    /// 两边一共最多生成多少个串。
    pub max_strings: usize,
}

impl Default for Budget {
    fn default() -> Self {
        Budget {
            max_length: 10,
            max_strings: 50_000,
        }
    }
}

/// 比较两个文法的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// 在长度`length`上两个语言不同。`left`是只属于第一个文法的串，`right`是只属于第二个文法的串。
    Different {
        length: usize,
        left: Option<String>,
        right: Option<String>,
    },
    /// 预算用完也没找到差别，这不能说明两个文法等价。
    /// `checked_up_to`是完整比较过的最大长度。
    Inconclusive { checked_up_to: Option<usize> },
}

/// 两个NFA各自独有的最短串。两个都是`None`时语言相同。
pub fn nfa_witnesses(builder: &mut Builder, n1: &NFA, n2: &NFA) -> (Option<String>, Option<String>) {
    let only_first = builder.difference(n1, n2);
    let only_second = builder.difference(n2, n1);
    (
        DFA::build_dfa_from_nfa(&only_first).find_match(),
        DFA::build_dfa_from_nfa(&only_second).find_match(),
    )
}

/// 两个正则表达式各自独有的最短串。
pub fn regex_witnesses(
    alphabet: &BTreeSet<char>,
    r1: &str,
    r2: &str,
) -> Result<(Option<String>, Option<String>)> {
    let mut builder = Builder::new();
    let n1 = builder.build_nfa_from_re(alphabet, r1)?;
    let n2 = builder.build_nfa_from_re(alphabet, r2)?;
    Ok(nfa_witnesses(&mut builder, &n1, &n2))
}

/// 从长度0开始逐个长度比较两个文法生成的串。
pub fn grammar_witnesses(g1: &CFG, g2: &CFG, budget: &Budget) -> Verdict {
    let gen1 = Generator::new(g1);
    let gen2 = Generator::new(g2);
    let mut remaining = budget.max_strings;
    let mut checked_up_to = None;

    for length in 0..=budget.max_length {
        let mut enumerate = |generator: &Generator| -> Option<BTreeSet<String>> {
            let words: BTreeSet<String> = generator.generate(length).take(remaining.saturating_add(1)).collect();
            remaining = remaining.checked_sub(words.len())?;
            Some(words)
        };
        let (Some(w1), Some(w2)) = (enumerate(&gen1), enumerate(&gen2)) else {
            debug!("string budget exhausted at length {}", length);
            break;
        };

        let left = w1.difference(&w2).next().cloned();
        let right = w2.difference(&w1).next().cloned();
        if left.is_some() || right.is_some() {
            return Verdict::Different {
                length,
                left,
                right,
            };
        }
        debug!("languages agree on length {} ({} strings)", length, w1.len());
        checked_up_to = Some(length);
    }

    Verdict::Inconclusive { checked_up_to }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab() -> BTreeSet<char> {
        BTreeSet::from(['a', 'b'])
    }

    fn grammar(text: &str) -> CFG {
        let alphabet = BTreeSet::from(["a".to_string(), "b".to_string()]);
        CFG::parse(&alphabet, text).unwrap()
    }

    #[test_log::test]
    fn equivalent_regexes() {
        let witnesses = regex_witnesses(&ab(), "(a(ba)*)*", "((a|(ab))*a)?").unwrap();
        assert_eq!(witnesses, (None, None));
    }

    #[test_log::test]
    fn different_regexes() {
        let (left, right) = regex_witnesses(&ab(), "a*", "a*b?").unwrap();
        assert_eq!(left, None);
        assert_eq!(right.as_deref(), Some("b"));
    }

    #[test_log::test]
    fn different_grammars() {
        let verdict = grammar_witnesses(
            &grammar("S -> a S b | ε"),
            &grammar("S -> a S b | a b"),
            &Budget::default(),
        );
        assert_eq!(
            verdict,
            Verdict::Different {
                length: 0,
                left: Some(String::new()),
                right: None
            }
        );
    }

    #[test_log::test]
    fn equivalent_grammars_are_inconclusive() {
        let budget = Budget {
            max_length: 6,
            ..Budget::default()
        };
        let verdict = grammar_witnesses(
            &grammar("S -> a S | ε"),
            &grammar("S -> S a | ε"),
            &budget,
        );
        assert_eq!(verdict, Verdict::Inconclusive { checked_up_to: Some(6) });
    }

    #[test_log::test]
    fn string_budget_stops_the_search() {
        let budget = Budget {
            max_length: 10,
            max_strings: 5,
        };
        let verdict = grammar_witnesses(
            &grammar("S -> a S | b S | ε"),
            &grammar("S -> S a | S b | ε"),
            &budget,
        );
        assert_eq!(verdict, Verdict::Inconclusive { checked_up_to: Some(0) });
    }
}
