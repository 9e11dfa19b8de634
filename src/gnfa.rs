use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::dfa::CompletedDfa;
use crate::state::StateId;
use crate::symbol::EPSILON_STR;

mod edge;

use edge::Edges;

/// 广义NFA，边上的标签是整个正则表达式。
///
/// 只用来从DFA提取正则表达式：加入新的开始状态`start`和唯一的接收状态`accept`，
/// 然后逐个消去中间状态，最后`start -> accept`这条边的标签就是结果。
#[derive(Debug, Clone)]
pub struct GNFA {
    states: BTreeSet<StateId>,
    start: StateId,
    accept: StateId,
    edges: Edges,
}

impl GNFA {
    /// 从DFA构造GNFA。
    ///
    /// 新的开始状态用一条空转移连到DFA的开始状态，每个DFA接收状态用空转移连到新的接收状态。
    /// DFA上的每条转移变成一条标着对应字符的边，同一对状态之间的多条边用并合并。
    pub fn from_dfa(dfa: &impl CompletedDfa) -> Self {
        let max = dfa.states().iter().next_back().copied().unwrap_or(0);
        let start = max + 1;
        let accept = max + 2;

        let mut edges = Edges::default();
        edges.insert(start, EPSILON_STR.to_string(), dfa.start_state(), union);

        for &from in dfa.states() {
            for &input in dfa.alphabet() {
                if let Some(to) = dfa.delta(from, input) {
                    edges.insert(from, input.to_string(), to, union);
                }
            }
            if dfa.accept_states().contains(&from) {
                edges.insert(from, EPSILON_STR.to_string(), accept, union);
            }
        }

        let mut states = dfa.states().clone();
        states.insert(start);
        states.insert(accept);

        GNFA {
            states,
            start,
            accept,
            edges,
        }
    }

    /// 消去一个中间状态，返回新的GNFA。
    ///
    /// 设`q`的自环标签为 s（没有自环时是ε），对每条进入的边 p -a-> q 和每条离开的边 q -b-> r，
    /// 加入一条 p -a(s)*b-> r 的边，和已有的平行边求并。然后删除`q`和它的所有边。
    pub fn eliminate(mut self, q: StateId) -> Self {
        let self_loop = self
            .edges
            .label(q, q)
            .map(|label| format!("{}*", atom(label)));

        let incoming = self.edges.incoming(q);
        let outgoing = self.edges.outgoing(q);
        trace!(
            "eliminating state {} ({} in, {} out)",
            q,
            incoming.len(),
            outgoing.len()
        );

        self.edges.remove_state(q);
        for a in &incoming {
            for b in &outgoing {
                let label = match &self_loop {
                    Some(star) => concat(&concat(a.label(), star), b.label()),
                    None => concat(a.label(), b.label()),
                };
                self.edges.insert(a.from(), label, b.to(), union);
            }
        }

        self.states.remove(&q);
        self
    }

    /// 按编号从小到大消去所有中间状态，返回提取出的正则表达式。
    /// 开始状态到接收状态之间没有边时返回`None`，表示空语言。
    pub fn to_regular_expression(self) -> Option<String> {
        let (start, accept) = (self.start, self.accept);
        let intermediate: Vec<StateId> = self
            .states
            .iter()
            .copied()
            .filter(|q| *q != start && *q != accept)
            .collect();
        debug!("eliminating {} GNFA states", intermediate.len());

        let reduced = intermediate
            .into_iter()
            .fold(self, |gnfa, q| gnfa.eliminate(q));
        reduced.edges.label(start, accept).map(str::to_string)
    }
}

/// 两个正则表达式的并。
///
/// 两边都不是ε时得到`(a|b)`；有一边是ε时得到`(a)?`；两边都是ε时还是ε。
fn union(a: &str, b: &str) -> String {
    if a == b {
        return a.to_string();
    }
    match (a == EPSILON_STR, b == EPSILON_STR) {
        (true, true) => EPSILON_STR.to_string(),
        (true, false) => format!("{}?", atom(b)),
        (false, true) => format!("{}?", atom(a)),
        (false, false) => format!("({}|{})", a, b),
    }
}

/// 两个正则表达式的连接，ε是单位元。
fn concat(a: &str, b: &str) -> String {
    match (a == EPSILON_STR, b == EPSILON_STR) {
        (true, _) => b.to_string(),
        (false, true) => a.to_string(),
        (false, false) => format!("{}{}", a, b),
    }
}

/// 让表达式可以直接接上一个后缀运算符：单个符号或已经被一对括号整个包住的表达式原样返回，其余加括号。
fn atom(expr: &str) -> String {
    if expr.chars().count() == 1 || is_enclosed(expr) {
        expr.to_string()
    } else {
        format!("({})", expr)
    }
}

/// 第一个左括号是否和最后一个字符匹配。
fn is_enclosed(expr: &str) -> bool {
    if !expr.starts_with('(') || !expr.ends_with(')') {
        return false;
    }
    let mut depth = 0usize;
    let last = expr.chars().count() - 1;
    for (i, c) in expr.chars().enumerate() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return i == last;
                }
            }
            _ => (),
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfa::DFA;
    use crate::nfa::Builder;

    fn ab() -> BTreeSet<char> {
        BTreeSet::from(['a', 'b'])
    }

    fn extract(re: &str) -> Option<String> {
        let nfa = Builder::new().build_nfa_from_re(&ab(), re).unwrap();
        GNFA::from_dfa(&DFA::build_dfa_from_nfa(&nfa)).to_regular_expression()
    }

    fn equivalent(r1: &str, r2: &str) -> bool {
        let mut builder = Builder::new();
        let n1 = builder.build_nfa_from_re(&ab(), r1).unwrap();
        let n2 = builder.build_nfa_from_re(&ab(), r2).unwrap();
        let diff = builder.symmetric_difference(&n1, &n2);
        DFA::build_dfa_from_nfa(&diff).find_match().is_none()
    }

    #[test_log::test]
    fn union_and_concat_rules() {
        assert_eq!(union("a", "b"), "(a|b)");
        assert_eq!(union("ab", EPSILON_STR), "(ab)?");
        assert_eq!(union(EPSILON_STR, "a"), "a?");
        assert_eq!(union(EPSILON_STR, EPSILON_STR), EPSILON_STR);
        assert_eq!(concat(EPSILON_STR, "ab"), "ab");
        assert_eq!(concat("ab", EPSILON_STR), "ab");
        assert_eq!(concat("a", "b*"), "ab*");
    }

    #[test_log::test]
    fn atoms() {
        assert_eq!(atom("a"), "a");
        assert_eq!(atom("(a|b)"), "(a|b)");
        assert_eq!(atom("(a)(b)"), "((a)(b))");
        assert_eq!(atom("(a|b)?"), "((a|b)?)");
        assert_eq!(atom("ab"), "(ab)");
    }

    #[test_log::test]
    fn extracted_regex_is_equivalent() {
        for re in ["a", "ab*", "(a|b)*abb", "(a(ba)*)*", "a?b+", ""] {
            let extracted = extract(re).unwrap();
            assert!(equivalent(re, &extracted), "{} vs {}", re, extracted);
        }
    }

    #[test_log::test]
    fn empty_language_has_no_regex() {
        let mut builder = Builder::new();
        let null = builder.null(&ab());
        let gnfa = GNFA::from_dfa(&DFA::build_dfa_from_nfa(&null));
        assert_eq!(gnfa.to_regular_expression(), None);
    }

    #[test_log::test]
    fn empty_string_language_extracts_epsilon() {
        assert_eq!(extract("").as_deref(), Some(EPSILON_STR));
    }
}
