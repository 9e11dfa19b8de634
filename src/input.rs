//! 网页前端使用的按行描述的自动机格式。
//!
//! NFA：
//! ```text
//! 字母表    a,b
//! 开始状态  1
//! 接收状态  1,3
//! 转移      1 2 a,b
//!           2 2 a
//! ```
//! PDA 的转移写作`src dst read,pop -> push`，状态名可以是任意记号。
//! 两种格式里`~`和`ε`都表示空转移。

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{ParseError, Result};
use crate::nfa::{Transitions, NFA};
use crate::pda::{StackSymbol, PDA};
use crate::state::{StateAllocator, StateId};
use crate::symbol::{normalize_epsilon, Symbol, EPSILON_STR};

/// 逗号分隔的列表，去掉空白和空项。
fn parse_list(text: &str) -> Vec<&str> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

/// 逗号分隔的字母表，每个符号必须是一个字符。
pub fn parse_alphabet(text: &str) -> Result<BTreeSet<char>> {
    parse_list(text)
        .into_iter()
        .map(|sym| -> Result<char> {
            let mut chars = sym.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if Symbol::from_char(c) != Symbol::Epsilon => Ok(c),
                _ => Err(ParseError::MalformedAlphabet(text.to_string()).into()),
            }
        })
        .collect()
}

/// 逗号分隔的文法终结符，每个终结符可以有多个字符。
pub fn parse_terminals(text: &str) -> BTreeSet<String> {
    parse_list(text).into_iter().map(str::to_string).collect()
}

fn parse_state(text: &str) -> Result<StateId> {
    text.trim()
        .parse()
        .map_err(|_| ParseError::MalformedStateList(text.to_string()).into())
}

/// 解析NFA。状态名是非负整数。
pub fn parse_nfa(alphabet: &str, start: &str, accept: &str, edges: &str) -> Result<NFA> {
    let alphabet = parse_alphabet(alphabet)?;
    let start = parse_state(start)?;
    let accept = parse_list(accept)
        .into_iter()
        .map(parse_state)
        .collect::<Result<BTreeSet<_>>>()?;

    let mut states: BTreeSet<StateId> = accept.iter().copied().collect();
    states.insert(start);
    let mut transitions = Transitions::default();

    for line in edges.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let malformed = || ParseError::MalformedEdge(line.to_string());
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [src, dst, symbols] = fields.as_slice() else {
            return Err(malformed().into());
        };
        let src: StateId = src.parse().map_err(|_| malformed())?;
        let dst: StateId = dst.parse().map_err(|_| malformed())?;
        states.insert(src);
        states.insert(dst);

        let symbols = parse_list(symbols);
        if symbols.is_empty() {
            return Err(malformed().into());
        }
        for sym in symbols {
            let mut chars = sym.chars();
            let symbol = match (chars.next(), chars.next()) {
                (Some(c), None) => Symbol::from_char(c),
                _ => return Err(malformed().into()),
            };
            transitions.entry((src, symbol)).insert(dst);
        }
    }

    debug!("parsed NFA with {} states", states.len());
    Ok(NFA::new(states, alphabet, start, transitions, accept))
}

/// 状态名到编号的映射，第一次见到的名字分配新的编号。
#[derive(Default)]
struct StateNames {
    ids: StateAllocator,
    names: BTreeMap<String, StateId>,
}

impl StateNames {
    fn id(&mut self, name: &str) -> StateId {
        if let Some(id) = self.names.get(name) {
            return *id;
        }
        let id = self.ids.fresh();
        self.names.insert(name.to_string(), id);
        id
    }
}

/// `ε`变成`None`。
fn optional(token: &str) -> Option<String> {
    let token = normalize_epsilon(token.trim());
    (token != EPSILON_STR).then_some(token)
}

/// 解析PDA。输入字母表和栈字母表从转移里收集。
pub fn parse_pda(start: &str, accept: &str, edges: &str) -> Result<PDA> {
    let mut names = StateNames::default();
    let start = start.trim();
    if start.is_empty() {
        return Err(ParseError::MalformedStateList(start.to_string()).into());
    }
    let mut pda = PDA::new(names.id(start));
    for state in parse_list(accept) {
        pda.add_accept_state(names.id(state));
    }

    for line in edges.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let malformed = || ParseError::MalformedEdge(line.to_string());
        let mut fields = line.split_whitespace();
        let (Some(src), Some(dst)) = (fields.next(), fields.next()) else {
            return Err(malformed().into());
        };
        let label = fields.collect::<Vec<_>>().join(" ");
        let (lhs, push) = label.split_once("->").ok_or_else(malformed)?;
        let (read, pop) = lhs.split_once(',').ok_or_else(malformed)?;
        if [read, pop, push].iter().any(|t| t.trim().is_empty()) {
            return Err(malformed().into());
        }

        let (src, dst) = (names.id(src), names.id(dst));
        pda.add_transition(
            src,
            optional(read),
            optional(pop).map(StackSymbol::Named),
            dst,
            optional(push).map(StackSymbol::Named),
        );
    }

    debug!("parsed PDA with {} states", pda.states().len());
    Ok(pda)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfa::DFA;
    use crate::error::Error;

    #[test_log::test]
    fn nfa_from_edge_lines() {
        let nfa = parse_nfa("a, b", "1", "1,3", "1 2 a,b\n2 2 a\n\n2 3 b\n3 2 b\n3 1 a").unwrap();
        assert_eq!(nfa.states().len(), 3);
        assert_eq!(nfa.alphabet(), &BTreeSet::from(['a', 'b']));

        let dfa = DFA::build_dfa_from_nfa(&nfa);
        for word in ["", "ab", "bb", "abbb", "aaaba"] {
            assert!(dfa.accepts(word), "{}", word);
        }
        for word in ["a", "b", "abb"] {
            assert!(!dfa.accepts(word), "{}", word);
        }
    }

    #[test_log::test]
    fn epsilon_edges() {
        let nfa = parse_nfa("a", "0", "2", "0 1 ~\n1 2 a\n0 2 ε").unwrap();
        let dfa = DFA::build_dfa_from_nfa(&nfa);
        assert!(dfa.accepts(""));
        assert!(dfa.accepts("a"));
        assert!(!dfa.accepts("aa"));
    }

    #[test_log::test]
    fn malformed_nfa_input() {
        assert!(matches!(
            parse_nfa("ab", "0", "0", ""),
            Err(Error::Parse(ParseError::MalformedAlphabet(_)))
        ));
        assert!(matches!(
            parse_nfa("a", "x", "0", ""),
            Err(Error::Parse(ParseError::MalformedStateList(_)))
        ));
        for edges in ["0 1", "0 1 a b", "0 x a", "0 1 ab"] {
            assert!(
                matches!(
                    parse_nfa("a", "0", "1", edges),
                    Err(Error::Parse(ParseError::MalformedEdge(_)))
                ),
                "{:?}",
                edges
            );
        }
    }

    #[test_log::test]
    fn pda_from_edge_lines() {
        let pda = parse_pda("q0", "q2", "q0 q1 ~,~ -> $\nq1 q1 (,~ -> X\nq1 q1 ),X -> ~\nq1 q2 ~,$ -> ~").unwrap();
        assert_eq!(pda.states().len(), 3);
        assert_eq!(pda.start_state, 0);
        assert_eq!(pda.accept_states, BTreeSet::from([1]));
        assert_eq!(
            pda.input_alphabet(),
            &BTreeSet::from(["(".to_string(), ")".to_string()])
        );
        assert_eq!(
            pda.stack_alphabet(),
            &BTreeSet::from(["$".to_string(), "X".to_string()])
        );
        let key = (2, Some(")".to_string()), Some(StackSymbol::Named("X".to_string())));
        assert_eq!(pda.transitions().get(&key), Some(&BTreeSet::from([(2, None)])));
    }

    #[test_log::test]
    fn malformed_pda_input() {
        for edges in ["q0", "q0 q1 a -> b", "q0 q1 a,b", "q0 q1 ,b -> c"] {
            assert!(
                matches!(
                    parse_pda("q0", "q1", edges),
                    Err(Error::Parse(ParseError::MalformedEdge(_)))
                ),
                "{:?}",
                edges
            );
        }
    }
}
