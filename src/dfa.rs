use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::debug;

use crate::nfa::NFA;
use crate::state::StateId;
use crate::symbol::Symbol;

/// 已经构造完成的DFA，可以读取状态转移函数、字母表、开始状态等信息。
pub trait CompletedDfa {
    fn alphabet(&self) -> &BTreeSet<char>;
    fn start_state(&self) -> StateId;
    fn accept_states(&self) -> &BTreeSet<StateId>;
    fn states(&self) -> &BTreeSet<StateId>;

    /// delta 是状态转移函数δ的读音。这个函数等价于 δ(from, input)。
    /// 也就是说，这个函数会返回从状态from经过输入input到达的状态。
    fn delta(&self, from: StateId, input: char) -> Option<StateId>;

    fn number_of_states(&self) -> usize {
        self.states().len()
    }
}

/// DFA。
///
/// 状态编号是从0开始的稠密整数，0号状态总是开始状态。
/// 由子集构造法得到的DFA是完全的：每个状态在字母表的每个字符上都有转移，
/// 没有NFA状态可去时会转移到一个空集对应的陷阱状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DFA {
    states: BTreeSet<StateId>,
    alphabet: BTreeSet<char>,
    start_state: StateId,
    transitions: BTreeMap<(StateId, char), StateId>,
    accept_states: BTreeSet<StateId>,
}

impl DFA {
    /// 从NFA构造DFA（子集构造法）。
    ///
    /// 1. 先求出NFA每个状态的空闭包。
    /// 2. DFA的开始状态是NFA开始状态的空闭包，这个NFA状态集合整体作为一个“超状态”。
    /// 3. 对每个新发现的超状态和每个字符，后继超状态是所有成员在这个字符上的后继的空闭包的并集。
    ///    新的超状态压入工作栈。
    /// 4. 超状态包含NFA的接收状态时，它就是接收状态。超状态本身是空闭包，所以直接判断交集即可。
    /// 5. 最后把超状态按发现的顺序映射为稠密编号。
    pub fn build_dfa_from_nfa(nfa: &NFA) -> Self {
        let closures: BTreeMap<StateId, BTreeSet<StateId>> = nfa
            .states()
            .iter()
            .map(|state| (*state, nfa.epsilon_closure(*state)))
            .collect();

        let closure_of = |state: StateId| -> BTreeSet<StateId> {
            closures
                .get(&state)
                .cloned()
                .unwrap_or_else(|| nfa.epsilon_closure(state))
        };

        let start = closure_of(nfa.start_state);
        let mut id_map: BTreeMap<BTreeSet<StateId>, StateId> = BTreeMap::new();
        let mut order = vec![start.clone()];
        id_map.insert(start.clone(), 0);

        let mut transitions = BTreeMap::new();
        let mut stack = vec![start];

        while let Some(subset) = stack.pop() {
            let from = id_map[&subset];
            for &input in nfa.alphabet() {
                let mut next = BTreeSet::new();
                for state in &subset {
                    for to in nfa.delta(*state, Symbol::Char(input)) {
                        next.extend(closure_of(to));
                    }
                }

                let to = match id_map.get(&next) {
                    Some(id) => *id,
                    None => {
                        let id = order.len() as StateId;
                        id_map.insert(next.clone(), id);
                        order.push(next.clone());
                        stack.push(next);
                        id
                    }
                };
                transitions.insert((from, input), to);
            }
        }

        let accept_states = order
            .iter()
            .enumerate()
            .filter(|(_, subset)| !subset.is_disjoint(&nfa.accept_states))
            .map(|(id, _)| id as StateId)
            .collect();

        let dfa = DFA {
            states: (0..order.len() as StateId).collect(),
            alphabet: nfa.alphabet().clone(),
            start_state: 0,
            transitions,
            accept_states,
        };
        debug!(
            "subset construction: {} NFA states -> {} DFA states",
            nfa.states().len(),
            dfa.number_of_states()
        );
        dfa
    }

    /// 翻转接收状态。只有在DFA完全时才等于补语言，子集构造法得到的DFA总是完全的。
    pub fn complement(&self) -> Self {
        DFA {
            accept_states: self
                .states
                .difference(&self.accept_states)
                .copied()
                .collect(),
            ..self.clone()
        }
    }

    pub fn transitions(&self) -> &BTreeMap<(StateId, char), StateId> {
        &self.transitions
    }

    /// 从开始状态做广度优先搜索，返回最短的被接受的串，没有时返回`None`。
    ///
    /// 等长的串之间按字母表顺序和发现顺序决定返回哪一个。
    pub fn find_match(&self) -> Option<String> {
        let mut prefixes: BTreeMap<StateId, String> = BTreeMap::new();
        let mut queue = VecDeque::new();
        prefixes.insert(self.start_state, String::new());
        queue.push_back(self.start_state);

        while let Some(state) = queue.pop_front() {
            let prefix = prefixes[&state].clone();
            if self.accept_states.contains(&state) {
                return Some(prefix);
            }
            for &input in &self.alphabet {
                let Some(next) = self.delta(state, input) else {
                    continue;
                };
                if prefixes.contains_key(&next) {
                    continue;
                }
                let mut word = prefix.clone();
                word.push(input);
                prefixes.insert(next, word);
                queue.push_back(next);
            }
        }
        None
    }

    /// 判断DFA是否接受`test`。含有字母表以外字符的串直接拒绝。
    pub fn accepts(&self, test: &str) -> bool {
        if !test.chars().all(|c| self.alphabet.contains(&c)) {
            return false;
        }

        let mut current = self.start_state;
        for input in test.chars() {
            match self.delta(current, input) {
                Some(next) => current = next,
                None => return false,
            }
        }
        self.accept_states.contains(&current)
    }
}

impl CompletedDfa for DFA {
    fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    fn start_state(&self) -> StateId {
        self.start_state
    }

    fn accept_states(&self) -> &BTreeSet<StateId> {
        &self.accept_states
    }

    fn states(&self) -> &BTreeSet<StateId> {
        &self.states
    }

    fn delta(&self, from: StateId, input: char) -> Option<StateId> {
        self.transitions.get(&(from, input)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa::{Builder, Transitions};

    fn ab() -> BTreeSet<char> {
        BTreeSet::from(['a', 'b'])
    }

    fn dfa(re: &str) -> DFA {
        let nfa = Builder::new().build_nfa_from_re(&ab(), re).unwrap();
        DFA::build_dfa_from_nfa(&nfa)
    }

    #[test_log::test]
    fn subset_construction_is_total() {
        let dfa = dfa("ab");
        for state in dfa.states() {
            for input in dfa.alphabet() {
                assert!(dfa.delta(*state, *input).is_some());
            }
        }
        assert!(dfa.accepts("ab"));
        assert!(!dfa.accepts("abb"));
        assert!(!dfa.accepts("b"));
    }

    #[test_log::test]
    fn epsilon_successor_does_not_inherit_acceptance() {
        // 0 -a-> 1 (接收)，0 -b-> 2，1 -ε-> 2。读入"b"后只到达2，不应该被接受。
        let mut transitions = Transitions::default();
        transitions.entry((0, Symbol::Char('a'))).insert(1);
        transitions.entry((0, Symbol::Char('b'))).insert(2);
        transitions.entry((1, Symbol::Epsilon)).insert(2);
        let nfa = NFA::new(
            BTreeSet::from([0, 1, 2]),
            ab(),
            0,
            transitions,
            BTreeSet::from([1]),
        );
        let dfa = DFA::build_dfa_from_nfa(&nfa);
        assert!(dfa.accepts("a"));
        assert!(!dfa.accepts("b"));
    }

    #[test_log::test]
    fn find_match_returns_a_shortest_accepted_string() {
        assert_eq!(dfa("aab|ba").find_match().as_deref(), Some("ba"));
        assert_eq!(dfa("a*").find_match().as_deref(), Some(""));

        let found = dfa("(a|b)(a|b)b*").find_match().unwrap();
        assert_eq!(found.len(), 2);
        assert!(dfa("(a|b)(a|b)b*").accepts(&found));
    }

    #[test_log::test]
    fn find_match_on_empty_language() {
        let mut builder = Builder::new();
        let null = builder.null(&ab());
        assert_eq!(DFA::build_dfa_from_nfa(&null).find_match(), None);
    }

    #[test_log::test]
    fn accepts_rejects_foreign_symbols() {
        let dfa = dfa("(a|b)*");
        assert!(dfa.accepts("abba"));
        assert!(!dfa.accepts("abc"));
    }

    #[test_log::test]
    fn complement_of_complement() {
        let d = dfa("a(ba)*");
        let back = d.complement().complement();
        for word in ["", "a", "ab", "aba", "ababa", "b"] {
            assert_eq!(d.accepts(word), back.accepts(word));
            assert_ne!(d.accepts(word), d.complement().accepts(word));
        }
    }
}
