use std::collections::BTreeSet;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::collections::DefaultMap;
use crate::dfa::{CompletedDfa, DFA};
use crate::error::Result;
use crate::regex::{self, Expr};
use crate::state::{StateAllocator, StateId};
use crate::symbol::Symbol;

pub type Transitions = DefaultMap<(StateId, Symbol), BTreeSet<StateId>>;

/// 带空转移的NFA。
///
/// 五元组 (Q, A, S, D, F)。D 把 (状态, 字符或空转移) 映射到目标状态集合。
/// NFA对调用者来说是不可变的值，所有运算都返回新的NFA。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NFA {
    states: BTreeSet<StateId>,
    alphabet: BTreeSet<char>,
    pub start_state: StateId,
    transitions: Transitions,
    pub accept_states: BTreeSet<StateId>,
}

/// NFA内的状态和转移的查询
impl NFA {
    /// 直接用五元组构造NFA。
    ///
    /// 不检查五元组是否合法，调用者需要保证 D 和 F 里出现的状态都在 Q 中，且 S 在 Q 中。
    pub fn new(
        states: BTreeSet<StateId>,
        alphabet: BTreeSet<char>,
        start_state: StateId,
        transitions: Transitions,
        accept_states: BTreeSet<StateId>,
    ) -> NFA {
        NFA {
            states,
            alphabet,
            start_state,
            transitions,
            accept_states,
        }
    }

    pub fn states(&self) -> &BTreeSet<StateId> {
        &self.states
    }

    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    pub fn transitions(&self) -> &Transitions {
        &self.transitions
    }

    /// δ(from, input)，没有转移时返回空集。
    pub fn delta(&self, from: StateId, input: Symbol) -> impl Iterator<Item = StateId> + '_ {
        self.transitions
            .get(&(from, input))
            .into_iter()
            .flat_map(|targets| targets.iter().copied())
    }

    /// 状态的空闭包：只走空转移能到达的所有状态，包括它自己。
    ///
    /// 用栈做深度优先搜索，已经访问过的状态直接跳过。
    pub fn epsilon_closure(&self, state: StateId) -> BTreeSet<StateId> {
        let mut closure = BTreeSet::new();
        let mut stack = vec![state];
        while let Some(state) = stack.pop() {
            if !closure.insert(state) {
                continue;
            }
            for to in self.delta(state, Symbol::Epsilon) {
                if !closure.contains(&to) {
                    stack.push(to);
                }
            }
        }
        closure
    }

    fn max_state(&self) -> Option<StateId> {
        self.states.iter().next_back().copied()
    }
}

/// NFA的构造器，持有状态编号分配器。
///
/// 所有的构造和运算都经过同一个构造器，保证组合出来的NFA之间状态编号不冲突。
/// 传入的NFA如果不是这个构造器造出来的（比如调用者自己给出的五元组），
/// 构造器会先把分配器推进到它的最大编号之后。
#[derive(Debug, Default)]
pub struct Builder {
    ids: StateAllocator,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    fn observe(&mut self, nfa: &NFA) {
        if let Some(max) = nfa.max_state() {
            self.ids.reserve_past(max);
        }
    }

    /// 空语言：一个状态，没有接收状态。
    pub fn null(&mut self, alphabet: &BTreeSet<char>) -> NFA {
        let start = self.ids.fresh();
        NFA::new(
            BTreeSet::from([start]),
            alphabet.clone(),
            start,
            Transitions::default(),
            BTreeSet::new(),
        )
    }

    /// 只含空串的语言：一个既是开始又是接收的状态。
    pub fn empty(&mut self, alphabet: &BTreeSet<char>) -> NFA {
        let start = self.ids.fresh();
        NFA::new(
            BTreeSet::from([start]),
            alphabet.clone(),
            start,
            Transitions::default(),
            BTreeSet::from([start]),
        )
    }

    /// 两个状态，一条标着`symbol`的转移。
    pub fn literal(&mut self, alphabet: &BTreeSet<char>, symbol: Symbol) -> NFA {
        let start = self.ids.fresh();
        let end = self.ids.fresh();
        let mut transitions = Transitions::default();
        transitions.entry((start, symbol)).insert(end);
        NFA::new(
            BTreeSet::from([start, end]),
            alphabet.clone(),
            start,
            transitions,
            BTreeSet::from([end]),
        )
    }

    /// 新的开始状态，用空转移连到两个子NFA的开始状态。
    pub fn union(&mut self, n1: NFA, n2: NFA) -> NFA {
        let (n1, n2) = self.disjoint(n1, n2);
        let start = self.ids.fresh();

        let mut nfa = merge(n1, n2);
        nfa.transitions
            .entry((start, Symbol::Epsilon))
            .extend([nfa.start_state, nfa.second_start]);
        nfa.states.insert(start);
        nfa.into_nfa(start)
    }

    /// 把`n1`的每个接收状态用空转移连到`n2`的开始状态。
    pub fn concatenate(&mut self, n1: NFA, n2: NFA) -> NFA {
        let (n1, n2) = self.disjoint(n1, n2);
        let first_accepts = n1.accept_states.clone();
        let start = n1.start_state;

        let mut nfa = merge(n1, n2);
        let target = nfa.second_start;
        for accept in first_accepts {
            nfa.transitions.entry((accept, Symbol::Epsilon)).insert(target);
        }
        nfa.accept_states = std::mem::take(&mut nfa.second_accepts);
        nfa.into_nfa(start)
    }

    /// 保证两个NFA的状态不相交，相交时给第二个换上新编号。
    fn disjoint(&mut self, n1: NFA, n2: NFA) -> (NFA, NFA) {
        self.observe(&n1);
        self.observe(&n2);
        if n1.states.is_disjoint(&n2.states) {
            (n1, n2)
        } else {
            let n2 = self.relabel(&n2);
            (n1, n2)
        }
    }

    /// 给NFA的所有状态换上新编号。
    pub fn relabel(&mut self, n: &NFA) -> NFA {
        self.observe(n);
        let id_map: std::collections::BTreeMap<StateId, StateId> =
            n.states.iter().map(|s| (*s, self.ids.fresh())).collect();

        let mut transitions = Transitions::default();
        for ((from, input), targets) in n.transitions.iter() {
            transitions
                .entry((id_map[from], *input))
                .extend(targets.iter().map(|to| id_map[to]));
        }
        NFA::new(
            id_map.values().copied().collect(),
            n.alphabet.clone(),
            id_map[&n.start_state],
            transitions,
            n.accept_states.iter().map(|s| id_map[s]).collect(),
        )
    }

    /// 克林闭包。新的开始状态本身也是接收状态。
    pub fn star(&mut self, mut n: NFA) -> NFA {
        self.observe(&n);
        let start = self.ids.fresh();
        let inner = n.start_state;

        n.transitions.entry((start, Symbol::Epsilon)).insert(inner);
        for accept in n.accept_states.clone() {
            n.transitions.entry((accept, Symbol::Epsilon)).insert(inner);
        }
        n.states.insert(start);
        n.accept_states.insert(start);
        n.start_state = start;
        n
    }

    /// 用新编号把DFA重新表示成NFA。
    pub fn from_dfa(&mut self, dfa: &DFA) -> NFA {
        let mut id_map = std::collections::BTreeMap::new();
        for state in dfa.states() {
            id_map.insert(*state, self.ids.fresh());
        }

        let mut transitions = Transitions::default();
        for (&(from, input), &to) in dfa.transitions() {
            transitions
                .entry((id_map[&from], Symbol::Char(input)))
                .insert(id_map[&to]);
        }

        NFA::new(
            id_map.values().copied().collect(),
            dfa.alphabet().clone(),
            id_map[&dfa.start_state()],
            transitions,
            dfa.accept_states().iter().map(|s| id_map[s]).collect(),
        )
    }

    /// 补集：先转换为完全的DFA，再翻转接收状态。
    pub fn complement(&mut self, n: &NFA) -> NFA {
        self.observe(n);
        let dfa = DFA::build_dfa_from_nfa(n).complement();
        self.from_dfa(&dfa)
    }

    /// 交集 = ¬(¬n1 ∪ ¬n2)
    pub fn intersection(&mut self, n1: &NFA, n2: &NFA) -> NFA {
        self.observe(n2);
        let c1 = self.complement(n1);
        let c2 = self.complement(n2);
        let union = self.union(c1, c2);
        self.complement(&union)
    }

    /// 差集 = ¬(¬n1 ∪ n2)
    pub fn difference(&mut self, n1: &NFA, n2: &NFA) -> NFA {
        self.observe(n2);
        let c1 = self.complement(n1);
        let union = self.union(c1, n2.clone());
        self.complement(&union)
    }

    /// 对称差 = (n1 - n2) ∪ (n2 - n1)
    pub fn symmetric_difference(&mut self, n1: &NFA, n2: &NFA) -> NFA {
        let d1 = self.difference(n1, n2);
        let d2 = self.difference(n2, n1);
        self.union(d1, d2)
    }

    /// 反转：先确定化，再把所有转移反向，
    /// 新的开始状态用空转移连到原来的所有接收状态，原来的开始状态成为唯一的接收状态。
    pub fn reverse(&mut self, n: &NFA) -> NFA {
        self.observe(n);
        let dfa = DFA::build_dfa_from_nfa(n);
        let m = self.from_dfa(&dfa);

        let mut transitions = Transitions::default();
        for ((from, input), targets) in m.transitions.iter() {
            for to in targets {
                transitions.entry((*to, *input)).insert(*from);
            }
        }

        let start = self.ids.fresh();
        transitions
            .entry((start, Symbol::Epsilon))
            .extend(m.accept_states.iter().copied());

        let mut states = m.states.clone();
        states.insert(start);
        NFA::new(
            states,
            m.alphabet.clone(),
            start,
            transitions,
            BTreeSet::from([m.start_state]),
        )
    }

    /// 从正则表达式构造NFA（Thompson构造法）。
    ///
    /// 空的记号流得到只接受空串的NFA；否则先解析成语法树，再沿着语法树自底向上组合。
    pub fn build_nfa_from_re(&mut self, alphabet: &BTreeSet<char>, re: &str) -> Result<NFA> {
        let nfa = match regex::parse(re)? {
            None => self.empty(alphabet),
            Some(expr) => self.build_from_expr(alphabet, &expr),
        };
        debug!(
            "built NFA with {} states from {:?}",
            nfa.states.len(),
            re
        );
        Ok(nfa)
    }

    pub fn build_from_expr(&mut self, alphabet: &BTreeSet<char>, expr: &Expr) -> NFA {
        match expr {
            Expr::Literal(sym) => self.literal(alphabet, *sym),
            Expr::Concat(left, right) => {
                let left = self.build_from_expr(alphabet, left);
                let right = self.build_from_expr(alphabet, right);
                self.concatenate(left, right)
            }
            Expr::Union(left, right) => {
                let left = self.build_from_expr(alphabet, left);
                let right = self.build_from_expr(alphabet, right);
                self.union(left, right)
            }
            Expr::Option(inner) => {
                let inner = self.build_from_expr(alphabet, inner);
                let epsilon = self.literal(alphabet, Symbol::Epsilon);
                self.union(inner, epsilon)
            }
            Expr::Star(inner) => {
                let inner = self.build_from_expr(alphabet, inner);
                self.star(inner)
            }
            Expr::Plus(inner) => {
                let once = self.build_from_expr(alphabet, inner);
                let again = self.build_from_expr(alphabet, inner);
                let more = self.star(again);
                self.concatenate(once, more)
            }
            Expr::Group(inner) => self.build_from_expr(alphabet, inner),
        }
    }
}

/// 合并两个NFA时的中间结果，记住第二个NFA的开始和接收状态。
struct Merged {
    states: BTreeSet<StateId>,
    alphabet: BTreeSet<char>,
    start_state: StateId,
    second_start: StateId,
    transitions: Transitions,
    accept_states: BTreeSet<StateId>,
    second_accepts: BTreeSet<StateId>,
}

impl Merged {
    fn into_nfa(self, start: StateId) -> NFA {
        NFA::new(
            self.states,
            self.alphabet,
            start,
            self.transitions,
            self.accept_states,
        )
    }
}

/// 把两个状态不相交的NFA放在一起，状态、字母表、转移、接收状态都取并集。
fn merge(n1: NFA, n2: NFA) -> Merged {
    let mut transitions = n1.transitions;
    for (key, targets) in n2.transitions {
        transitions.entry(key).extend(targets);
    }
    trace!(
        "merging NFAs rooted at {} and {}",
        n1.start_state,
        n2.start_state
    );
    Merged {
        states: n1.states.into_iter().chain(n2.states).collect(),
        alphabet: n1.alphabet.into_iter().chain(n2.alphabet).collect(),
        start_state: n1.start_state,
        second_start: n2.start_state,
        transitions,
        accept_states: n1
            .accept_states
            .iter()
            .chain(n2.accept_states.iter())
            .copied()
            .collect(),
        second_accepts: n2.accept_states,
    }
}

impl std::fmt::Display for NFA {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "start: {}", self.start_state)?;
        writeln!(f, "accept: {}", self.accept_states.iter().join(","))?;
        for ((from, input), targets) in self.transitions.iter() {
            for to in targets {
                writeln!(f, "{} {} {}", from, to, input)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab() -> BTreeSet<char> {
        BTreeSet::from(['a', 'b'])
    }

    fn accepts(nfa: &NFA, word: &str) -> bool {
        DFA::build_dfa_from_nfa(nfa).accepts(word)
    }

    #[test_log::test]
    fn literal_has_two_states() {
        let mut builder = Builder::new();
        let nfa = builder.literal(&ab(), Symbol::Char('a'));
        assert_eq!(nfa.states().len(), 2);
        assert!(accepts(&nfa, "a"));
        assert!(!accepts(&nfa, "b"));
        assert!(!accepts(&nfa, ""));
    }

    #[test_log::test]
    fn composed_automata_never_share_states() {
        let mut builder = Builder::new();
        let a = builder.literal(&ab(), Symbol::Char('a'));
        let b = builder.literal(&ab(), Symbol::Char('b'));
        assert!(a.states().is_disjoint(b.states()));

        let union = builder.union(a, b);
        assert_eq!(union.states().len(), 5);
    }

    #[test_log::test]
    fn epsilon_closure_follows_chains() {
        let mut builder = Builder::new();
        let nfa = builder.build_nfa_from_re(&ab(), "a*").unwrap();
        let closure = nfa.epsilon_closure(nfa.start_state);
        assert!(closure.contains(&nfa.start_state));
        assert!(closure.len() >= 2);
    }

    #[test_log::test]
    fn regex_operators() {
        let mut builder = Builder::new();
        let nfa = builder.build_nfa_from_re(&ab(), "a(b|a)*b?").unwrap();
        for word in ["a", "ab", "aab", "abab", "abbb"] {
            assert!(accepts(&nfa, word), "{}", word);
        }
        for word in ["", "b", "ba", "bab"] {
            assert!(!accepts(&nfa, word), "{}", word);
        }

        let plus = builder.build_nfa_from_re(&ab(), "(ab)+").unwrap();
        assert!(!accepts(&plus, ""));
        assert!(accepts(&plus, "ab"));
        assert!(accepts(&plus, "abab"));
        assert!(!accepts(&plus, "aba"));
    }

    #[test_log::test]
    fn empty_regex_accepts_only_empty_string() {
        let mut builder = Builder::new();
        let nfa = builder.build_nfa_from_re(&ab(), "").unwrap();
        assert!(accepts(&nfa, ""));
        assert!(!accepts(&nfa, "a"));

        let epsilon = builder.build_nfa_from_re(&ab(), "ε").unwrap();
        assert!(accepts(&epsilon, ""));
        assert!(!accepts(&epsilon, "b"));
    }

    #[test_log::test]
    fn complement_flips_membership() {
        let mut builder = Builder::new();
        let nfa = builder.build_nfa_from_re(&ab(), "ab*").unwrap();
        let complement = builder.complement(&nfa);
        for word in ["", "a", "ab", "abb", "b", "ba", "aba"] {
            assert_ne!(accepts(&nfa, word), accepts(&complement, word), "{}", word);
        }
    }

    #[test_log::test]
    fn intersection_and_difference() {
        let mut builder = Builder::new();
        let n1 = builder.build_nfa_from_re(&ab(), "a(a|b)*").unwrap();
        let n2 = builder.build_nfa_from_re(&ab(), "(a|b)*b").unwrap();

        let both = builder.intersection(&n1, &n2);
        assert!(accepts(&both, "ab"));
        assert!(accepts(&both, "aab"));
        assert!(!accepts(&both, "a"));
        assert!(!accepts(&both, "b"));

        let only_first = builder.difference(&n1, &n2);
        assert!(accepts(&only_first, "a"));
        assert!(accepts(&only_first, "aba"));
        assert!(!accepts(&only_first, "ab"));

        let nothing = builder.difference(&n1, &n1);
        assert_eq!(DFA::build_dfa_from_nfa(&nothing).find_match(), None);
    }

    #[test_log::test]
    fn reverse_reads_backwards() {
        let mut builder = Builder::new();
        let nfa = builder.build_nfa_from_re(&ab(), "aab*").unwrap();
        let reversed = builder.reverse(&nfa);
        assert!(accepts(&reversed, "aa"));
        assert!(accepts(&reversed, "bbaa"));
        assert!(!accepts(&reversed, "aab"));
    }

    #[test_log::test]
    fn caller_built_automata_do_not_collide_with_fresh_states() {
        let mut transitions = Transitions::default();
        transitions.entry((0, Symbol::Char('a'))).insert(1);
        let given = NFA::new(
            BTreeSet::from([0, 1]),
            ab(),
            0,
            transitions,
            BTreeSet::from([1]),
        );

        let mut builder = Builder::new();
        let complement = builder.complement(&given);
        assert!(complement.states().is_disjoint(given.states()));

        let everything = builder.union(given, complement);
        for word in ["", "a", "b", "ab"] {
            assert!(accepts(&everything, word), "{}", word);
        }
    }
}
