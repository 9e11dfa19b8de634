use std::collections::BTreeSet;
use std::fmt;

use itertools::iproduct;
use tracing::debug;

use crate::cfg::CFG;
use crate::collections::DefaultMap;
use crate::error::{Error, Result};
use crate::state::{StateAllocator, StateId};
use crate::symbol::EPSILON_STR;

/// 栈符号。`Floor`和`Scratch`是转换为文法时加入的两个保留符号。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StackSymbol {
    /// 栈底，新的开始状态最先压入它。
    Floor,
    /// 临时符号，压入后马上弹出，把既不弹也不压的转移拆成一压一弹。
    Scratch,
    Named(String),
}

impl fmt::Display for StackSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackSymbol::Floor => write!(f, "⊤"),
            StackSymbol::Scratch => write!(f, "⊥"),
            StackSymbol::Named(name) => write!(f, "{}", name),
        }
    }
}

/// `(状态, 读入符号, 弹出符号)`，`None`表示ε。
pub type TransitionKey = (StateId, Option<String>, Option<StackSymbol>);

/// `(下一个状态, 压入符号)`，`None`表示ε。
pub type TransitionTarget = (StateId, Option<StackSymbol>);

pub type Transitions = DefaultMap<TransitionKey, BTreeSet<TransitionTarget>>;

/// 下推自动机。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PDA {
    states: BTreeSet<StateId>,
    input_alphabet: BTreeSet<String>,
    stack_alphabet: BTreeSet<String>,
    pub start_state: StateId,
    transitions: Transitions,
    pub accept_states: BTreeSet<StateId>,
}

impl PDA {
    pub fn new(start_state: StateId) -> Self {
        PDA {
            states: BTreeSet::from([start_state]),
            input_alphabet: BTreeSet::new(),
            stack_alphabet: BTreeSet::new(),
            start_state,
            transitions: Transitions::default(),
            accept_states: BTreeSet::new(),
        }
    }

    /// 加入一条转移，顺便收集状态、输入字母表和栈字母表。
    pub fn add_transition(
        &mut self,
        from: StateId,
        read: Option<String>,
        pop: Option<StackSymbol>,
        to: StateId,
        push: Option<StackSymbol>,
    ) {
        self.states.insert(from);
        self.states.insert(to);
        if let Some(sym) = &read {
            self.input_alphabet.insert(sym.clone());
        }
        for sym in [&pop, &push].into_iter().flatten() {
            if let StackSymbol::Named(name) = sym {
                self.stack_alphabet.insert(name.clone());
            }
        }
        self.transitions.entry((from, read, pop)).insert((to, push));
    }

    pub fn add_accept_state(&mut self, state: StateId) {
        self.states.insert(state);
        self.accept_states.insert(state);
    }

    pub fn states(&self) -> &BTreeSet<StateId> {
        &self.states
    }

    pub fn input_alphabet(&self) -> &BTreeSet<String> {
        &self.input_alphabet
    }

    pub fn stack_alphabet(&self) -> &BTreeSet<String> {
        &self.stack_alphabet
    }

    pub fn transitions(&self) -> &Transitions {
        &self.transitions
    }

    /// 转换为规范形式：
    /// - 只有一个接收状态，并且只在栈空时进入它；
    /// - 每条转移要么只压入一个符号，要么只弹出一个符号。
    ///
    /// 新的开始状态先压入`⊤`；又弹又压的转移经过一个中间状态拆成先弹后压；
    /// 既不弹也不压的转移拆成压入`⊥`再弹出`⊥`。
    /// 原来的每个接收状态压入`⊥`进入`SS`，`SS`弹出`⊥`进入`SP`，
    /// `SP`弹出栈里剩下的所有符号，最后弹出`⊤`进入唯一的接收状态。
    pub fn canonical(&self, ids: &mut StateAllocator) -> PDA {
        if let Some(max) = self.states.iter().next_back() {
            ids.reserve_past(*max);
        }

        let start = ids.fresh();
        let mut pda = PDA::new(start);
        pda.input_alphabet = self.input_alphabet.clone();
        pda.stack_alphabet = self.stack_alphabet.clone();
        pda.states.extend(self.states.iter().copied());
        pda.add_transition(start, None, None, self.start_state, Some(StackSymbol::Floor));

        for ((from, read, pop), targets) in self.transitions.iter() {
            for (to, push) in targets {
                match (pop, push) {
                    (Some(_), Some(_)) => {
                        let mid = ids.fresh();
                        pda.add_transition(*from, read.clone(), pop.clone(), mid, None);
                        pda.add_transition(mid, None, None, *to, push.clone());
                    }
                    (None, None) => {
                        let mid = ids.fresh();
                        pda.add_transition(*from, read.clone(), None, mid, Some(StackSymbol::Scratch));
                        pda.add_transition(mid, None, Some(StackSymbol::Scratch), *to, None);
                    }
                    _ => pda.add_transition(*from, read.clone(), pop.clone(), *to, push.clone()),
                }
            }
        }

        let pop_all = ids.fresh();
        let scratch = ids.fresh();
        for state in &self.accept_states {
            pda.add_transition(*state, None, None, scratch, Some(StackSymbol::Scratch));
        }
        pda.add_transition(scratch, None, Some(StackSymbol::Scratch), pop_all, None);
        for name in &self.stack_alphabet {
            pda.add_transition(
                pop_all,
                None,
                Some(StackSymbol::Named(name.clone())),
                pop_all,
                None,
            );
        }

        let accept = ids.fresh();
        pda.add_transition(pop_all, None, Some(StackSymbol::Floor), accept, None);
        pda.add_accept_state(accept);
        pda
    }

    /// 用三元组构造把PDA转换为文法。
    ///
    /// 变元`A(p,q)`推导出从`p`出发、栈不变地到达`q`时读过的所有串。
    /// 压入`u`的转移`p -a-> r`和弹出`u`的转移`s -b-> q`配对，得到`A(p,q) -> a A(r,s) b`；
    /// 每三个状态得到`A(p,q) -> A(p,r) A(r,q)`；每个状态得到`A(p,p) -> ε`。
    ///
    /// 这样得到的文法有大量无用变元，最后化简并重命名。
    pub fn to_cfg(&self) -> Result<CFG> {
        let canonical = self.canonical(&mut StateAllocator::new());
        let accept = match canonical.accept_states.iter().collect::<Vec<_>>().as_slice() {
            [accept] => **accept,
            _ => return Err(Error::Internal("canonical PDA must have one accept state".into())),
        };

        let mut peekers: DefaultMap<(StateId, StackSymbol), BTreeSet<(StateId, Option<String>)>> =
            DefaultMap::default();
        let mut poppers: DefaultMap<StateId, BTreeSet<(Option<String>, StackSymbol, StateId)>> =
            DefaultMap::default();

        for ((from, read, pop), targets) in canonical.transitions.iter() {
            for (to, push) in targets {
                match (pop, push) {
                    (None, Some(u)) => {
                        peekers.entry((*to, u.clone())).insert((*from, read.clone()));
                    }
                    (Some(u), None) => {
                        poppers.entry(*from).insert((read.clone(), u.clone(), *to));
                    }
                    _ => {
                        return Err(Error::Internal(format!(
                            "transition {} -> {} is neither a push nor a pop",
                            from, to
                        )))
                    }
                }
            }
        }

        let variable = |p: StateId, q: StateId| format!("A{}_{}", p, q);
        let mut grammar = CFG::new(
            canonical.input_alphabet.clone(),
            variable(canonical.start_state, accept),
        );

        for ((r, u), pushes) in peekers.iter() {
            for (s, pops) in poppers.iter() {
                for (b, _, q) in pops.iter().filter(|(_, v, _)| v == u) {
                    for (p, a) in pushes {
                        let rule = a
                            .iter()
                            .cloned()
                            .chain(std::iter::once(variable(*r, *s)))
                            .chain(b.iter().cloned())
                            .collect();
                        grammar.add_rule(&variable(*p, *q), rule);
                    }
                }
            }
        }

        let states = &canonical.states;
        for (p, q, r) in iproduct!(states, states, states) {
            grammar.add_rule(&variable(*p, *q), vec![variable(*p, *r), variable(*r, *q)]);
        }
        for p in states {
            grammar.add_rule(&variable(*p, *p), vec![EPSILON_STR.to_string()]);
        }
        debug!(
            "triple construction: {} states, {} rules",
            states.len(),
            grammar.rule_count()
        );

        let simplified = grammar
            .simplify_aggressive()
            .collapse_trivial_star()
            .eliminate_non_self_recursive_variables()
            .simplify_passive()
            .rename();
        debug!("PDA grammar simplified to {} rules", simplified.rule_count());
        Ok(simplified)
    }
}

impl CFG {
    pub fn from_pda(pda: &PDA) -> Result<CFG> {
        pda.to_cfg()
    }
}
