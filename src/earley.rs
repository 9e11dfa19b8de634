use std::collections::{BTreeMap, BTreeSet, VecDeque};

use indexmap::IndexSet;

use crate::cfg::CFG;
use crate::symbol::EPSILON_STR;

/// Earley识别器。
pub mod recognizer;

/// 按长度枚举语言中的串。
pub mod generator;

pub use generator::{Generator, Strings};
pub use recognizer::Recognizer;

/// 增广开始变元的名字。
const AUGMENTED_START: &str = "S`";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Sym {
    Terminal(usize),
    Variable(usize),
}

/// Earley项目：第`rule`条规则，已经匹配到`dot`，从第`origin`列开始。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Item {
    rule: usize,
    dot: usize,
    origin: usize,
}

impl Item {
    fn advance(self) -> Item {
        Item {
            dot: self.dot + 1,
            ..self
        }
    }
}

/// 一列项目。
type Column = BTreeSet<Item>;

/// 为Earley算法编号过的文法。
///
/// 终结符和变元都换成下标，空规则的右部是空序列。
/// 第0个变元是增广开始变元，它唯一的规则指向原来的开始变元。
#[derive(Debug, Clone)]
struct Chart {
    terminals: IndexSet<String>,
    rules: Vec<(usize, Vec<Sym>)>,
    by_variable: Vec<Vec<usize>>,
    nullable: Vec<bool>,
    start_rule: usize,
}

impl Chart {
    fn new(cfg: &CFG) -> Self {
        let grammar = cfg.augment_start(AUGMENTED_START);
        let terminals: IndexSet<String> = grammar.terminals().iter().cloned().collect();
        let variables = grammar.variables();
        let nullable = grammar.nullable();

        let mut rules = Vec::new();
        let mut by_variable = vec![Vec::new(); variables.len()];
        for (lhs, variable) in variables.iter().enumerate() {
            for rule in grammar.rules(variable) {
                let body = rule
                    .iter()
                    .filter(|sym| *sym != EPSILON_STR)
                    .filter_map(|sym| match terminals.get_index_of(sym) {
                        Some(t) => Some(Sym::Terminal(t)),
                        None => variables.get_index_of(sym).map(Sym::Variable),
                    })
                    .collect();
                by_variable[lhs].push(rules.len());
                rules.push((lhs, body));
            }
        }

        let start_rule = by_variable[0].first().copied().unwrap_or_default();
        Chart {
            terminals,
            rules,
            by_variable,
            nullable: variables.iter().map(|v| nullable.contains(v)).collect(),
            start_rule,
        }
    }

    fn terminal(&self, token: &str) -> Option<usize> {
        self.terminals.get_index_of(token)
    }

    fn start_item(&self) -> Item {
        Item {
            rule: self.start_rule,
            dot: 0,
            origin: 0,
        }
    }

    /// 整个输入被增广开始变元匹配完的项目。
    fn stop_item(&self) -> Item {
        self.start_item().advance()
    }

    fn next_symbol(&self, item: &Item) -> Option<Sym> {
        self.rules[item.rule].1.get(item.dot).copied()
    }

    /// 对最后一列反复应用预测和完成直到不动点，返回可以扫描的终结符，
    /// 以及扫描它之后得到的下一列。
    ///
    /// 预测一个可空变元时直接把当前项目前移一格，这样同一列里晚加入的项目也能被完成。
    fn expand(&self, columns: &mut [Column]) -> BTreeMap<usize, Column> {
        let current = columns.len() - 1;
        let mut scans: BTreeMap<usize, Column> = BTreeMap::new();
        let mut queue: VecDeque<Item> = columns[current].iter().copied().collect();

        while let Some(item) = queue.pop_front() {
            let added: Vec<Item> = match self.next_symbol(&item) {
                Some(Sym::Terminal(t)) => {
                    scans.entry(t).or_default().insert(item.advance());
                    continue;
                }
                Some(Sym::Variable(v)) => {
                    let predicted = self.by_variable[v].iter().map(|&rule| Item {
                        rule,
                        dot: 0,
                        origin: current,
                    });
                    let skipped = self.nullable[v].then(|| item.advance());
                    predicted.chain(skipped).collect()
                }
                None => {
                    let lhs = Sym::Variable(self.rules[item.rule].0);
                    columns[item.origin]
                        .iter()
                        .filter(|waiting| self.next_symbol(waiting) == Some(lhs))
                        .map(|waiting| waiting.advance())
                        .collect()
                }
            };
            for new in added {
                if columns[current].insert(new) {
                    queue.push_back(new);
                }
            }
        }
        scans
    }
}
