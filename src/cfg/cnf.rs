use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use tracing::debug;

use super::{is_epsilon_rule, Rule, CFG};

impl CFG {
    /// 转换为乔姆斯基范式。
    ///
    /// 先化简，再加入新的开始变元`S0`，消去空规则和单元规则。
    /// 然后把多符号规则里的终结符换成只推导这个终结符的变元，
    /// 最后把长度超过2的规则拆成一串两个符号的规则。
    ///
    /// 结果的每条规则要么是两个变元，要么是一个终结符；
    /// 语言含空串时，开始变元还有一条空规则。
    pub fn to_cnf(&self) -> CFG {
        let grammar = self
            .simplify_passive()
            .augment_start("S0")
            .eliminate_epsilon_rules()
            .eliminate_unit_rules()
            .simplify_passive();
        let cnf = grammar.isolate_terminals().binarize().simplify_passive();
        debug!(
            "CNF: {} variables, {} rules",
            cnf.variables.len(),
            cnf.rule_count()
        );
        cnf
    }

    /// 是否满足乔姆斯基范式。
    pub fn is_cnf(&self) -> bool {
        self.productions.iter().all(|(variable, rules)| {
            rules.iter().all(|rule| match rule.as_slice() {
                [sym] => {
                    self.is_terminal(sym) || (is_epsilon_rule(rule) && *variable == self.start)
                }
                [a, b] => {
                    self.is_variable(a) && self.is_variable(b) && *a != self.start && *b != self.start
                }
                _ => false,
            })
        })
    }

    /// 多符号规则里的终结符`t`换成一个只有规则`t`的变元。
    /// 已经有这样的非开始变元时直接用它，否则新建`U1`、`U2`……
    fn isolate_terminals(&self) -> CFG {
        let mut helpers: BTreeMap<String, String> = BTreeMap::new();
        for variable in self.variables.iter().filter(|v| **v != self.start) {
            if let Ok(rule) = self.rules(variable).exactly_one() {
                if rule.len() == 1 && self.is_terminal(&rule[0]) {
                    helpers
                        .entry(rule[0].clone())
                        .or_insert_with(|| variable.clone());
                }
            }
        }

        let mut grammar = self.clone();
        let mut counter = 0;
        for rule in self.productions.values().flatten().filter(|r| r.len() > 1) {
            for sym in rule {
                if self.is_terminal(sym) && !helpers.contains_key(sym) {
                    counter += 1;
                    let name = grammar.unused_name(&format!("U{}", counter));
                    grammar.add_rule(&name, vec![sym.clone()]);
                    helpers.insert(sym.clone(), name);
                }
            }
        }

        grammar.flat_map_rules(|_, rule| {
            if rule.len() == 1 {
                return Some(rule.clone());
            }
            Some(
                rule.iter()
                    .map(|sym| helpers.get(sym).unwrap_or(sym).clone())
                    .collect(),
            )
        })
    }

    /// 把长度超过2的规则`X -> Y1 Y2 ... Yn`拆成`X -> Y1 X1`、`X1 -> Y2 X2`……
    /// 相同的后缀只建一个变元。
    fn binarize(&self) -> CFG {
        let mut grammar = self.clone();
        let mut tails: BTreeMap<Rule, String> = BTreeMap::new();

        for variable in &self.variables {
            let mut counter = 0;
            let mut rules = BTreeSet::new();
            for rule in self.rules(variable) {
                if rule.len() <= 2 {
                    rules.insert(rule.clone());
                    continue;
                }
                let tail = grammar.chain(variable, &rule[1..], &mut tails, &mut counter);
                rules.insert(vec![rule[0].clone(), tail]);
            }
            grammar.productions.insert(variable.clone(), rules);
        }
        grammar
    }

    /// 返回推导出`tail`的变元，需要时新建，名字是所属变元加上计数。
    fn chain(
        &mut self,
        owner: &str,
        tail: &[String],
        tails: &mut BTreeMap<Rule, String>,
        counter: &mut usize,
    ) -> String {
        if let Some(name) = tails.get(tail) {
            return name.clone();
        }
        let name = loop {
            *counter += 1;
            let candidate = format!("{}{}", owner, counter);
            if !self.is_variable(&candidate) && !self.is_terminal(&candidate) {
                break candidate;
            }
        };
        tails.insert(tail.to_vec(), name.clone());

        let body = if tail.len() == 2 {
            tail.to_vec()
        } else {
            vec![tail[0].clone(), self.chain(owner, &tail[1..], tails, counter)]
        };
        self.add_rule(&name, body);
        name
    }
}
