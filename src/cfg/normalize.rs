use std::collections::BTreeSet;

use itertools::Itertools;
use tracing::{debug, trace};

use super::{epsilon_rule, is_epsilon_rule, Rule, CFG};
use crate::collections::DefaultMap;

impl CFG {
    /// 删除非产生性变元和用到它们的规则。
    ///
    /// 开始变元本身不产生时，语言是空集，只留下没有规则的开始变元。
    pub fn eliminate_non_generating_variables(&self) -> CFG {
        let generating = self.generating();
        if !generating.contains(&self.start) {
            return CFG::new(self.terminals.clone(), self.start.clone());
        }
        self.flat_map_rules(|_, rule| {
            let keep = rule
                .iter()
                .all(|sym| !self.is_variable(sym) || generating.contains(sym));
            keep.then(|| rule.clone())
        })
        .retain_variables(|v| generating.contains(v))
    }

    pub fn eliminate_unreachable_variables(&self) -> CFG {
        let reachable = self.reachable();
        self.retain_variables(|v| reachable.contains(v))
    }

    /// 删除`X -> X`这样的规则。
    pub fn eliminate_self_recursive_unit_rules(&self) -> CFG {
        self.flat_map_rules(|variable, rule| {
            (!(rule.len() == 1 && rule[0] == variable)).then(|| rule.clone())
        })
    }

    /// 消去委托变元：唯一的规则是另一个变元本身的变元。
    ///
    /// `X -> Y`是`X`唯一的规则时，`X`拿走`Y`的全部规则，其他地方的`Y`都换成`X`，然后删除`Y`。
    /// 如果`Y`是开始变元，`X`成为新的开始变元。
    pub fn eliminate_delegating_variables(&self) -> CFG {
        let mut grammar = self.clone();
        while let Some((x, y)) = grammar.find_delegating() {
            trace!("folding {} into {}", y, x);
            let mut folded = grammar.flat_map_rules(|variable, rule| {
                if variable == x {
                    return Vec::new();
                }
                vec![rule
                    .iter()
                    .map(|sym| if *sym == y { x.clone() } else { sym.clone() })
                    .collect::<Rule>()]
            });
            let delegated = folded.productions.remove(&y).unwrap_or_default();
            folded
                .productions
                .entry(x.clone())
                .extend(delegated.into_iter().filter(|r| !(r.len() == 1 && r[0] == x)));
            folded.variables.shift_remove(&y);
            grammar = if folded.start == y {
                folded.with_start(&x)
            } else {
                folded
            };
        }
        grammar
    }

    fn find_delegating(&self) -> Option<(String, String)> {
        self.variables.iter().find_map(|x| {
            let rules = self.productions.get(x)?;
            let rule = rules.iter().exactly_one().ok()?;
            (self.is_unit_rule(rule) && rule[0] != *x).then(|| (x.clone(), rule[0].clone()))
        })
    }

    /// 消去只有一条规则的非开始变元：把这条规则的符号拼接到每个引用它的位置上。
    pub fn eliminate_single_rule_variables(&self) -> CFG {
        let mut grammar = self.clone();
        while let Some((variable, body)) = grammar.find_single_rule() {
            trace!("inlining single-rule variable {}", variable);
            grammar = grammar
                .flat_map_rules(|_, rule| {
                    let spliced: Rule = rule
                        .iter()
                        .flat_map(|sym| {
                            if *sym == variable {
                                body.clone()
                            } else {
                                vec![sym.clone()]
                            }
                        })
                        .collect();
                    Some(spliced)
                })
                .drop_variable(&variable);
        }
        grammar
    }

    fn find_single_rule(&self) -> Option<(String, Rule)> {
        self.variables
            .iter()
            .filter(|v| **v != self.start)
            .find_map(|v| {
                let rule = self.productions.get(v)?.iter().exactly_one().ok()?;
                (!rule.contains(v)).then(|| (v.clone(), rule.clone()))
            })
    }

    /// 删除变元的规则和它在变元集合里的位置。调用者负责先消除对它的引用。
    fn drop_variable(mut self, variable: &str) -> CFG {
        self.productions.remove(variable);
        self.variables.shift_remove(variable);
        self
    }

    /// 消去非开始变元的空规则。
    ///
    /// 每找到一个有空规则的变元`E`，就删除这条空规则，然后对所有引用`E`的规则，
    /// 按`E`的出现位置取幂集，删去其中一部分位置得到新规则。
    /// 已经删过空规则的变元不再接受新产生的空规则。
    pub fn eliminate_epsilon_rules(&self) -> CFG {
        let mut grammar = self.clone();
        let mut stripped: BTreeSet<String> = BTreeSet::new();

        while let Some(epsilon) = grammar.find_epsilon_rule() {
            trace!("removing epsilon rule of {}", epsilon);
            if let Some(rules) = grammar.productions.get(&epsilon) {
                let rules = rules.iter().filter(|r| !is_epsilon_rule(r)).cloned().collect();
                grammar.productions.insert(epsilon.clone(), rules);
            }
            stripped.insert(epsilon.clone());

            grammar = grammar.flat_map_rules(|variable, rule| {
                let positions: Vec<usize> = rule
                    .iter()
                    .positions(|sym| *sym == epsilon)
                    .collect();
                positions
                    .into_iter()
                    .powerset()
                    .map(|dropped| {
                        rule.iter()
                            .enumerate()
                            .filter(|(i, _)| !dropped.contains(i))
                            .map(|(_, sym)| sym.clone())
                            .collect::<Rule>()
                    })
                    .map(super::collapse)
                    .filter(|r| !(is_epsilon_rule(r) && stripped.contains(variable)))
                    .collect::<Vec<_>>()
            });
        }
        grammar
    }

    fn find_epsilon_rule(&self) -> Option<String> {
        self.variables
            .iter()
            .filter(|v| **v != self.start)
            .find(|v| self.rules(v).any(|r| is_epsilon_rule(r)))
            .cloned()
    }

    /// 消去单元规则`X -> Y`：换成`Y`当前的全部规则。
    ///
    /// 每个`(X, Y)`只展开一次，环状的单元规则不会无限展开。
    pub fn eliminate_unit_rules(&self) -> CFG {
        let mut grammar = self.clone();
        let mut expanded: DefaultMap<String, BTreeSet<String>> = DefaultMap::default();

        while let Some((variable, unit)) = grammar.find_unit_rule() {
            let mut rules: BTreeSet<Rule> = grammar
                .rules(&variable)
                .filter(|r| !(r.len() == 1 && r[0] == unit))
                .cloned()
                .collect();
            if expanded.entry(variable.clone()).insert(unit.clone()) {
                rules.extend(grammar.rules(&unit).cloned());
            }
            grammar.productions.insert(variable, rules);
        }
        grammar
    }

    fn find_unit_rule(&self) -> Option<(String, String)> {
        self.variables.iter().find_map(|v| {
            self.rules(v)
                .find(|r| self.is_unit_rule(r))
                .map(|r| (v.clone(), r[0].clone()))
        })
    }

    /// 删除只能推导出空串的非开始变元，并从所有规则里删掉它们的出现。
    pub fn eliminate_null_variables(&self) -> CFG {
        let null: BTreeSet<String> = self
            .null_variables()
            .into_iter()
            .filter(|v| *v != self.start)
            .collect();
        if null.is_empty() {
            return self.clone();
        }
        trace!("removing null variables {:?}", null);
        self.flat_map_rules(|_, rule| {
            Some(rule.iter().filter(|s| !null.contains(*s)).cloned().collect())
        })
        .retain_variables(|v| !null.contains(v))
    }

    /// 消去不引用自己的非开始变元：在每个引用它的规则里，
    /// 对所有出现位置取它的规则集合的笛卡尔积来代入，然后删除它。
    pub fn eliminate_non_self_recursive_variables(&self) -> CFG {
        let mut grammar = self.clone();
        while let Some(variable) = grammar.find_non_self_recursive() {
            let bodies: Vec<Rule> = grammar.rules(&variable).cloned().collect();
            trace!("substituting {} ({} rules)", variable, bodies.len());
            grammar = grammar
                .flat_map_rules(|_, rule| substitute(rule, &variable, &bodies))
                .drop_variable(&variable);
        }
        grammar
    }

    fn find_non_self_recursive(&self) -> Option<String> {
        self.variables
            .iter()
            .filter(|v| **v != self.start)
            .find(|v| self.rules(v).all(|rule| !rule.contains(*v)))
            .cloned()
    }

    /// `X -> X X | ε`只能推导出空串，直接化成`X -> ε`。
    pub fn collapse_trivial_star(&self) -> CFG {
        let mut grammar = self.clone();
        for variable in &self.variables {
            let star = BTreeSet::from([vec![variable.clone(), variable.clone()], epsilon_rule()]);
            if self.productions.get(variable) == Some(&star) {
                grammar
                    .productions
                    .insert(variable.clone(), BTreeSet::from([epsilon_rule()]));
            }
        }
        grammar
    }

    /// 删除非产生性变元、不可达变元和`X -> X`规则。
    pub fn simplify_passive(&self) -> CFG {
        let simplified = self
            .eliminate_non_generating_variables()
            .eliminate_unreachable_variables()
            .eliminate_self_recursive_unit_rules();
        debug!(
            "passive simplification: {} -> {} rules",
            self.rule_count(),
            simplified.rule_count()
        );
        simplified
    }

    /// 在消极化简的基础上再消去委托变元、单规则变元和只能推导空串的变元。
    /// 这些变换会互相影响，所以做两遍。
    pub fn simplify_aggressive(&self) -> CFG {
        let simplified = (0..2).fold(self.simplify_passive(), |grammar, _| {
            grammar
                .eliminate_delegating_variables()
                .eliminate_single_rule_variables()
                .eliminate_null_variables()
                .simplify_passive()
        });
        debug!(
            "aggressive simplification: {} -> {} rules",
            self.rule_count(),
            simplified.rule_count()
        );
        simplified
    }
}

/// 把规则里`variable`的每一次出现都换成`bodies`中的某一条，返回所有组合。
fn substitute(rule: &Rule, variable: &str, bodies: &[Rule]) -> Vec<Rule> {
    let count = rule.iter().filter(|sym| *sym == variable).count();
    if count == 0 {
        return vec![rule.clone()];
    }
    (0..count)
        .map(|_| bodies.iter())
        .multi_cartesian_product()
        .map(|choice| {
            let mut choice = choice.into_iter();
            rule.iter()
                .flat_map(|sym| {
                    if sym == variable {
                        choice.next().cloned().unwrap_or_default()
                    } else {
                        vec![sym.clone()]
                    }
                })
                .collect()
        })
        .collect()
}
