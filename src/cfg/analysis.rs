use std::collections::BTreeSet;

use super::CFG;
use crate::symbol::EPSILON_STR;

impl CFG {
    /// 产生性变元：能推导出某个终结符串的变元。
    ///
    /// 从右部全是终结符或`ε`的规则出发求不动点。
    pub fn generating(&self) -> BTreeSet<String> {
        let mut generating = BTreeSet::new();
        loop {
            let found = self
                .productions
                .iter()
                .filter(|(variable, _)| !generating.contains(*variable))
                .find(|(_, rules)| {
                    rules.iter().any(|rule| {
                        rule.iter().all(|sym| {
                            sym == EPSILON_STR || self.is_terminal(sym) || generating.contains(sym)
                        })
                    })
                })
                .map(|(variable, _)| variable.clone());
            match found {
                Some(variable) => {
                    generating.insert(variable);
                }
                None => break generating,
            }
        }
    }

    /// 从开始变元出发，沿着规则里的符号能到达的变元。
    pub fn reachable(&self) -> BTreeSet<String> {
        let mut reachable = BTreeSet::from([self.start.clone()]);
        let mut stack = vec![self.start.clone()];

        while let Some(variable) = stack.pop() {
            for rule in self.rules(&variable) {
                for sym in rule {
                    if self.is_variable(sym) && reachable.insert(sym.clone()) {
                        stack.push(sym.clone());
                    }
                }
            }
        }
        reachable
    }

    /// 可空变元：能推导出空串的变元。
    pub fn nullable(&self) -> BTreeSet<String> {
        let mut nullable = BTreeSet::new();
        loop {
            let found = self
                .productions
                .iter()
                .filter(|(variable, _)| !nullable.contains(*variable))
                .find(|(_, rules)| {
                    rules.iter().any(|rule| {
                        rule.iter()
                            .all(|sym| sym == EPSILON_STR || nullable.contains(sym))
                    })
                })
                .map(|(variable, _)| variable.clone());
            match found {
                Some(variable) => {
                    nullable.insert(variable);
                }
                None => break nullable,
            }
        }
    }

    /// 只能推导出空串的变元。
    ///
    /// 先求出能推导出非空串的变元：某条规则含有终结符或这样的变元。
    /// 可空变元里除去它们就是结果。
    pub fn null_variables(&self) -> BTreeSet<String> {
        let mut non_null: BTreeSet<String> = BTreeSet::new();
        loop {
            let found = self
                .productions
                .iter()
                .filter(|(variable, _)| !non_null.contains(*variable))
                .find(|(_, rules)| {
                    rules.iter().any(|rule| {
                        rule.iter()
                            .any(|sym| self.is_terminal(sym) || non_null.contains(sym))
                    })
                })
                .map(|(variable, _)| variable.clone());
            match found {
                Some(variable) => {
                    non_null.insert(variable);
                }
                None => break,
            }
        }

        self.nullable()
            .into_iter()
            .filter(|variable| !non_null.contains(variable))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::cfg::tests::grammar;

    fn set(items: &[&str]) -> std::collections::BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test_log::test]
    fn generating_variables() {
        let g = grammar(&["a", "b"], "S -> A B | a\nA -> a A\nB -> b | C\nC -> ε");
        assert_eq!(g.generating(), set(&["B", "C", "S"]));
    }

    #[test_log::test]
    fn reachable_variables() {
        let g = grammar(&["a"], "S -> a A\nA -> a\nB -> A a");
        assert_eq!(g.reachable(), set(&["A", "S"]));
    }

    #[test_log::test]
    fn nullable_variables() {
        let g = grammar(&["a"], "S -> A B | a\nA -> ε | a\nB -> A A\nC -> C a");
        assert_eq!(g.nullable(), set(&["A", "B", "S"]));
    }

    #[test_log::test]
    fn null_variables_derive_only_empty() {
        let g = grammar(&["a"], "S -> A B a\nA -> ε | B B\nB -> ε\nC -> a | ε\nD -> D");
        assert_eq!(g.null_variables(), set(&["A", "B"]));
    }
}
