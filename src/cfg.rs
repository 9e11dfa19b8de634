use std::collections::BTreeSet;

use indexmap::IndexSet;

use crate::collections::DefaultMap;
use crate::symbol::EPSILON_STR;

/// 文法分析：产生性、可达性、可空性。
mod analysis;

/// 化简文法的各种变换。
mod normalize;

/// 乔姆斯基范式。
mod cnf;

/// 文法的文本格式。
mod text;

/// 一条规则：有序的符号序列。空规则写作只含`ε`的序列。
pub type Rule = Vec<String>;

pub type Productions = DefaultMap<String, BTreeSet<Rule>>;

/// 上下文无关文法。
///
/// 变元保持插入顺序，开始变元总在第一个；打印文法时按这个顺序输出。
/// 规则集合是有序集合，相同的规则只保存一次。
///
/// 所有变换都返回新的文法，不修改原来的文法。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CFG {
    terminals: BTreeSet<String>,
    variables: IndexSet<String>,
    start: String,
    productions: Productions,
}

pub fn is_epsilon_rule(rule: &[String]) -> bool {
    rule.len() == 1 && rule[0] == EPSILON_STR
}

pub fn epsilon_rule() -> Rule {
    vec![EPSILON_STR.to_string()]
}

/// 整理规则：多个符号的规则里去掉`ε`，什么都不剩的规则变成空规则。
pub fn collapse(rule: Rule) -> Rule {
    let rule: Rule = rule.into_iter().filter(|sym| sym != EPSILON_STR).collect();
    if rule.is_empty() {
        epsilon_rule()
    } else {
        rule
    }
}

impl CFG {
    /// 只有开始变元、没有任何规则的文法，它的语言是空集。
    pub fn new(terminals: BTreeSet<String>, start: impl Into<String>) -> Self {
        let start = start.into();
        CFG {
            terminals,
            variables: IndexSet::from([start.clone()]),
            start,
            productions: Productions::default(),
        }
    }

    /// 加入一条规则。规则里出现的不是终结符的符号都会被当作变元。
    pub fn add_rule(&mut self, variable: &str, rule: Rule) {
        let rule = collapse(rule);
        self.variables.insert(variable.to_string());
        for sym in &rule {
            if sym != EPSILON_STR && !self.terminals.contains(sym) {
                self.variables.insert(sym.clone());
            }
        }
        self.productions.entry(variable.to_string()).insert(rule);
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn terminals(&self) -> &BTreeSet<String> {
        &self.terminals
    }

    pub fn variables(&self) -> &IndexSet<String> {
        &self.variables
    }

    pub fn productions(&self) -> &Productions {
        &self.productions
    }

    /// 变元的所有规则；没有规则时是空迭代器。
    pub fn rules<'a>(&'a self, variable: &str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.productions.get(variable).into_iter().flatten()
    }

    pub fn rule_count(&self) -> usize {
        self.productions.values().map(BTreeSet::len).sum()
    }

    pub fn is_terminal(&self, sym: &str) -> bool {
        self.terminals.contains(sym)
    }

    pub fn is_variable(&self, sym: &str) -> bool {
        self.variables.contains(sym)
    }

    pub fn is_unit_rule(&self, rule: &[String]) -> bool {
        rule.len() == 1 && self.is_variable(&rule[0])
    }

    /// 找一个没被用过的名字：`base`本身可用就用它，否则依次尝试`base1`、`base2`……
    pub fn unused_name(&self, base: &str) -> String {
        let taken = |name: &str| self.is_variable(name) || self.is_terminal(name);
        if !taken(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{}{}", base, n))
            .find(|name| !taken(name))
            .unwrap_or_else(|| base.to_string())
    }

    /// 对每条规则做变换，一条规则可以变成零条或多条；变元不变。
    fn flat_map_rules<F, I>(&self, mut f: F) -> CFG
    where
        F: FnMut(&str, &Rule) -> I,
        I: IntoIterator<Item = Rule>,
    {
        let mut productions = Productions::default();
        for (variable, rules) in self.productions.iter() {
            let mapped: BTreeSet<Rule> = rules
                .iter()
                .flat_map(|rule| f(variable, rule))
                .map(collapse)
                .collect();
            productions.insert(variable.clone(), mapped);
        }
        CFG {
            productions,
            ..self.clone()
        }
    }

    /// 只保留满足条件的变元和它们的规则。开始变元总是保留。
    fn retain_variables(&self, mut keep: impl FnMut(&str) -> bool) -> CFG {
        let start = self.start.clone();
        let mut keep = |v: &str| v == start || keep(v);
        let variables: IndexSet<String> = self
            .variables
            .iter()
            .filter(|v| keep(v))
            .cloned()
            .collect();
        let productions: Productions = self
            .productions
            .iter()
            .filter(|(v, _)| variables.contains(*v))
            .map(|(v, rules)| (v.clone(), rules.clone()))
            .collect();
        CFG {
            terminals: self.terminals.clone(),
            variables,
            start,
            productions,
        }
    }

    /// 换一个开始变元，新的开始变元排到第一个。
    fn with_start(mut self, start: &str) -> CFG {
        self.variables = std::iter::once(start.to_string())
            .chain(self.variables.into_iter().filter(|v| v != start))
            .collect();
        self.start = start.to_string();
        self
    }

    /// 加入一个新的开始变元，它只有一条规则，指向原来的开始变元。
    pub fn augment_start(&self, base: &str) -> CFG {
        let name = self.unused_name(base);
        let mut augmented = self.clone();
        augmented.add_rule(&name, vec![self.start.clone()]);
        augmented.with_start(&name)
    }

    /// 把变元重命名为`A`、`B`、……、`Z`、`AA`、`AB`……，跳过和终结符同名的名字。
    /// 开始变元是`A`。
    pub fn rename(&self) -> CFG {
        let mut names = (1..).map(spreadsheet_name).filter(|n| !self.is_terminal(n));
        let mapping: DefaultMap<String, String> = self
            .variables
            .iter()
            .map(|v| (v.clone(), names.next().unwrap_or_default()))
            .collect();
        let rename = |sym: &String| match mapping.get(sym) {
            Some(name) => name.clone(),
            None => sym.clone(),
        };

        let mut renamed = CFG::new(self.terminals.clone(), rename(&self.start));
        for variable in &self.variables {
            renamed.variables.insert(rename(variable));
        }
        for (variable, rules) in self.productions.iter() {
            for rule in rules {
                renamed.add_rule(&rename(variable), rule.iter().map(rename).collect());
            }
        }
        renamed
    }
}

/// 第`n`个（从1开始）电子表格列名：A、B、……、Z、AA、AB……
fn spreadsheet_name(mut n: usize) -> String {
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}
