use std::collections::{btree_map, BTreeSet};

use super::{Chart, Column};
use crate::cfg::CFG;

/// 枚举文法语言中长度恰好为L的串。
///
/// 没有固定的输入，每一列预测和完成之后，按下一个可能扫描的终结符分组，
/// 深度优先地逐个尝试，回溯时丢掉最后一列。
/// 每个分支对应不同的终结符，所以不会产生重复的串。
#[derive(Debug, Clone)]
pub struct Generator {
    chart: Chart,
}

impl Generator {
    /// 文法先做积极化简，减少死路。
    pub fn new(cfg: &CFG) -> Self {
        Generator {
            chart: Chart::new(&cfg.simplify_aggressive()),
        }
    }

    /// 长度为`length`的串组成的惰性序列，只能遍历一次。
    pub fn generate(&self, length: usize) -> Strings<'_> {
        let mut columns = vec![BTreeSet::from([self.chart.start_item()])];
        let scans = self.chart.expand(&mut columns);

        let mut strings = Strings {
            chart: &self.chart,
            length,
            columns,
            frames: Vec::new(),
            prefix: Vec::new(),
            empty_word: false,
        };
        if length == 0 {
            strings.empty_word = strings.columns[0].contains(&self.chart.stop_item());
        } else {
            strings.frames.push(scans.into_iter());
        }
        strings
    }
}

/// [`Generator::generate`]返回的迭代器。
///
/// `columns`、`frames`的长度总是`prefix`的长度加一：
/// 第k列是读入前k个终结符之后的项目集合，第k帧是这一列还没尝试过的扫描。
#[derive(Debug)]
pub struct Strings<'g> {
    chart: &'g Chart,
    length: usize,
    columns: Vec<Column>,
    frames: Vec<btree_map::IntoIter<usize, Column>>,
    prefix: Vec<usize>,
    empty_word: bool,
}

impl Strings<'_> {
    fn word(&self) -> String {
        self.prefix
            .iter()
            .filter_map(|&t| self.chart.terminals.get_index(t))
            .map(String::as_str)
            .collect()
    }
}

impl Iterator for Strings<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if std::mem::take(&mut self.empty_word) {
            return Some(String::new());
        }

        loop {
            let frame = self.frames.last_mut()?;
            let Some((terminal, next)) = frame.next() else {
                self.frames.pop();
                self.columns.pop();
                self.prefix.pop();
                continue;
            };

            self.columns.push(next);
            self.prefix.push(terminal);
            let scans = self.chart.expand(&mut self.columns);

            if self.prefix.len() < self.length {
                self.frames.push(scans.into_iter());
                continue;
            }

            let accepted = self
                .columns
                .last()
                .is_some_and(|column| column.contains(&self.chart.stop_item()));
            let word = accepted.then(|| self.word());
            self.columns.pop();
            self.prefix.pop();
            if word.is_some() {
                return word;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::earley::Recognizer;
    use std::collections::BTreeSet;

    fn grammar(alphabet: &[&str], text: &str) -> CFG {
        let alphabet: BTreeSet<String> = alphabet.iter().map(|s| s.to_string()).collect();
        CFG::parse(&alphabet, text).unwrap()
    }

    #[test_log::test]
    fn anbn_has_one_string_per_even_length() {
        let generator = Generator::new(&grammar(&["a", "b"], "S -> a S b | ε"));
        assert_eq!(generator.generate(0).collect::<Vec<_>>(), vec![""]);
        assert_eq!(generator.generate(1).count(), 0);
        assert_eq!(generator.generate(4).collect::<Vec<_>>(), vec!["aabb"]);
        assert_eq!(generator.generate(6).collect::<Vec<_>>(), vec!["aaabbb"]);
    }

    #[test_log::test]
    fn generated_strings_match_the_recognizer() {
        let g = grammar(&["a", "b"], "S -> a S b S | b S a S | ε");
        let generator = Generator::new(&g);
        let recognizer = Recognizer::new(&g);

        for length in 0..=6 {
            let generated: Vec<String> = generator.generate(length).collect();
            let unique: BTreeSet<&String> = generated.iter().collect();
            assert_eq!(unique.len(), generated.len());

            let mut expected = Vec::new();
            for bits in 0..(1u32 << length) {
                let word: String = (0..length)
                    .map(|i| if bits >> (length - 1 - i) & 1 == 0 { 'a' } else { 'b' })
                    .collect();
                if recognizer.accepts(&word) {
                    expected.push(word);
                }
            }
            assert_eq!(generated, expected, "length {}", length);
        }
    }

    #[test_log::test]
    fn empty_language_generates_nothing() {
        let generator = Generator::new(&grammar(&["a"], "S -> a S"));
        for length in 0..4 {
            assert_eq!(generator.generate(length).count(), 0);
        }
    }
}
