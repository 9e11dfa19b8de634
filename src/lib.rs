/*!
本项目实现了正则语言和上下文无关语言的各种表示形式之间的转换，
编译成WebAssembly之后在浏览器里运行。

包含这些功能：
- 正则表达式 -> 带空转移的NFA（Thompson构造法）
- NFA的并、连接、闭包、补、交、差、对称差、反转
- NFA -> DFA（子集构造法），最短接受串，成员判定
- DFA -> 正则表达式（GNFA状态消去法）
- 上下文无关文法的化简、消去空规则和单元规则、乔姆斯基范式
- PDA -> 上下文无关文法（三元组构造）
- Earley识别器，按长度枚举文法生成的串
- 两个正则表达式或两个文法之间的差别

# 用法

阅读本文档就能了解这个包的结构。每个`#[wasm_bindgen]`函数处理浏览器的一次请求，
请求之间不共享任何状态。

点击每个页面右上角的 `source` 即可观看源码。
*/
mod utils;

/// 按值比较的容器。
pub mod collections;

/// 错误类型。
pub mod error;

/// 自动机状态编号和编号分配器。
pub mod state;

/// 输入符号和空串符号。
pub mod symbol;

/// 正则表达式的词法分析和语法分析。
pub mod regex;

/// NFA 相关的结构体和方法。
///
/// 本模块包含了NFA的结构体，以及从正则表达式构建NFA的方法和NFA之间的运算。
pub mod nfa;

/// DFA 相关的结构体和方法。
///
/// DFA由NFA经过子集构造法得到，状态编号按发现的顺序从0开始连续分配。
/// 构造出的DFA总是完全的：空的子集也是一个状态（死状态）。
pub mod dfa;

/// 用GNFA状态消去法从DFA提取正则表达式。
pub mod gnfa;

/// 上下文无关文法。
pub mod cfg;

/// 下推自动机，以及把它转换为文法的三元组构造。
pub mod pda;

/// Earley识别器和生成器。
pub mod earley;

/// 两个语言之间的差别。
pub mod equivalence;

/// 网页前端的自动机输入格式。
pub mod input;

use wasm_bindgen::prelude::*;

use crate::cfg::CFG;
use crate::dfa::DFA;
use crate::earley::Recognizer;
use crate::equivalence::{Budget, Verdict};
use crate::gnfa::GNFA;

/// 两个语言之间的差别，返回给JavaScript。
///
/// `left`只属于第一个语言，`right`只属于第二个语言，都为空时没有找到差别。
/// 比较文法时`length`是找到差别的长度；`conclusive`为假表示搜索在预算内没有结论。
#[wasm_bindgen(getter_with_clone)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witnesses {
    pub left: Option<String>,
    pub right: Option<String>,
    pub length: Option<usize>,
    pub conclusive: bool,
}

/// 输入NFA，返回等价的正则表达式；语言为空时返回`undefined`。
#[wasm_bindgen]
pub fn nfa_to_regex(
    alphabet: &str,
    start: &str,
    accept: &str,
    edges: &str,
) -> Result<Option<String>, JsError> {
    utils::set_panic_hook();
    let nfa = input::parse_nfa(alphabet, start, accept, edges)?;
    Ok(GNFA::from_dfa(&DFA::build_dfa_from_nfa(&nfa)).to_regular_expression())
}

/// 比较两个正则表达式，返回各自独有的最短串。
#[wasm_bindgen]
pub fn regex_equivalence(alphabet: &str, regex1: &str, regex2: &str) -> Result<Witnesses, JsError> {
    utils::set_panic_hook();
    let alphabet = input::parse_alphabet(alphabet)?;
    let (left, right) = equivalence::regex_witnesses(&alphabet, regex1, regex2)?;
    Ok(Witnesses {
        left,
        right,
        length: None,
        conclusive: true,
    })
}

/// 判断`test`是否属于文法的语言，每个字符是一个终结符。
#[wasm_bindgen]
pub fn cfg_membership(alphabet: &str, cfg: &str, test: &str) -> Result<bool, JsError> {
    utils::set_panic_hook();
    let grammar = CFG::parse(&input::parse_terminals(alphabet), cfg)?;
    Ok(Recognizer::new(&grammar.simplify_passive()).accepts(test))
}

/// 把文法转换为乔姆斯基范式。没有出现在产生式左边的符号都当作终结符。
#[wasm_bindgen]
pub fn cfg_to_cnf(cfg: &str) -> Result<String, JsError> {
    utils::set_panic_hook();
    Ok(CFG::parse_inferring_terminals(cfg)?.to_cnf().to_string())
}

/// 按长度比较两个文法生成的串，`max_length`是比较的最大长度。
#[wasm_bindgen]
pub fn cfg_equivalence(
    alphabet: &str,
    cfg1: &str,
    cfg2: &str,
    max_length: usize,
) -> Result<Witnesses, JsError> {
    utils::set_panic_hook();
    let alphabet = input::parse_terminals(alphabet);
    let g1 = CFG::parse(&alphabet, cfg1)?;
    let g2 = CFG::parse(&alphabet, cfg2)?;
    let budget = Budget {
        max_length,
        ..Budget::default()
    };

    let witnesses = match equivalence::grammar_witnesses(&g1, &g2, &budget) {
        Verdict::Different {
            length,
            left,
            right,
        } => Witnesses {
            left,
            right,
            length: Some(length),
            conclusive: true,
        },
        Verdict::Inconclusive { checked_up_to } => Witnesses {
            left: None,
            right: None,
            length: checked_up_to,
            conclusive: false,
        },
    };
    Ok(witnesses)
}

/// 把PDA转换为文法，返回文法的文本。
#[wasm_bindgen]
pub fn pda_to_cfg(start: &str, accept: &str, edges: &str) -> Result<String, JsError> {
    utils::set_panic_hook();
    let pda = input::parse_pda(start, accept, edges)?;
    Ok(CFG::from_pda(&pda)?.to_string())
}
