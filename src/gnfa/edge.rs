use crate::state::StateId;

/// 以边集的形式储存的GNFA转移，边上的标签是正则表达式。
///
/// 任意两个状态之间最多只有一条边，平行边在插入时就用并合并了。
#[derive(Debug, Clone, Default)]
pub struct Edges {
    trans: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge(pub StateId, pub String, pub StateId);

impl Edge {
    pub fn from(&self) -> StateId {
        self.0
    }
    pub fn to(&self) -> StateId {
        self.2
    }
    pub fn label(&self) -> &str {
        &self.1
    }
}

impl Edges {
    fn search_trans_by(
        &self,
        from: StateId,
        to: StateId,
        f: impl Fn(&Edge, (StateId, StateId)) -> bool,
    ) -> Vec<usize> {
        self.trans
            .iter()
            .enumerate()
            .filter(|(_, e)| f(e, (from, to)))
            .map(|(i, _)| i)
            .collect()
    }

    fn search_trans_by_from(&self, from: StateId) -> Vec<usize> {
        self.search_trans_by(from, 0, |edge, (id, _)| edge.from() == id)
    }

    fn search_trans_by_to(&self, to: StateId) -> Vec<usize> {
        self.search_trans_by(0, to, |edge, (_, id)| edge.to() == id)
    }

    fn search_trans_by_both(&self, from: StateId, to: StateId) -> Option<usize> {
        self.search_trans_by(from, to, |edge, (f, t)| edge.from() == f && edge.to() == t)
            .into_iter()
            .next()
    }

    pub fn label(&self, from: StateId, to: StateId) -> Option<&str> {
        self.search_trans_by_both(from, to)
            .map(|index| self.trans[index].label())
    }

    /// 加入一条边；已经有平行边时用`merge`把两个标签合并。
    pub fn insert(&mut self, from: StateId, label: String, to: StateId, merge: fn(&str, &str) -> String) {
        match self.search_trans_by_both(from, to) {
            Some(index) => {
                let merged = merge(&self.trans[index].1, &label);
                self.trans[index].1 = merged;
            }
            None => self.trans.push(Edge(from, label, to)),
        }
    }

    /// 从`state`出发的边（不含自环）。
    pub fn outgoing(&self, state: StateId) -> Vec<Edge> {
        self.search_trans_by_from(state)
            .into_iter()
            .map(|i| self.trans[i].clone())
            .filter(|e| e.to() != state)
            .collect()
    }

    /// 到达`state`的边（不含自环）。
    pub fn incoming(&self, state: StateId) -> Vec<Edge> {
        self.search_trans_by_to(state)
            .into_iter()
            .map(|i| self.trans[i].clone())
            .filter(|e| e.from() != state)
            .collect()
    }

    /// 删除和`state`相连的所有边。
    pub fn remove_state(&mut self, state: StateId) {
        self.trans.retain(|e| e.from() != state && e.to() != state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keep_first(a: &str, _: &str) -> String {
        a.to_string()
    }

    #[test_log::test]
    fn parallel_edges_are_merged() {
        let mut edges = Edges::default();
        edges.insert(0, "a".into(), 1, |a, b| format!("{}+{}", a, b));
        edges.insert(0, "b".into(), 1, |a, b| format!("{}+{}", a, b));
        assert_eq!(edges.label(0, 1), Some("a+b"));
        assert_eq!(edges.label(1, 0), None);
    }

    #[test_log::test]
    fn self_loops_are_not_incoming_or_outgoing() {
        let mut edges = Edges::default();
        edges.insert(1, "a".into(), 1, keep_first);
        edges.insert(0, "b".into(), 1, keep_first);
        edges.insert(1, "c".into(), 2, keep_first);

        assert_eq!(edges.incoming(1), vec![Edge(0, "b".into(), 1)]);
        assert_eq!(edges.outgoing(1), vec![Edge(1, "c".into(), 2)]);

        edges.remove_state(1);
        assert_eq!(edges.label(0, 1), None);
        assert_eq!(edges.label(1, 2), None);
        assert!(edges.outgoing(0).is_empty());
    }
}
