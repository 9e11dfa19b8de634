/// 自动机状态的编号。
pub type StateId = u32;

/// 状态编号分配器。
///
/// 同一个分配器分配出的编号单调递增、永不重复，
/// 所以由它构造的自动机可以随意组合（并、连接、闭包……）而不会发生编号冲突。
/// 分配器由构造器持有，不存在进程级的全局计数器。
#[derive(Debug, Default, Clone)]
pub struct StateAllocator {
    next: StateId,
}

impl StateAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从`start`开始分配，用于接在一批已有编号之后继续分配。
    pub fn starting_at(start: StateId) -> Self {
        Self { next: start }
    }

    pub fn fresh(&mut self) -> StateId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// 保证之后分配的编号都大于`id`。
    pub fn reserve_past(&mut self, id: StateId) {
        self.next = self.next.max(id + 1);
    }

    /// 下一个将要分配的编号，不消耗它。
    pub fn peek(&self) -> StateId {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn ids_are_never_reused() {
        let mut alloc = StateAllocator::new();
        let a = alloc.fresh();
        let b = alloc.fresh();
        assert_ne!(a, b);
        assert_eq!(alloc.peek(), 2);

        let mut later = StateAllocator::starting_at(10);
        assert_eq!(later.fresh(), 10);
        assert_eq!(later.fresh(), 11);

        later.reserve_past(4);
        assert_eq!(later.fresh(), 12);
        later.reserve_past(20);
        assert_eq!(later.fresh(), 21);
    }
}
