//! 按值比较的容器。
//!
//! 状态集合、规则、转移元组都直接派生`Eq`、`Ord`、`Hash`，
//! 所以它们本身就能当作`BTreeMap`/`BTreeSet`的键，相等就是结构相等，不靠哈希值判断。
//! 这里只补上一个“取不到就插入默认值”的映射。

use std::borrow::Borrow;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::ops::Deref;

/// 带默认值的映射。
///
/// 用可变方式取一个不存在的键时，会先用生成函数造出默认值并插入，再返回它的可变引用。
/// 在文法和自动机的代码里用来表示“不断往里加元素的集合的映射”。
#[derive(Clone)]
pub struct DefaultMap<K, V> {
    map: BTreeMap<K, V>,
    make: fn() -> V,
}

impl<K: Ord, V> DefaultMap<K, V> {
    pub fn with_generator(make: fn() -> V) -> Self {
        Self {
            map: BTreeMap::new(),
            make,
        }
    }

    /// 取出键对应的值；不存在就先插入默认值。
    pub fn entry(&mut self, key: K) -> &mut V {
        let make = self.make;
        self.map.entry(key).or_insert_with(make)
    }

    /// 只读地取值，不存在时返回生成函数造出的新值，不会插入。
    pub fn get_or_default(&self, key: &K) -> V
    where
        V: Clone,
    {
        self.map.get(key).cloned().unwrap_or_else(self.make)
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.map.insert(key, value)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.remove(key)
    }

    pub fn into_inner(self) -> BTreeMap<K, V> {
        self.map
    }
}

impl<K: Ord, V: Default> Default for DefaultMap<K, V> {
    fn default() -> Self {
        Self::with_generator(V::default)
    }
}

impl<K, V> Deref for DefaultMap<K, V> {
    type Target = BTreeMap<K, V>;

    fn deref(&self) -> &Self::Target {
        &self.map
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for DefaultMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}

impl<K: Ord, V: Default> FromIterator<(K, V)> for DefaultMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
            make: V::default,
        }
    }
}

impl<K, V> IntoIterator for DefaultMap<K, V> {
    type Item = (K, V);
    type IntoIter = btree_map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a DefaultMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = btree_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for DefaultMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<K: Eq, V: Eq> Eq for DefaultMap<K, V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test_log::test]
    fn missing_keys_get_installed_on_mutable_lookup() {
        let mut map: DefaultMap<(u32, char), BTreeSet<u32>> = DefaultMap::default();
        assert!(map.get(&(0, 'a')).is_none());

        map.entry((0, 'a')).insert(1);
        map.entry((0, 'a')).insert(2);
        map.entry((1, 'b'));

        assert_eq!(map.len(), 2);
        assert_eq!(map[&(0, 'a')], BTreeSet::from([1, 2]));
        assert!(map[&(1, 'b')].is_empty());
    }

    #[test_log::test]
    fn read_only_default_does_not_insert() {
        let map: DefaultMap<Vec<u32>, Vec<u32>> = DefaultMap::with_generator(|| vec![7]);
        assert_eq!(map.get_or_default(&vec![1, 2]), vec![7]);
        assert!(map.is_empty());
    }

    #[test_log::test]
    fn composite_keys_compare_by_value() {
        let mut map: DefaultMap<BTreeSet<u32>, usize> = DefaultMap::default();
        *map.entry(BTreeSet::from([3, 1, 2])) += 1;
        *map.entry([1, 2, 3].into_iter().collect()) += 1;
        assert_eq!(map.len(), 1);
        assert_eq!(map[&BTreeSet::from([1, 2, 3])], 2);
    }

    #[test_log::test]
    fn owned_keys_are_removed_by_borrowed_form() {
        let mut map: DefaultMap<String, BTreeSet<u32>> = DefaultMap::default();
        map.entry("S".to_string()).insert(1);
        map.entry("T".to_string()).insert(2);

        assert_eq!(map.remove("S"), Some(BTreeSet::from([1])));
        assert_eq!(map.remove("S"), None);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["T"]);
    }
}
