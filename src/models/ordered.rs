//! # 有序字符串键映射
//!
//! 保留插入顺序的小型映射，用于化合物列表和发射线列表。
//! 发射线的"首次出现顺序"决定了标定集合中活动发射线的排列，
//! 因此读写文件时必须保持键顺序。
//!
//! ## 依赖关系
//! - 被 `models/standard.rs`, `models/calibration.rs` 使用
//! - 使用 `serde` 实现映射格式的序列化

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// 按插入顺序保存的 `String -> V` 映射
///
/// `index` 记录每个键在 `entries` 中的位置，删除条目后整体重建。
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    /// 创建空映射
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, (k, _)) in self.entries.iter().enumerate() {
            self.index.insert(k.clone(), i);
        }
    }

    fn push_new(&mut self, key: String, value: V) {
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.position(key).map(|i| &mut self.entries[i].1)
    }

    /// 插入键值；键已存在时原位替换并返回旧值
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.push_new(key, value);
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        let i = self.position(key)?;
        let (_, value) = self.entries.remove(i);
        self.reindex();
        Some(value)
    }

    /// 只保留满足条件的条目（顺序不变）
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &V) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|(k, v)| keep(k, v));
        if self.entries.len() != before {
            self.reindex();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut V)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.iter_mut().map(|(_, v)| v)
    }
}

impl<V: Copy + std::ops::AddAssign> OrderedMap<V> {
    /// 累加到已有键上，键不存在时插入
    pub fn accumulate(&mut self, key: &str, value: V) {
        match self.get_mut(key) {
            Some(existing) => *existing += value,
            None => self.push_new(key.to_string(), value),
        }
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V> IntoIterator for OrderedMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<V> {
    marker: PhantomData<V>,
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a mapping with string keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut map = OrderedMap::new();
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor {
            marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_survives_json() {
        let mut map = OrderedMap::new();
        map.insert("Zn_K", 1.0);
        map.insert("Au_L", 2.0);
        map.insert("Ca_K", 3.0);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"Zn_K":1.0,"Au_L":2.0,"Ca_K":3.0}"#);

        let back: OrderedMap<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.keys().collect::<Vec<_>>(), vec!["Zn_K", "Au_L", "Ca_K"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map: OrderedMap<i32> = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(map.insert("a", 5), Some(1));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&5));
    }

    #[test]
    fn test_accumulate_and_retain() {
        let mut map = OrderedMap::new();
        map.accumulate("Fe", 1.5);
        map.accumulate("O", 0.5);
        map.accumulate("Fe", 2.0);
        assert_eq!(map.get("Fe"), Some(&3.5));

        map.retain(|k, _| k != "O");
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key("O"));
    }

    #[test]
    fn test_lookup_after_remove_and_retain() {
        let mut map: OrderedMap<i32> = [("a", 1), ("b", 2), ("c", 3), ("d", 4)].into_iter().collect();

        assert_eq!(map.remove("a"), Some(1));
        assert_eq!(map.get("b"), Some(&2));
        assert_eq!(map.get("d"), Some(&4));

        map.retain(|k, _| k != "c");
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "d"]);
        assert_eq!(map.get("d"), Some(&4));
        assert!(map.get("c").is_none());

        map.insert("e", 5);
        *map.get_mut("d").unwrap() += 10;
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("b", &2), ("d", &14), ("e", &5)]);
        assert_eq!(map.remove("a"), None);
    }
}
