//! Per-coordinate value buckets produced by a walk.

use std::collections::BTreeMap;

use crate::scalar::Scalar;

/// Axis combination addressing one bucket.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RangeKey {
    pub date: String,
    pub level: Scalar,
    pub number: Scalar,
    pub param: String,
    pub step: Scalar,
}

impl RangeKey {
    pub fn new(
        date: impl Into<String>,
        level: Scalar,
        number: Scalar,
        param: impl Into<String>,
        step: Scalar,
    ) -> Self {
        Self {
            date: date.into(),
            level,
            number,
            param: param.into(),
            step,
        }
    }
}

/// Map from axis combination to a flat per-point buffer.
///
/// Buckets only grow during a walk: each leaf appends its slice in visit order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeStore {
    buckets: BTreeMap<RangeKey, Vec<Option<f64>>>,
}

impl RangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &RangeKey) -> Option<&[Option<f64>]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// Insert a bucket, replacing any existing one.
    pub fn put(&mut self, key: RangeKey, values: Vec<Option<f64>>) {
        self.buckets.insert(key, values);
    }

    /// Append values to a bucket, creating it if absent.
    pub fn extend(&mut self, key: RangeKey, values: &[Option<f64>]) {
        self.buckets.entry(key).or_default().extend_from_slice(values);
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of values over all buckets.
    pub fn value_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn has_date(&self, date: &str) -> bool {
        self.buckets.keys().any(|k| k.date == date)
    }

    /// Remove every bucket under a date.
    pub fn remove_date(&mut self, date: &str) {
        self.buckets.retain(|k, _| k.date != date);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RangeKey, &[Option<f64>])> {
        self.buckets.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(date: &str, number: i64) -> RangeKey {
        RangeKey::new(date, Scalar::Int(0), Scalar::Int(number), "2t", Scalar::Int(0))
    }

    #[test]
    fn test_extend_appends_in_order() {
        let mut store = RangeStore::new();
        store.extend(key("d1", 0), &[Some(1.0), Some(2.0)]);
        store.extend(key("d1", 0), &[None, Some(4.0)]);
        assert_eq!(
            store.get(&key("d1", 0)).unwrap(),
            &[Some(1.0), Some(2.0), None, Some(4.0)]
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.value_count(), 4);
    }

    #[test]
    fn test_put_replaces() {
        let mut store = RangeStore::new();
        store.extend(key("d1", 0), &[Some(1.0)]);
        store.put(key("d1", 0), vec![Some(9.0)]);
        assert_eq!(store.get(&key("d1", 0)).unwrap(), &[Some(9.0)]);
    }

    #[test]
    fn test_remove_date() {
        let mut store = RangeStore::new();
        store.extend(key("d1", 0), &[Some(1.0)]);
        store.extend(key("d1", 1), &[Some(2.0)]);
        store.extend(key("d2", 0), &[Some(3.0)]);
        assert!(store.has_date("d1"));

        store.remove_date("d1");
        assert!(!store.has_date("d1"));
        assert_eq!(store.len(), 1);
        assert!(store.get(&key("d2", 0)).is_some());
    }

    #[test]
    fn test_keys_are_ordered() {
        let mut store = RangeStore::new();
        store.extend(key("d2", 0), &[Some(1.0)]);
        store.extend(key("d1", 1), &[Some(1.0)]);
        store.extend(key("d1", 0), &[Some(1.0)]);
        let keys: Vec<_> = store.iter().map(|(k, _)| (k.date.clone(), k.number.clone())).collect();
        assert_eq!(
            keys,
            vec![
                ("d1".to_string(), Scalar::Int(0)),
                ("d1".to_string(), Scalar::Int(1)),
                ("d2".to_string(), Scalar::Int(0)),
            ]
        );
    }
}
