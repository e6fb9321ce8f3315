//! Geographic coordinates gathered during a walk, and tolerance helpers.

use std::collections::HashMap;

/// Coordinates seen under one date key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateCoordinates {
    /// `[latitude, longitude]` pairs in leaf-visit order.
    pub composite: Vec<[f64; 2]>,
    /// Temporal labels for the date.
    pub t: Vec<String>,
}

impl DateCoordinates {
    /// Latitudes merged within `tolerance`, in first-seen order.
    pub fn latitudes(&self, tolerance: f64) -> Vec<f64> {
        dedup_within(self.composite.iter().map(|p| p[0]), tolerance)
    }

    /// Longitudes merged within `tolerance`, in first-seen order.
    pub fn longitudes(&self, tolerance: f64) -> Vec<f64> {
        dedup_within(self.composite.iter().map(|p| p[1]), tolerance)
    }
}

/// Per-date coordinate lists, in the order dates were first seeded.
#[derive(Debug, Clone, Default)]
pub struct CoordinateAccumulator {
    entries: Vec<(String, DateCoordinates)>,
    index: HashMap<String, usize>,
}

impl CoordinateAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the entry for `date` with `t = [date]` unless it exists.
    pub fn seed(&mut self, date: &str) {
        if self.index.contains_key(date) {
            return;
        }
        self.index.insert(date.to_string(), self.entries.len());
        self.entries.push((
            date.to_string(),
            DateCoordinates {
                composite: Vec::new(),
                t: vec![date.to_string()],
            },
        ));
    }

    /// Append a point under `date`, seeding the entry when needed.
    pub fn push(&mut self, date: &str, lat: f64, lon: f64) {
        self.seed(date);
        if let Some(&idx) = self.index.get(date) {
            self.entries[idx].1.composite.push([lat, lon]);
        }
    }

    pub fn get(&self, date: &str) -> Option<&DateCoordinates> {
        self.index.get(date).map(|&idx| &self.entries[idx].1)
    }

    /// Whether any point has been recorded under `date`.
    pub fn has_points(&self, date: &str) -> bool {
        self.get(date).is_some_and(|c| !c.composite.is_empty())
    }

    pub fn remove(&mut self, date: &str) -> Option<DateCoordinates> {
        let idx = self.index.remove(date)?;
        let (_, removed) = self.entries.remove(idx);
        for slot in self.index.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(d, _)| d.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DateCoordinates)> {
        self.entries.iter().map(|(d, c)| (d.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Push `value` unless a kept value lies within `tolerance` of it.
///
/// Returns whether the value was kept. Values differing by exactly
/// `tolerance` are merged.
pub fn push_if_not_close(kept: &mut Vec<f64>, value: f64, tolerance: f64) -> bool {
    if kept.iter().any(|k| (k - value).abs() <= tolerance) {
        return false;
    }
    kept.push(value);
    true
}

/// First-seen representatives of `values` merged within `tolerance`.
pub fn dedup_within(values: impl IntoIterator<Item = f64>, tolerance: f64) -> Vec<f64> {
    let mut kept = Vec::new();
    for value in values {
        push_if_not_close(&mut kept, value, tolerance);
    }
    kept
}

/// Index of the kept value closest to `value`, if within `tolerance`.
pub fn nearest_within(kept: &[f64], value: f64, tolerance: f64) -> Option<usize> {
    kept.iter()
        .enumerate()
        .map(|(i, k)| (i, (k - value).abs()))
        .filter(|(_, d)| *d <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_does_not_wipe() {
        let mut coords = CoordinateAccumulator::new();
        coords.seed("d1");
        coords.push("d1", 50.0, 1.0);
        coords.seed("d1");
        assert_eq!(coords.get("d1").unwrap().composite, vec![[50.0, 1.0]]);
        assert_eq!(coords.get("d1").unwrap().t, vec!["d1".to_string()]);
    }

    #[test]
    fn test_insertion_order_and_remove() {
        let mut coords = CoordinateAccumulator::new();
        coords.seed("b");
        coords.seed("a");
        coords.push("c", 1.0, 2.0);
        assert_eq!(coords.dates().collect::<Vec<_>>(), vec!["b", "a", "c"]);

        assert!(coords.remove("a").is_some());
        assert!(coords.remove("a").is_none());
        assert_eq!(coords.dates().collect::<Vec<_>>(), vec!["b", "c"]);
        assert!(coords.has_points("c"));
        assert!(!coords.has_points("b"));
        coords.push("c", 3.0, 4.0);
        assert_eq!(coords.get("c").unwrap().composite.len(), 2);
    }

    #[test]
    fn test_per_axis_tolerance() {
        let mut coords = CoordinateAccumulator::new();
        coords.push("d", 1.000, 50.000);
        coords.push("d", 1.005, 50.003);
        coords.push("d", 1.02, 50.00);
        let entry = coords.get("d").unwrap();
        assert_eq!(entry.latitudes(0.01), vec![1.000, 1.02]);
        assert_eq!(entry.longitudes(0.01), vec![50.000]);
    }

    #[test]
    fn test_push_if_not_close() {
        let mut kept = vec![];
        assert!(push_if_not_close(&mut kept, 0.0, 0.01));
        assert!(!push_if_not_close(&mut kept, 0.009, 0.01));
        assert!(push_if_not_close(&mut kept, 0.5, 0.01));
        assert_eq!(kept, vec![0.0, 0.5]);
    }

    #[test]
    fn test_nearest_within() {
        let kept = [0.0, 0.5, 1.0];
        assert_eq!(nearest_within(&kept, 0.504, 0.01), Some(1));
        assert_eq!(nearest_within(&kept, 0.3, 0.01), None);
        assert_eq!(nearest_within(&kept, 1.0, 0.0), Some(2));
    }
}
