//! Axis bookkeeping for a walk.
//!
//! `Fields` keeps two views of every slicing axis. The *active* view is
//! scoped to the branch being walked and drives leaf slicing; it is saved
//! when entering a node and restored when leaving it. The *discovered* view
//! is the insertion-ordered union of everything seen during the walk and is
//! what the assembler lays out.

use crate::scalar::Scalar;
use crate::tree::AxisKind;

/// Cardinality-1 default for an axis not present on the current branch.
static DEFAULT_AXIS: [Scalar; 1] = [Scalar::Int(0)];

/// Branch-scoped axis state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActiveAxes {
    /// Date keys of the branch; a date node may select several.
    pub dates: Vec<String>,
    pub levels: Option<Vec<Scalar>>,
    pub numbers: Option<Vec<Scalar>>,
    pub params: Option<Vec<Scalar>>,
    pub steps: Option<Vec<Scalar>>,
    /// Representative latitude of the branch (most recently seen).
    pub latitude: Option<f64>,
}

impl ActiveAxes {
    /// Active values of a slicing axis, defaulting to `[0]`.
    pub fn values(&self, kind: AxisKind) -> &[Scalar] {
        let slot = match kind {
            AxisKind::Level => &self.levels,
            AxisKind::Number => &self.numbers,
            AxisKind::Param => &self.params,
            AxisKind::Step => &self.steps,
            _ => return &DEFAULT_AXIS,
        };
        slot.as_deref().unwrap_or(&DEFAULT_AXIS[..])
    }

    pub fn has_params(&self) -> bool {
        self.params.as_ref().is_some_and(|p| !p.is_empty())
    }
}

/// Axis state accumulated over one walk.
#[derive(Debug, Clone, Default)]
pub struct Fields {
    active: ActiveAxes,
    dates: Vec<String>,
    levels: Vec<Scalar>,
    numbers: Vec<Scalar>,
    params: Vec<Scalar>,
    steps: Vec<Scalar>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &ActiveAxes {
        &self.active
    }

    /// Snapshot of the active state, restored with [`Fields::restore`].
    pub fn snapshot(&self) -> ActiveAxes {
        self.active.clone()
    }

    pub fn restore(&mut self, saved: ActiveAxes) {
        self.active = saved;
    }

    /// Replace the active list of a slicing axis and merge it into the
    /// discovered list. Empty lists are ignored.
    pub fn set_axis(&mut self, kind: AxisKind, values: &[Scalar]) {
        if values.is_empty() {
            return;
        }
        let (active, discovered) = match kind {
            AxisKind::Level => (&mut self.active.levels, &mut self.levels),
            AxisKind::Number => (&mut self.active.numbers, &mut self.numbers),
            AxisKind::Param => (&mut self.active.params, &mut self.params),
            AxisKind::Step => (&mut self.active.steps, &mut self.steps),
            _ => return,
        };
        *active = Some(values.to_vec());
        for value in values {
            if !discovered.contains(value) {
                discovered.push(value.clone());
            }
        }
    }

    /// Make `keys` the active dates and record them as discovered.
    /// An empty list leaves the active dates untouched.
    pub fn set_dates(&mut self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        for key in keys {
            self.discover_date(key);
        }
        self.active.dates = keys.to_vec();
    }

    pub fn discover_date(&mut self, key: &str) {
        if !self.dates.iter().any(|d| d == key) {
            self.dates.push(key.to_string());
        }
    }

    /// Keep only the discovered dates matching `keep`, in discovery order.
    pub fn retain_dates(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.dates.retain(|d| keep(d));
    }

    pub fn set_latitude(&mut self, lat: f64) {
        self.active.latitude = Some(lat);
    }

    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    pub fn levels(&self) -> &[Scalar] {
        &self.levels
    }

    pub fn numbers(&self) -> &[Scalar] {
        &self.numbers
    }

    pub fn params(&self) -> &[Scalar] {
        &self.params
    }

    pub fn steps(&self) -> &[Scalar] {
        &self.steps
    }

    /// Whether any param was discovered during the walk.
    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Scalar> {
        values.iter().map(|v| Scalar::Int(*v)).collect()
    }

    #[test]
    fn test_absent_axis_defaults_to_singleton() {
        let fields = Fields::new();
        assert_eq!(fields.active().values(AxisKind::Level), &[Scalar::Int(0)]);
        assert_eq!(fields.active().values(AxisKind::Step).len(), 1);
        assert!(fields.levels().is_empty());
    }

    #[test]
    fn test_discovered_keeps_insertion_order() {
        let mut fields = Fields::new();
        fields.set_axis(AxisKind::Number, &ints(&[3, 1]));
        fields.set_axis(AxisKind::Number, &ints(&[1, 2]));
        assert_eq!(fields.numbers(), ints(&[3, 1, 2]).as_slice());
        assert_eq!(fields.active().values(AxisKind::Number), ints(&[1, 2]).as_slice());
    }

    #[test]
    fn test_snapshot_restores_branch_scope() {
        let mut fields = Fields::new();
        let saved = fields.snapshot();
        fields.set_axis(AxisKind::Level, &ints(&[500, 850]));
        fields.set_dates(&["2017-01-01T00:00:00Z".to_string()]);
        fields.set_latitude(50.0);
        assert_eq!(fields.active().values(AxisKind::Level).len(), 2);

        fields.restore(saved);
        assert_eq!(fields.active().values(AxisKind::Level), &[Scalar::Int(0)]);
        assert!(fields.active().dates.is_empty());
        assert!(fields.active().latitude.is_none());
        // Discovery survives the restore.
        assert_eq!(fields.levels().len(), 2);
        assert_eq!(fields.dates(), &["2017-01-01T00:00:00Z".to_string()]);
    }

    #[test]
    fn test_empty_values_ignored() {
        let mut fields = Fields::new();
        fields.set_axis(AxisKind::Param, &[]);
        assert!(!fields.has_params());
        assert!(!fields.active().has_params());
    }

    #[test]
    fn test_several_active_dates() {
        let mut fields = Fields::new();
        fields.set_dates(&["a".to_string(), "b".to_string()]);
        fields.set_dates(&[]);
        assert_eq!(fields.active().dates, vec!["a".to_string(), "b".to_string()]);

        fields.discover_date("c");
        fields.discover_date("a");
        assert_eq!(fields.dates(), &["a".to_string(), "b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_retain_dates_keeps_order() {
        let mut fields = Fields::new();
        for key in ["a", "b", "c"] {
            fields.discover_date(key);
        }
        fields.retain_dates(|d| d != "b");
        assert_eq!(fields.dates(), &["a".to_string(), "c".to_string()]);
    }
}
