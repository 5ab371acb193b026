use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tally_core::{Dimensions, MetricDatum, MetricUnit, Result, TallyError};
use tracing::debug;

/// Point-in-time copy of an [`AggregateTable`], ordered by metric name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entries: Vec<MetricDatum>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, metric_name: &str) -> Option<&MetricDatum> {
        self.entries.iter().find(|d| d.metric_name == metric_name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetricDatum> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<MetricDatum> {
        self.entries
    }
}

impl From<Vec<MetricDatum>> for Snapshot {
    fn from(mut entries: Vec<MetricDatum>) -> Self {
        entries.sort_by(|a, b| a.metric_name.cmp(&b.metric_name));
        Self { entries }
    }
}

/// Running statistics keyed by metric name for one flush cycle.
///
/// The table is not synchronized; the owning recorder serializes access.
#[derive(Debug)]
pub struct AggregateTable {
    entries: HashMap<String, MetricDatum>,
    storage_resolution: u32,
}

impl AggregateTable {
    pub fn new(storage_resolution: u32) -> Self {
        Self {
            entries: HashMap::new(),
            storage_resolution,
        }
    }

    /// Folds one observation into the entry for `name`, creating it on first sight.
    ///
    /// `unit` and `dimensions` are only used when the entry is created; a
    /// later observation with another unit is summarized under the first one.
    pub fn absorb(
        &mut self,
        name: &str,
        value: f64,
        unit: MetricUnit,
        dimensions: &Dimensions,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if name.trim().is_empty() {
            return Err(TallyError::InvalidObservation(
                "metric name cannot be empty".to_string(),
            ));
        }
        if !value.is_finite() {
            return Err(TallyError::InvalidObservation(format!(
                "value for '{}' must be finite, got {}",
                name, value
            )));
        }

        match self.entries.get_mut(name) {
            Some(datum) => {
                if datum.unit != unit {
                    debug!(
                        metric = name,
                        recorded = %datum.unit,
                        observed = %unit,
                        "Unit differs from first observation, keeping recorded unit"
                    );
                }
                datum.statistic_values.absorb(value);
            }
            None => {
                debug!(metric = name, unit = %unit, "Starting new metric");
                let datum = MetricDatum::new(name, value, unit, dimensions.clone(), now)
                    .with_storage_resolution(self.storage_resolution);
                self.entries.insert(name.to_string(), datum);
            }
        }

        Ok(())
    }

    /// Returns every entry and leaves the table empty.
    pub fn take(&mut self) -> Snapshot {
        let entries: Vec<MetricDatum> = self.entries.drain().map(|(_, datum)| datum).collect();
        Snapshot::from(entries)
    }

    /// Non-destructive copy of the current entries.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from(self.entries.values().cloned().collect::<Vec<_>>())
    }

    /// Puts a previously taken snapshot back.
    ///
    /// Entries recorded since the snapshot are merged into the snapshot's
    /// entries, which keep their unit and timestamp.
    pub fn restore(&mut self, snapshot: Snapshot) {
        for mut earlier in snapshot.into_entries() {
            if let Some(later) = self.entries.remove(&earlier.metric_name) {
                earlier.merge(&later);
            }
            self.entries.insert(earlier.metric_name.clone(), earlier);
        }
    }

    pub fn get(&self, name: &str) -> Option<&MetricDatum> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AggregateTable {
    fn default() -> Self {
        Self::new(tally_core::DEFAULT_STORAGE_RESOLUTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_absorb_creates_then_merges() {
        let dims = Dimensions::for_scope("svc", None);
        let mut table = AggregateTable::default();

        table.absorb("latency", 12.0, MetricUnit::Duration, &dims, at(10)).unwrap();
        table.absorb("latency", 4.0, MetricUnit::Duration, &dims, at(20)).unwrap();
        table.absorb("latency", 30.0, MetricUnit::Duration, &dims, at(30)).unwrap();

        let datum = table.get("latency").unwrap();
        assert_eq!(datum.statistic_values.sample_count, 3);
        assert_eq!(datum.statistic_values.sum, 46.0);
        assert_eq!(datum.statistic_values.minimum, 4.0);
        assert_eq!(datum.statistic_values.maximum, 30.0);
        assert_eq!(datum.timestamp, at(10));
        assert_eq!(datum.storage_resolution, 60);
        assert!(datum.dimensions.shares_storage_with(&dims));
    }

    #[test]
    fn test_first_unit_wins() {
        let dims = Dimensions::for_scope("svc", None);
        let mut table = AggregateTable::default();

        table.absorb("mixed", 1.0, MetricUnit::Count, &dims, at(0)).unwrap();
        table.absorb("mixed", 250.0, MetricUnit::Duration, &dims, at(1)).unwrap();

        let datum = table.get("mixed").unwrap();
        assert_eq!(datum.unit, MetricUnit::Count);
        assert_eq!(datum.statistic_values.sample_count, 2);
        assert_eq!(datum.statistic_values.maximum, 250.0);
    }

    #[test]
    fn test_rejects_malformed_observations() {
        let dims = Dimensions::for_scope("svc", None);
        let mut table = AggregateTable::default();
        table.absorb("ok", 1.0, MetricUnit::Count, &dims, at(0)).unwrap();

        for (name, value) in [
            ("", 1.0),
            ("   ", 1.0),
            ("ok", f64::NAN),
            ("ok", f64::INFINITY),
            ("ok", f64::NEG_INFINITY),
        ] {
            let err = table
                .absorb(name, value, MetricUnit::Count, &dims, at(0))
                .unwrap_err();
            assert!(matches!(err, TallyError::InvalidObservation(_)));
        }

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("ok").unwrap().statistic_values.sample_count, 1);
    }

    #[test]
    fn test_take_empties_table() {
        let dims = Dimensions::for_scope("svc", None);
        let mut table = AggregateTable::default();
        table.absorb("b", 2.0, MetricUnit::Count, &dims, at(0)).unwrap();
        table.absorb("a", 1.0, MetricUnit::Count, &dims, at(0)).unwrap();

        let snapshot = table.take();
        assert_eq!(snapshot.len(), 2);
        let names: Vec<_> = snapshot.iter().map(|d| d.metric_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(table.is_empty());

        assert!(table.take().is_empty());
    }

    #[test]
    fn test_restore_merges_later_observations() {
        let dims = Dimensions::for_scope("svc", None);
        let mut table = AggregateTable::default();
        table.absorb("hits", 1.0, MetricUnit::Count, &dims, at(10)).unwrap();
        table.absorb("hits", 1.0, MetricUnit::Count, &dims, at(11)).unwrap();
        table.absorb("only_before", 5.0, MetricUnit::Duration, &dims, at(12)).unwrap();

        let snapshot = table.take();

        table.absorb("hits", 3.0, MetricUnit::Count, &dims, at(50)).unwrap();
        table.absorb("only_after", 7.0, MetricUnit::Count, &dims, at(51)).unwrap();

        table.restore(snapshot);

        assert_eq!(table.len(), 3);
        let hits = table.get("hits").unwrap();
        assert_eq!(hits.statistic_values.sample_count, 3);
        assert_eq!(hits.statistic_values.sum, 5.0);
        assert_eq!(hits.statistic_values.maximum, 3.0);
        assert_eq!(hits.timestamp, at(10));
        assert_eq!(table.get("only_before").unwrap().statistic_values.sum, 5.0);
        assert_eq!(table.get("only_after").unwrap().timestamp, at(51));
    }

    #[test]
    fn test_snapshot_is_not_destructive() {
        let dims = Dimensions::for_scope("svc", None);
        let mut table = AggregateTable::new(tally_core::HIGH_STORAGE_RESOLUTION);
        table.absorb("a", 1.0, MetricUnit::Count, &dims, at(0)).unwrap();

        let snapshot = table.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("a").unwrap().storage_resolution, 1);
        assert_eq!(table.len(), 1);
    }
}
