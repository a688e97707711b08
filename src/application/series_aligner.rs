// Series aligner - Puts every sensor's readings on one shared timeline
// Timeline order is first appearance across all sensors, not chronological.

use crate::domain::chart::Series;
use crate::domain::reading::Reading;
use std::collections::{HashMap, HashSet};

/// Groups readings by sensor id. Groups are returned in first-appearance order
/// and each keeps its readings in input order.
pub fn group_by_sensor(readings: &[Reading]) -> Vec<(String, Vec<&Reading>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&Reading>)> = Vec::new();

    for reading in readings {
        let slot = *index.entry(reading.id.as_str()).or_insert_with(|| {
            groups.push((reading.id.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(reading);
    }

    groups
}

/// Distinct formatted timestamps, in order of first appearance.
pub fn build_timeline(readings: &[Reading]) -> Vec<String> {
    let mut seen = HashSet::new();
    readings
        .iter()
        .map(Reading::timeline_key)
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

/// Aligns every sensor onto the global timeline.
///
/// A slot takes the value of the sensor's first reading whose formatted
/// timestamp equals the slot. Anything else is `None`.
pub fn align(readings: &[Reading]) -> (Vec<String>, Vec<Series>) {
    let timeline = build_timeline(readings);

    let series = group_by_sensor(readings)
        .into_iter()
        .map(|(sensor_id, group)| {
            let mut by_key: HashMap<String, f64> = HashMap::with_capacity(group.len());
            for reading in group {
                by_key.entry(reading.timeline_key()).or_insert(reading.value);
            }

            let values = timeline.iter().map(|key| by_key.get(key).copied()).collect();
            Series::new(sensor_id, values)
        })
        .collect();

    (timeline, series)
}

/// Positional variant: slot `i` takes the sensor's `i`-th reading, ignoring
/// its timestamp. Only kept to document how it diverges from [`align`].
#[cfg(test)]
pub fn align_per_sensor(readings: &[Reading]) -> (Vec<String>, Vec<Series>) {
    let timeline = build_timeline(readings);

    let series = group_by_sensor(readings)
        .into_iter()
        .map(|(sensor_id, group)| {
            let values = (0..timeline.len())
                .map(|i| group.get(i).map(|r| r.value))
                .collect();
            Series::new(sensor_id, values)
        })
        .collect();

    (timeline, series)
}
