//! Bus regions as used by the availability computation.

use profgen_core::Bus;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Merge buses that share a `shape_id` into one region.
///
/// Coordinates are averaged; name, country and geometry come from the first
/// bus of each group. Groups are ordered by `shape_id`. Buses without a
/// `shape_id` belong to no group and are returned separately.
pub fn cluster_by_shape(buses: Vec<Bus>) -> (Vec<Bus>, Vec<Bus>) {
    let mut groups: BTreeMap<String, (Bus, usize)> = BTreeMap::new();
    let mut unassigned = Vec::new();

    for bus in buses {
        let Some(id) = bus.shape_id.clone() else {
            unassigned.push(bus);
            continue;
        };
        match groups.entry(id) {
            Entry::Occupied(mut entry) => {
                let (first, count) = entry.get_mut();
                first.x += bus.x;
                first.y += bus.y;
                *count += 1;
            }
            Entry::Vacant(entry) => {
                entry.insert((bus, 1));
            }
        }
    }

    let merged = groups
        .into_values()
        .map(|(mut bus, count)| {
            bus.x /= count as f64;
            bus.y /= count as f64;
            bus
        })
        .collect();
    (merged, unassigned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::MultiPolygon;

    fn bus(name: &str, x: f64, y: f64, shape: Option<&str>) -> Bus {
        Bus {
            name: name.into(),
            x,
            y,
            country: "NG".into(),
            shape_id: shape.map(str::to_string),
            geometry: MultiPolygon::new(vec![]),
        }
    }

    #[test]
    fn groups_average_coordinates() {
        let (merged, unassigned) = cluster_by_shape(vec![
            bus("a", 0.0, 0.0, Some("s2")),
            bus("b", 5.0, 5.0, None),
            bus("c", 2.0, 4.0, Some("s2")),
            bus("d", 1.0, 1.0, Some("s1")),
        ]);
        let names: Vec<_> = merged.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["d", "a"]);
        assert_eq!((merged[1].x, merged[1].y), (1.0, 2.0));
        assert_eq!((merged[0].x, merged[0].y), (1.0, 1.0));
        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].name, "b");
    }

    #[test]
    fn buses_without_shape_are_left_out() {
        let (merged, unassigned) =
            cluster_by_shape(vec![bus("a", 0.0, 0.0, None), bus("b", 1.0, 1.0, None)]);
        assert!(merged.is_empty());
        assert_eq!(unassigned.len(), 2);
    }
}
