//! /proc/slabinfo parsing

use std::collections::BTreeMap;

use crate::models::SlabStats;

/// Parse slabinfo text into per-cache statistics.
///
/// The file opens with a version banner and a `# name ...` column header;
/// both are skipped, as is any row that does not carry the first four
/// numeric columns (name, active_objs, num_objs, objsize).
pub fn parse_slabinfo(content: &str) -> BTreeMap<String, SlabStats> {
    let mut caches = BTreeMap::new();

    for line in content.lines() {
        if line.starts_with('#') || line.starts_with("slabinfo") {
            continue;
        }

        let mut fields = line.split_whitespace();
        let name = match fields.next() {
            Some(name) => name,
            None => continue,
        };

        let numbers: Vec<u64> = fields.take(3).filter_map(|f| f.parse().ok()).collect();
        if numbers.len() < 3 {
            continue;
        }

        caches.insert(
            name.to_string(),
            SlabStats {
                active_objs: numbers[0],
                num_objs: numbers[1],
                obj_size: numbers[2],
            },
        );
    }

    caches
}
