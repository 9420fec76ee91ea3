//! /proc/vmstat parsing

use std::collections::BTreeMap;

/// Parse vmstat's `name value` pairs. Every counter is retained; the
/// engine decides which ones matter.
pub fn parse_vmstat(content: &str) -> BTreeMap<String, u64> {
    let mut counters = BTreeMap::new();

    for line in content.lines() {
        let mut fields = line.split_whitespace();
        if let (Some(name), Some(value)) = (fields.next(), fields.next()) {
            if let Ok(value) = value.parse::<u64>() {
                counters.insert(name.to_string(), value);
            }
        }
    }

    counters
}

#[cfg(test)]
mod tests {
    use super::*;

    const VMSTAT: &str = "\
nr_free_pages 246921
nr_slab_reclaimable 18167
nr_slab_unreclaimable 12473
slabs_scanned 184320
pgalloc_dma 1024
pgsteal_kswapd 55110
";

    #[test]
    fn parses_all_counters() {
        let counters = parse_vmstat(VMSTAT);
        assert_eq!(counters.len(), 6);
        assert_eq!(counters["nr_free_pages"], 246_921);
        assert_eq!(counters["slabs_scanned"], 184_320);
        assert_eq!(counters["pgalloc_dma"], 1_024);
    }

    #[test]
    fn non_numeric_lines_are_dropped() {
        let counters = parse_vmstat("nr_free_pages abc\nnr_dirty 17\n");
        assert_eq!(counters.len(), 1);
        assert_eq!(counters["nr_dirty"], 17);
    }
}
