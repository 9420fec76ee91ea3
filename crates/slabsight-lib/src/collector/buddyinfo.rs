//! /proc/buddyinfo parsing

/// Parse buddyinfo into a free-page histogram indexed by order, summed
/// across all nodes and zones.
///
/// Each zone row reads `Node N, zone <name> c0 c1 ... c10`; the counts
/// start after the zone name.
pub fn parse_buddyinfo(content: &str) -> Vec<u64> {
    let mut orders: Vec<u64> = Vec::new();

    for line in content.lines() {
        if !line.contains("zone") {
            continue;
        }

        let counts = line
            .split_whitespace()
            .skip(4)
            .filter_map(|field| field.parse::<u64>().ok());

        for (order, count) in counts.enumerate() {
            if order < orders.len() {
                orders[order] += count;
            } else {
                orders.push(count);
            }
        }
    }

    orders
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUDDYINFO: &str = "\
Node 0, zone      DMA      1      1      1      0      2      1      1      0      1      1      3
Node 0, zone    DMA32      3      5      4      7      6      4      1      1      1      1    361
Node 0, zone   Normal    216    113     68     45     21     10      5      2      1      0      0
";

    #[test]
    fn sums_counts_across_zones() {
        let orders = parse_buddyinfo(BUDDYINFO);
        assert_eq!(orders.len(), 11);
        assert_eq!(orders[0], 1 + 3 + 216);
        assert_eq!(orders[2], 1 + 4 + 68);
        assert_eq!(orders[3], 0 + 7 + 45);
        assert_eq!(orders[10], 3 + 361);
    }

    #[test]
    fn lines_without_zone_are_ignored() {
        let orders = parse_buddyinfo("some header\n\n");
        assert!(orders.is_empty());
    }

    #[test]
    fn single_zone_passes_through() {
        let orders = parse_buddyinfo("Node 0, zone   Normal   10   20   30\n");
        assert_eq!(orders, vec![10, 20, 30]);
    }
}
