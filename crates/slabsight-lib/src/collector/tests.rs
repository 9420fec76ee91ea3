//! Integration tests for snapshot collection
//!
//! These tests run the collector against a fake proc tree so no real
//! kernel interfaces are needed.

#[cfg(test)]
mod fake_proc_tests {
    use crate::collector::{ProcCollector, SnapshotCollector};
    use std::path::PathBuf;
    use tempfile::TempDir;
    use tokio::fs;

    async fn create_fake_proc(temp_dir: &TempDir) -> PathBuf {
        let proc_root = temp_dir.path().to_path_buf();

        let slabinfo = "\
slabinfo - version: 2.1
# name            <active_objs> <num_objs> <objsize> <objperslab> <pagesperslab>
kmalloc-4096         406    424   4096    8    8 : tunables    0    0    0
kmalloc-1024        2385   2608   1024   16    4 : tunables    0    0    0
";
        fs::write(proc_root.join("slabinfo"), slabinfo).await.unwrap();

        let vmstat = "\
nr_free_pages 246921
nr_slab_unreclaimable 12473
slabs_scanned 184320
";
        fs::write(proc_root.join("vmstat"), vmstat).await.unwrap();

        let buddyinfo =
            "Node 0, zone   Normal    216    113     68     45     21     10      5      2      1      0      0\n";
        fs::write(proc_root.join("buddyinfo"), buddyinfo)
            .await
            .unwrap();

        proc_root
    }

    #[tokio::test]
    async fn collects_all_sources_from_fake_tree() {
        let temp_dir = TempDir::new().unwrap();
        let proc_root = create_fake_proc(&temp_dir).await;

        let collector = ProcCollector::with_proc_root(&proc_root);
        let snapshot = collector.collect().await.unwrap();

        assert!(snapshot.timestamp > 0);
        assert_eq!(snapshot.slab["kmalloc-1024"].active_objs, 2385);
        assert_eq!(snapshot.vmstat["nr_free_pages"], 246_921);
        assert_eq!(snapshot.free_pages_by_order.len(), 11);
        assert_eq!(snapshot.free_pages_by_order[0], 216);
        assert!(snapshot.metaspace.is_none());
    }

    #[tokio::test]
    async fn missing_sources_leave_groups_empty() {
        let temp_dir = TempDir::new().unwrap();
        let collector = ProcCollector::with_proc_root(temp_dir.path());

        let snapshot = collector.collect().await.unwrap();
        assert!(snapshot.slab.is_empty());
        assert!(snapshot.vmstat.is_empty());
        assert!(snapshot.free_pages_by_order.is_empty());
    }

    #[tokio::test]
    async fn partial_tree_still_collects_what_exists() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("vmstat"), "nr_free_pages 100\n")
            .await
            .unwrap();

        let collector = ProcCollector::with_proc_root(temp_dir.path());
        let snapshot = collector.collect().await.unwrap();

        assert!(snapshot.slab.is_empty());
        assert_eq!(snapshot.vmstat["nr_free_pages"], 100);
    }
}
