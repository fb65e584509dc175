use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use dirsnap::{
    compare::render_all, CompareOptions, Comparison, NameFilter, PathPair, Snapshot,
    SnapshotCollection, SnapshotStore, TreeComparison, MARKER_FILE,
};

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("file has a parent")).expect("Failed to create dirs");
    fs::write(path, content).expect("Failed to write test file");
}

/// Snapshot of every file and directory below `root`, keyed by relative path.
fn tree_shape(root: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Option<Vec<u8>>>) {
        for entry in fs::read_dir(dir).expect("Failed to list dir") {
            let path = entry.expect("Failed to read entry").path();
            let rel = path.strip_prefix(root).unwrap().to_path_buf();
            if path.is_dir() {
                out.insert(rel, None);
                walk(root, &path, out);
            } else {
                out.insert(rel, Some(fs::read(&path).unwrap()));
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

fn compare_trees(received: &Path, snapshot: &Path) -> TreeComparison {
    TreeComparison::new(PathPair::new(received, snapshot), &NameFilter::default())
        .expect("Failed to compare trees")
}

fn store(location: &Path, name: &str, source: &Path) -> PathBuf {
    SnapshotStore::write_snapshot(location, &Snapshot::new(name, source))
        .expect("Failed to write snapshot")
}

fn sample_tree(root: &Path) {
    write(root, "root.file", b"root\n");
    write(root, "sub/some.file", b"some\ncontent\n");
    write(root, "sub/nested/another.file", b"nested\n");
    write(root, "bin/data.bin", &[0, 159, 146, 150]);
    fs::create_dir_all(root.join("empty/deeper")).unwrap();
}

#[test]
fn test_write_then_compare_reports_no_difference() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let received = temp.path().join("received");
    sample_tree(&received);

    let location = temp.path().join("__snapshots__");
    let mut collection = SnapshotCollection::new(&location);
    collection.add(Snapshot::new("test_tree", &received));
    SnapshotStore::write(&collection).expect("Failed to write snapshot");

    let stored = SnapshotStore::read(&location, "test_tree").expect("snapshot should exist");
    let cmp = Comparison::new(&received, &stored, &CompareOptions::default()).unwrap();

    assert!(!cmp.is_different().unwrap());
    assert_eq!(cmp.diff_lines().count(), 0);
}

#[test]
fn test_file_snapshot_round_trip() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let received = temp.path().join("output.json");
    fs::write(&received, "{}\n").unwrap();

    let location = temp.path().join("snaps");
    SnapshotStore::write_snapshot(&location, &Snapshot::new("test_file", &received)).unwrap();

    let stored = SnapshotStore::read(&location, "test_file").unwrap();
    let cmp = Comparison::new(&received, &stored, &CompareOptions::default()).unwrap();
    assert!(!cmp.is_different().unwrap());
}

#[test]
fn test_writing_twice_is_idempotent() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let received = temp.path().join("received");
    sample_tree(&received);

    let first = store(&temp.path().join("one"), "s", &received);
    let first_shape = tree_shape(&first);

    let second = store(&temp.path().join("two"), "s", &received);
    assert_eq!(tree_shape(&second), first_shape);

    store(&temp.path().join("one"), "s", &received);
    assert_eq!(tree_shape(&first), first_shape);
}

#[test]
fn test_empty_directory_law() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let received = temp.path().join("received");
    write(&received, "keep.txt", b"k\n");
    fs::create_dir_all(received.join("d")).unwrap();

    let stored = store(&temp.path().join("snaps"), "case", &received);

    let entries: Vec<String> = fs::read_dir(stored.join("d"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec![MARKER_FILE.to_string()]);
    assert_eq!(fs::metadata(stored.join("d").join(MARKER_FILE)).unwrap().len(), 0);

    let tree = compare_trees(&received, &stored);
    assert!(!tree.is_different());
    assert!(!tree.subdirs()["d"].is_different());
}

#[test]
fn test_empty_received_vs_populated_snapshot_differs() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let received = temp.path().join("received");
    fs::create_dir_all(&received).unwrap();
    let snapshot = temp.path().join("snapshot");
    write(&snapshot, "file", b"content\n");

    let tree = compare_trees(&received, &snapshot);
    assert!(tree.is_different());
    assert_eq!(
        render_all(&tree).unwrap(),
        vec!["+++ N/A".to_string(), "--- missing: <snapshot>/file".to_string()]
    );
}

#[test]
fn test_added_file_scenario() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let received = temp.path().join("received");
    let snapshot = temp.path().join("snapshot");
    write(&received, "a.txt", b"hi\n");
    write(&received, "b.txt", b"x");
    write(&snapshot, "a.txt", b"hi\n");

    let tree = compare_trees(&received, &snapshot);
    assert!(tree.is_different());
    assert_eq!(tree.left_only(), ["b.txt"]);
    assert!(tree.diff_files().is_empty());
    assert_eq!(
        render_all(&tree).unwrap(),
        vec!["+++ added: <received>/b.txt".to_string(), "--- N/A".to_string()]
    );
}

#[test]
fn test_binary_same_size_renders_single_line() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let received = temp.path().join("received");
    let snapshot = temp.path().join("snapshot");
    write(&received, "file.bin", &[0x90]);
    write(&snapshot, "file.bin", &[0x91]);

    let tree = compare_trees(&received, &snapshot);
    let lines = render_all(&tree).unwrap();

    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("binary files content differs"));
}

#[test]
fn test_word_marks_in_tree_diff() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let received = temp.path().join("received");
    let snapshot = temp.path().join("snapshot");
    write(&received, "conf.yaml", b"key: value\nother: changed value\nlast: new value\n");
    write(&snapshot, "conf.yaml", b"key: value\nother: value\nlast: old value\n");

    let tree = compare_trees(&received, &snapshot);
    let lines = render_all(&tree).unwrap();

    assert_eq!(lines[0], "--- <snapshot>/conf.yaml");
    assert_eq!(lines[1], "+++ <received>/conf.yaml");
    assert_eq!(lines[2], "@@ -1,3 +1,3 @@");
    assert_eq!(lines[3], " key: value");
    assert!(lines.contains(&"-last: [-old-] value".to_string()));
    assert!(lines.contains(&"+last: {+new+} value".to_string()));
}

#[test]
fn test_diff_order_is_stable() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let received = temp.path().join("received");
    let snapshot = temp.path().join("snapshot");
    for name in ["zeta", "alpha", "mid"] {
        write(&received, &format!("{}/changed.txt", name), b"new\n");
        write(&snapshot, &format!("{}/changed.txt", name), b"old\n");
        write(&received, &format!("{}.added", name), b"a\n");
    }

    let options = CompareOptions::default();
    let runs: Vec<Vec<String>> = (0..3)
        .map(|_| {
            let cmp = Comparison::new(&received, &snapshot, &options).unwrap();
            cmp.diff_lines().collect::<dirsnap::Result<Vec<_>>>().unwrap()
        })
        .collect();

    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[1], runs[2]);

    let added: Vec<&String> = runs[0].iter().filter(|l| l.contains("added:")).collect();
    assert_eq!(added.len(), 3);
    assert!(added[0].ends_with("alpha.added"));
    assert!(added[2].ends_with("zeta.added"));
}

#[test]
fn test_hidden_entries_are_not_compared() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let received = temp.path().join("received");
    let snapshot = temp.path().join("snapshot");
    write(&received, ".git/HEAD", b"ref\n");
    write(&received, "src/lib.rs", b"\n");
    write(&snapshot, "src/lib.rs", b"\n");
    write(&snapshot, "src/cache.pyc", b"junk");

    let filter = NameFilter::new(&["*.pyc"], dirsnap::DEFAULT_HIDE).unwrap();
    let tree = TreeComparison::new(PathPair::new(&received, &snapshot), &filter).unwrap();
    assert!(!tree.is_different());
}

#[test]
fn test_delete_after_write() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let received = temp.path().join("received");
    sample_tree(&received);

    let location = temp.path().join("snaps");
    let stored = store(&location, "stale", &received);
    assert!(SnapshotStore::read(&location, "stale").is_some());

    SnapshotStore::delete(&stored, &["stale"]).unwrap();
    assert!(SnapshotStore::read(&location, "stale").is_none());
    assert!(SnapshotStore::delete(&stored, &["stale"]).is_err());
}

#[test]
fn test_missing_final_newline_renders_whole_lines() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let received = temp.path().join("received");
    let snapshot = temp.path().join("snapshot");
    write(&received, "f", b"a\r\nfoo\n");
    write(&snapshot, "f", b"a\r\nfoo");

    let lines = render_all(&compare_trees(&received, &snapshot)).unwrap();

    assert_eq!(lines[3], " a");
    assert_eq!(lines[4], "-foo");
    assert_eq!(lines[5], "+foo");
    assert!(lines.iter().all(|line| !line.contains(['\n', '\r'])));
}
