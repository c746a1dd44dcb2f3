use super::*;
use std::fs;
use std::path::{Path, PathBuf};

fn collect_relative_paths(walker: TreeWalker) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for entry in walker {
        let entry = entry.expect("walker entry");
        if entry.is_root() {
            continue;
        }
        paths.push(entry.relative_path().to_path_buf());
    }
    paths
}

#[test]
fn walk_errors_when_root_missing() {
    let error = match TreeWalkBuilder::new("/nonexistent/archive/root").build() {
        Ok(_) => panic!("missing root should fail"),
        Err(error) => error,
    };
    assert!(matches!(error.kind(), WalkErrorKind::RootMetadata { .. }));
    assert_eq!(error.path(), Path::new("/nonexistent/archive/root"));
}

#[test]
fn walk_single_file_emits_root_entry() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = temp.path().join("case.cpl.r.0001-01-01-00000.nc");
    fs::write(&file, b"contents").expect("write");

    let mut walker = TreeWalkBuilder::new(&file).build().expect("build walker");
    let entry = walker.next().expect("entry").expect("entry ok");
    assert!(entry.is_root());
    assert_eq!(entry.kind(), EntryKind::File);
    assert!(entry.file_name().is_none());
    assert!(walker.next().is_none());
}

#[test]
fn walk_directory_yields_deterministic_order() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("archive");
    fs::create_dir_all(root.join("rest/0001-01-02-00000")).expect("rest");
    fs::create_dir_all(root.join("atm/hist")).expect("hist");
    fs::write(root.join("atm/hist/b.nc"), b"b").expect("b");
    fs::write(root.join("atm/hist/a.nc"), b"a").expect("a");
    fs::write(root.join("rest/0001-01-02-00000/rpointer.atm"), b"p").expect("pointer");

    let walker = TreeWalkBuilder::new(&root).build().expect("build walker");
    assert_eq!(
        collect_relative_paths(walker),
        vec![
            PathBuf::from("atm"),
            PathBuf::from("atm/hist"),
            PathBuf::from("atm/hist/a.nc"),
            PathBuf::from("atm/hist/b.nc"),
            PathBuf::from("rest"),
            PathBuf::from("rest/0001-01-02-00000"),
            PathBuf::from("rest/0001-01-02-00000/rpointer.atm"),
        ]
    );
}

#[test]
fn max_depth_limits_descent() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("archive");
    fs::create_dir_all(root.join("atm/hist")).expect("hist");
    fs::write(root.join("top.txt"), b"t").expect("top");

    let entries = top_level_entries(&root).expect("top level");
    let names: Vec<_> = entries
        .iter()
        .map(|entry| entry.relative_path().to_path_buf())
        .collect();
    assert_eq!(names, vec![PathBuf::from("atm"), PathBuf::from("top.txt")]);
    assert!(entries.iter().all(|entry| entry.depth() == 1));
}

#[test]
fn list_files_skips_directories() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("archive");
    fs::create_dir_all(root.join("lnd/logs")).expect("logs");
    fs::create_dir_all(root.join("empty")).expect("empty");
    fs::write(root.join("lnd/logs/lnd.log.1"), b"log").expect("log");

    assert_eq!(
        list_files(&root).expect("list"),
        vec![root.join("lnd/logs/lnd.log.1")]
    );
}

#[cfg(unix)]
#[test]
fn symlinks_are_reported_but_not_followed() {
    use std::os::unix::fs::symlink;

    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("archive");
    let outside = temp.path().join("outside");
    fs::create_dir(&root).expect("root");
    fs::create_dir(&outside).expect("outside");
    fs::write(outside.join("secret.nc"), b"x").expect("secret");
    symlink(&outside, root.join("link")).expect("symlink");

    let walker = TreeWalkBuilder::new(&root)
        .include_root(false)
        .build()
        .expect("build");
    let entries: Vec<_> = walker.map(|entry| entry.expect("entry")).collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind(), EntryKind::Symlink);
    assert_eq!(entries[0].relative_path(), Path::new("link"));
}
