//! End-to-end tests of the stage and package steps.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use distpack_core::ArchiveBuilder;
use distpack_core::CopySpec;
use distpack_core::ExclusionRule;
use distpack_core::PackConfig;
use distpack_core::PackError;
use distpack_core::Packager;
use distpack_core::ProjectMetadata;
use distpack_core::Stager;
use distpack_core::manifest::load_manifest;
use std::collections::BTreeMap;
use std::fs;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;
use walkdir::WalkDir;
use zip::ZipArchive;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).expect("failed to create parent");
    fs::write(path, content).expect("failed to write file");
}

/// A transpiled plugin project with every default item present.
fn plugin_project() -> TempDir {
    let temp = TempDir::new().expect("failed to create temp dir");
    let root = temp.path();
    write(root, "index.js", "module.exports = require('./views')");
    write(root, "index.es", "export * from './views'");
    write(root, "views/index.js", "view");
    write(root, "views/index.es", "view source");
    write(root, "views/.DS_Store", "junk");
    write(root, "views/parts/list.js", "list");
    write(root, "utils/format.js", "format");
    write(root, "utils/node_modules/dep/index.js", "vendored");
    write(root, "services/api.js", "api");
    write(root, "i18n/en-US.json", "{}");
    write(root, "i18n/ja-JP.json", "{}");
    write(root, "assets/icon.svg", "<svg/>");
    write(
        root,
        "package.json",
        r#"{
  "name": "poi-plugin-sample",
  "version": "1.2.3",
  "description": "Sample plugin",
  "main": "index.js",
  "scripts": { "build": "node scripts/build.js" },
  "devDependencies": { "eslint": "^8.0.0" },
  "peerDependencies": { "poi": "^10" },
  "poiPlugin": { "title": "Sample" }
}"#,
    );
    temp
}

/// Relative path to file content for every file under `dir`.
fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(dir)
        .into_iter()
        .map(|entry| entry.expect("failed to walk"))
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry.path().strip_prefix(dir).unwrap().to_path_buf();
            (relative, fs::read(entry.path()).unwrap())
        })
        .collect()
}

#[test]
fn test_stage_filters_default_project() {
    let project = plugin_project();
    let config = PackConfig::new(project.path());

    let report = Stager::new(&config).stage().unwrap();

    let files: Vec<PathBuf> = snapshot(&report.output_dir).into_keys().collect();
    let expected: Vec<PathBuf> = [
        "assets/icon.svg",
        "i18n/en-US.json",
        "i18n/ja-JP.json",
        "index.js",
        "package.json",
        "services/api.js",
        "utils/format.js",
        "views/index.js",
        "views/parts/list.js",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();
    assert_eq!(files, expected);
    assert_eq!(report.stats.file_count, 9);
    // views/index.es, views/.DS_Store, utils/node_modules
    assert_eq!(report.entries_excluded(), 3);
}

#[test]
fn test_stage_is_idempotent() {
    let project = plugin_project();
    let config = PackConfig::new(project.path());
    let stager = Stager::new(&config);

    stager.stage().unwrap();
    let first = snapshot(&config.output_dir());
    stager.stage().unwrap();
    let second = snapshot(&config.output_dir());

    assert_eq!(first, second);
}

#[test]
fn test_sanitized_manifest_drops_dev_dependency() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "index.js", "x");
    write(
        temp.path(),
        "package.json",
        r#"{"name":"p","version":"1.0.0","devDependency":"x","peerDependencies":{"host":"^1"}}"#,
    );
    let config = PackConfig::new(temp.path())
        .with_copy_specs(vec![CopySpec::file("index.js"), CopySpec::file("package.json")]);

    let report = Stager::new(&config).stage().unwrap();

    let staged = load_manifest(&report.manifest_path).unwrap();
    let keys: Vec<&str> = staged.keys().map(String::as_str).collect();
    assert_eq!(keys, ["name", "version", "peerDependencies"]);
}

#[test]
fn test_custom_suffix_rule() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "index.js", "x");
    write(temp.path(), "lib/a.src", "source");
    write(temp.path(), "lib/a.js", "compiled");
    write(temp.path(), "package.json", r#"{"name":"p","version":"1.0.0"}"#);
    let config = PackConfig::new(temp.path())
        .with_copy_specs(vec![
            CopySpec::file("index.js"),
            CopySpec::dir("lib"),
            CopySpec::file("package.json"),
        ])
        .with_exclusions(vec![ExclusionRule::from_pattern("*.src")]);

    Stager::new(&config).stage().unwrap();

    assert!(temp.path().join("dist/lib/a.js").is_file());
    assert!(!temp.path().join("dist/lib/a.src").exists());
}

#[test]
fn test_package_round_trip() {
    let project = plugin_project();
    let config = PackConfig::new(project.path());
    let staged = Stager::new(&config).stage().unwrap();

    let report = Packager::new(&config).package().unwrap();
    assert_eq!(
        report.archive_path,
        project.path().join("poi-plugin-sample-1.2.3.zip")
    );
    assert!(!report.archive.has_warnings());

    let extracted = TempDir::new().unwrap();
    let mut archive = ZipArchive::new(File::open(&report.archive_path).unwrap()).unwrap();
    archive.extract(extracted.path()).unwrap();

    let readme = fs::read_to_string(extracted.path().join("README.txt")).unwrap();
    assert!(readme.starts_with("# poi-plugin-sample v1.2.3"));
    let top_level: Vec<_> = fs::read_dir(extracted.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(top_level.len(), 2);

    assert_eq!(
        snapshot(&extracted.path().join("dist")),
        snapshot(&staged.output_dir)
    );
}

#[test]
fn test_package_before_stage_fails() {
    let project = plugin_project();
    let config = PackConfig::new(project.path());

    let err = Packager::new(&config).package().unwrap_err();
    assert!(matches!(err, PackError::StagedDirMissing { .. }));
    assert!(!project.path().join("poi-plugin-sample-1.2.3.zip").exists());
}

#[test]
fn test_archive_tolerates_vanished_entries() {
    let project = plugin_project();
    let config = PackConfig::new(project.path());
    Stager::new(&config).stage().unwrap();
    let staged_dir = config.output_dir();

    let collected = ArchiveBuilder::collect_entries(&staged_dir).unwrap();
    fs::remove_file(staged_dir.join("services/api.js")).unwrap();

    let output = project.path().join("out.zip");
    let report = ArchiveBuilder::new(&config)
        .build_from_entries(
            &output,
            collected,
            &ProjectMetadata::new("poi-plugin-sample", "1.2.3"),
        )
        .unwrap();

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].path, staged_dir.join("services/api.js"));
    assert_eq!(report.files_added, 8);

    let archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();
    assert!(archive.file_names().any(|n| n == "dist/services/"));
    assert!(!archive.file_names().any(|n| n == "dist/services/api.js"));
}
