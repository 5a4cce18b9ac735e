//! Integration tests for the project commands

mod common;

use common::{strings, url, FakeGit, Workspace, SHA_1};
use packman::commands::{
    copy_back, init_project, install_packages, open_package, remove_packages, update_gitignore,
    InstallError, InstallOptions, PackageError, RemoveError,
};
use packman::{Config, Manifest, ProjectLayout, ResolverError};
use std::fs;

#[test]
fn test_install_records_transitive_dependencies() {
    let ws = Workspace::new(&[]);
    let git = FakeGit::new();
    ws.package(&git, "u/p1", &["u/p2"], SHA_1);
    let p2 = ws.template("u/p2", Some(r#"{ "name": "p2" }"#));
    git.publish(&url("u/p2"), &p2, SHA_1);

    let result = install_packages(
        &ws.layout,
        &Config::default(),
        &git,
        &strings(&["u/p1"]),
        &InstallOptions::default(),
    )
    .unwrap();

    assert_eq!(ws.manifest().dependencies, strings(&["u/p1", "u/p2"]));
    assert_eq!(result.manifest.dependencies, strings(&["u/p1", "u/p2"]));

    assert!(ws.cache("u.p1").join("README.md").exists());
    assert!(ws.cache("u.p2").join("README.md").exists());
    assert!(ws.staged("u.p1").join("p1.txt").exists());
    assert!(!ws.staged("u.p1").join("README.md").exists());
    assert!(!ws.staged("u.p2").exists());
}

#[test]
fn test_install_merges_and_sorts() {
    let ws = Workspace::new(&["u/zeta", "u/p1?tag=old"]);
    let git = FakeGit::new();
    ws.package(&git, "u/p1", &[], SHA_1);
    git.advertise(&url("u/p1"), "refs/heads/main", SHA_1);

    install_packages(
        &ws.layout,
        &Config::default(),
        &git,
        &strings(&["u/p1?branch=main"]),
        &InstallOptions::default(),
    )
    .unwrap();

    assert_eq!(
        ws.manifest().dependencies,
        strings(&["u/p1?branch=main", "u/zeta"])
    );
}

#[test]
fn test_install_dev_dependency() {
    let ws = Workspace::new(&["u/p1"]);
    let git = FakeGit::new();
    ws.package(&git, "u/p1", &[], SHA_1);

    install_packages(
        &ws.layout,
        &Config::default(),
        &git,
        &strings(&["u/p1"]),
        &InstallOptions {
            dev: true,
            production: false,
        },
    )
    .unwrap();

    let manifest = ws.manifest();
    assert!(manifest.dependencies.is_empty());
    assert_eq!(manifest.dev_dependencies, strings(&["u/p1"]));
}

#[test]
fn test_install_everything() {
    let ws = Workspace::new(&["u/p2", "u/p1", "u/p1"]);
    let git = FakeGit::new();
    ws.package(&git, "u/p1", &["u/p3"], SHA_1);
    ws.package(&git, "u/p2", &[], SHA_1);
    ws.package(&git, "u/p3", &[], SHA_1);
    ws.package(&git, "u/kit", &[], SHA_1);

    let mut manifest = ws.manifest();
    manifest.dev_dependencies = strings(&["u/kit"]);
    manifest.write(ws.root()).unwrap();

    let result = install_packages(
        &ws.layout,
        &Config::default(),
        &git,
        &[],
        &InstallOptions {
            dev: false,
            production: true,
        },
    )
    .unwrap();

    assert_eq!(git.clone_count(&url("u/kit")), 0);
    assert_eq!(git.total_clones(), 3);
    assert_eq!(result.report.staged.len(), 3);

    let manifest = ws.manifest();
    assert_eq!(manifest.dependencies, strings(&["u/p1", "u/p2", "u/p3"]));
    assert_eq!(manifest.dev_dependencies, strings(&["u/kit"]));

    install_packages(&ws.layout, &Config::default(), &git, &[], &InstallOptions::default())
        .unwrap();
    assert_eq!(git.clone_count(&url("u/kit")), 1);
    assert_eq!(git.total_clones(), 4);
}

#[test]
fn test_install_without_manifest() {
    let temp = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(temp.path());
    let result = install_packages(
        &layout,
        &Config::default(),
        FakeGit::new(),
        &strings(&["u/p1"]),
        &InstallOptions::default(),
    );
    assert!(matches!(result, Err(InstallError::NoManifest)));
}

#[test]
fn test_failed_install_leaves_manifest_untouched() {
    let ws = Workspace::new(&["u/keep"]);
    let git = FakeGit::new();
    ws.package(&git, "u/p1", &["u/missing"], SHA_1);
    let before = fs::read_to_string(ws.layout.manifest_path()).unwrap();

    let result = install_packages(
        &ws.layout,
        &Config::default(),
        &git,
        &strings(&["u/p1"]),
        &InstallOptions::default(),
    );
    assert!(matches!(result, Err(InstallError::ResolverError(_))));
    assert_eq!(fs::read_to_string(ws.layout.manifest_path()).unwrap(), before);

    let result = install_packages(
        &ws.layout,
        &Config::default(),
        &git,
        &strings(&["u/p1?commit=abc&branch=x"]),
        &InstallOptions::default(),
    );
    assert!(matches!(result, Err(InstallError::InvalidReference(_))));
    assert_eq!(fs::read_to_string(ws.layout.manifest_path()).unwrap(), before);
}

#[test]
fn test_install_preserves_unknown_manifest_keys() {
    let ws = Workspace::new(&[]);
    fs::write(
        ws.layout.manifest_path(),
        r#"{ "name": "game", "unityVersion": "2022.3", "dependencies": [] }"#,
    )
    .unwrap();
    let git = FakeGit::new();
    ws.package(&git, "u/p1", &[], SHA_1);

    install_packages(
        &ws.layout,
        &Config::default(),
        &git,
        &strings(&["u/p1"]),
        &InstallOptions::default(),
    )
    .unwrap();

    let content = fs::read_to_string(ws.layout.manifest_path()).unwrap();
    assert!(content.contains("\"unityVersion\": \"2022.3\""));
}

#[test]
fn test_remove_deletes_cache_and_stage() {
    let ws = Workspace::new(&[]);
    let git = FakeGit::new();
    ws.package(&git, "u/p1", &[], SHA_1);
    ws.package(&git, "u/p2", &[], SHA_1);
    install_packages(
        &ws.layout,
        &Config::default(),
        &git,
        &strings(&["u/p2", "u/p1?tag=v1"]),
        &InstallOptions::default(),
    )
    .unwrap();

    let removed = remove_packages(&ws.layout, &strings(&["u/p1"])).unwrap();

    assert_eq!(removed, strings(&["u.p1"]));
    assert_eq!(ws.manifest().dependencies, strings(&["u/p2"]));
    assert!(!ws.cache("u.p1").exists());
    assert!(!ws.staged("u.p1").exists());
    assert!(ws.staged("u.p2").exists());
}

#[test]
fn test_remove_errors() {
    let ws = Workspace::new(&["u/p1"]);
    assert!(matches!(
        remove_packages(&ws.layout, &strings(&["nope"])),
        Err(RemoveError::InvalidReference(_))
    ));

    let temp = tempfile::tempdir().unwrap();
    assert!(matches!(
        remove_packages(&ProjectLayout::new(temp.path()), &strings(&["u/p1"])),
        Err(RemoveError::NoManifest)
    ));
}

#[test]
fn test_copy_back_restores_edits_into_cache() {
    let ws = Workspace::new(&[]);
    let git = FakeGit::new();
    ws.package(&git, "u/p1", &[], SHA_1);
    install_packages(
        &ws.layout,
        &Config::default(),
        &git,
        &strings(&["u/p1"]),
        &InstallOptions::default(),
    )
    .unwrap();

    fs::write(ws.staged("u.p1").join("edited.txt"), "edited").unwrap();
    fs::remove_file(ws.staged("u.p1").join("p1.txt")).unwrap();

    let export = copy_back(&ws.layout, "u/p1").unwrap();

    assert_eq!(export, ws.cache("u.p1").join("Export"));
    assert!(export.join("edited.txt").exists());
    assert!(!export.join("p1.txt").exists());
    assert!(ws.cache("u.p1").join("README.md").exists());
}

#[test]
fn test_copy_back_requires_installed_export() {
    let ws = Workspace::new(&[]);
    assert!(matches!(
        copy_back(&ws.layout, "u/p1"),
        Err(PackageError::NotInstalled(_))
    ));

    let cache = ws.cache("u.meta");
    fs::create_dir_all(&cache).unwrap();
    Manifest::new("meta").write(&cache).unwrap();
    assert!(matches!(
        copy_back(&ws.layout, "u/meta"),
        Err(PackageError::NoExport(_))
    ));
}

#[test]
fn test_open_requires_unity() {
    let ws = Workspace::new(&[]);
    assert!(matches!(
        open_package(&ws.layout, &Config::default(), "u/p1"),
        Err(PackageError::UnityNotSet)
    ));
}

#[cfg(unix)]
#[test]
fn test_open_spawns_editor() {
    let ws = Workspace::new(&[]);
    let git = FakeGit::new();
    ws.package(&git, "u/p1", &[], SHA_1);
    install_packages(
        &ws.layout,
        &Config::default(),
        &git,
        &strings(&["u/p1"]),
        &InstallOptions::default(),
    )
    .unwrap();

    let mut config = Config::default();
    config.set("unity", Some("true")).unwrap();
    assert!(open_package(&ws.layout, &config, "u/p1").is_ok());
}

#[test]
fn test_init_then_gitignore() {
    let temp = tempfile::tempdir().unwrap();
    let dir = temp.path().join("my-game");

    assert!(init_project(&dir).unwrap());
    assert!(!init_project(&dir).unwrap());
    assert_eq!(Manifest::load(&dir).unwrap().name, "my-game");

    assert_eq!(update_gitignore(&dir).unwrap().len(), 3);
    assert!(update_gitignore(&dir).unwrap().is_empty());
}

#[test]
fn test_resolver_error_is_wrapped() {
    let ws = Workspace::new(&[]);
    let git = FakeGit::new();
    let broken = ws.template("u/broken", Some(r#"{ "name": "broken", "export": "Nope" }"#));
    git.publish(&url("u/broken"), &broken, SHA_1);

    let result = install_packages(
        &ws.layout,
        &Config::default(),
        &git,
        &strings(&["u/broken"]),
        &InstallOptions::default(),
    );
    assert!(matches!(
        result,
        Err(InstallError::ResolverError(ResolverError::ExportNotFound { .. }))
    ));
}
