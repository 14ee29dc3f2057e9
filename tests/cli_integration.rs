//! CLI integration tests for pupil-build.
//!
//! These tests run the binary against throwaway detector source trees and
//! library prefixes.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the pupil-build binary command, isolated from the caller's
/// environment and user config.
fn pupil_build(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pupil-build").unwrap();
    cmd.env("HOME", home)
        .env_remove("VCPKG_PREFIX")
        .env_remove("CONDA_PREFIX")
        .env_remove("PYTHONPATH")
        .env_remove("PUPIL_BUILD_PYTHON_VERSION");
    cmd
}

/// Create a minimal detector source tree.
fn source_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("singleeyefitter/common")).unwrap();
    fs::create_dir_all(root.join("singleeyefitter/ImageProcessing")).unwrap();
    fs::write(root.join("detector_2d.pyx"), "").unwrap();
    fs::write(root.join("detector_3d.pyx"), "").unwrap();
    fs::write(root.join("singleeyefitter/utils.h"), "#pragma once\n").unwrap();
    fs::write(root.join("singleeyefitter/utils.cpp"), "").unwrap();
    fs::write(root.join("singleeyefitter/common/types.h"), "#pragma once\n").unwrap();
    fs::write(root.join("singleeyefitter/ImageProcessing/cvx.cpp"), "").unwrap();
    tmp
}

/// Create a vcpkg-style prefix with OpenCV and Boost.Python libraries.
fn vcpkg_prefix() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("include")).unwrap();
    fs::create_dir_all(tmp.path().join("lib")).unwrap();
    fs::write(tmp.path().join("lib/opencv_core341.lib"), "").unwrap();
    fs::write(tmp.path().join("lib/boost_python36-vc140-mt.lib"), "").unwrap();
    tmp
}

// ============================================================================
// pupil-build deps
// ============================================================================

#[test]
fn test_deps_lists_headers() {
    let home = TempDir::new().unwrap();
    let tree = source_tree();

    pupil_build(home.path())
        .args(["deps", "--root"])
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("singleeyefitter/utils.h"))
        .stdout(predicate::str::contains("singleeyefitter/common/types.h"))
        .stdout(predicate::str::contains("2 headers"))
        .stdout(predicate::str::contains("utils.cpp").not());
}

#[test]
fn test_deps_fingerprint_changes_with_headers() {
    let home = TempDir::new().unwrap();
    let tree = source_tree();

    let fingerprint = || {
        let output = pupil_build(home.path())
            .args(["deps", "--fingerprint", "--root"])
            .arg(tree.path())
            .output()
            .unwrap();
        assert!(output.status.success());
        String::from_utf8(output.stdout).unwrap()
    };

    let before = fingerprint();
    assert_eq!(before, fingerprint());

    fs::write(tree.path().join("singleeyefitter/new.h"), "").unwrap();
    assert_ne!(before, fingerprint());
}

#[test]
fn test_deps_missing_root_fails() {
    let home = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();

    pupil_build(home.path())
        .args(["deps", "--root"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot access header directory"))
        .stderr(predicate::str::contains("--root"));
}

// ============================================================================
// pupil-build plan
// ============================================================================

#[test]
fn test_plan_windows_without_prefix_fails() {
    let home = TempDir::new().unwrap();
    let tree = source_tree();

    pupil_build(home.path())
        .args(["--no-color", "plan", "--platform", "windows", "--python-version", "3.6"])
        .args(["--numpy-include", "/numpy/include", "--root"])
        .arg(tree.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("could not find library directory"))
        .stderr(predicate::str::contains("searched VCPKG_PREFIX (not set)"));
}

#[test]
fn test_plan_windows_with_vcpkg_prefix() {
    let home = TempDir::new().unwrap();
    let tree = source_tree();
    let prefix = vcpkg_prefix();

    pupil_build(home.path())
        .env("VCPKG_PREFIX", prefix.path())
        .args(["plan", "--platform", "windows", "--python-version", "3.6"])
        .args(["--numpy-include", "/numpy/include", "--root"])
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("pupil_detectors.detector_2d"))
        .stdout(predicate::str::contains("pupil_detectors.detector_3d"))
        .stdout(predicate::str::contains("opencv_imgproc341.lib"))
        .stdout(predicate::str::contains("boost_python36-vc140-mt.lib"))
        .stdout(predicate::str::contains("ceres.lib"));
}

#[test]
fn test_plan_windows_relative_pythonpath_is_absolute() {
    let home = TempDir::new().unwrap();
    let tree = source_tree();
    let work = TempDir::new().unwrap();
    fs::create_dir_all(work.path().join("bin")).unwrap();
    fs::create_dir_all(work.path().join("lib")).unwrap();
    fs::write(work.path().join("bin/opencv_core341.dll"), "").unwrap();
    fs::write(work.path().join("lib/opencv_core341.lib"), "").unwrap();

    let output = pupil_build(home.path())
        .current_dir(work.path())
        .env("PYTHONPATH", "bin")
        .args(["plan", "--platform", "windows", "--python-version", "3.6"])
        .args(["--numpy-include", "/numpy/include", "--root"])
        .arg(tree.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let lib_dirs = plan["extensions"][0]["library_dirs"].as_array().unwrap();
    assert_eq!(lib_dirs.len(), 1);
    let lib_dir = Path::new(lib_dirs[0].as_str().unwrap());
    assert!(lib_dir.is_absolute());
    assert!(lib_dir.ends_with("lib"));
    assert!(lib_dir.is_dir());
    assert!(plan["extensions"][0]["extra_objects"]
        .as_array()
        .unwrap()
        .contains(&serde_json::Value::from("opencv_core341.lib")));
}

#[test]
fn test_plan_posix_writes_output_file() {
    let home = TempDir::new().unwrap();
    let tree = source_tree();
    let out = tree.path().join("build/plan.json");

    pupil_build(home.path())
        .args(["plan", "--platform", "posix", "--python-version", "3.6"])
        .args(["--numpy-include", "/numpy/include", "--root"])
        .arg(tree.path())
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let plan: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(plan["platform"], "posix");
    assert_eq!(plan["package"]["name"], "pupil_detectors");
    assert_eq!(plan["cythonize"]["nthreads"], 8);

    let extensions = plan["extensions"].as_array().unwrap();
    assert_eq!(extensions.len(), 2);
    assert_eq!(extensions[0]["language"], "c++");
    assert_eq!(extensions[0]["libraries"][0], "ceres");
    assert!(extensions[0]["libraries"][1]
        .as_str()
        .unwrap()
        .starts_with("boost_python"));
    assert_eq!(
        extensions[1]["sources"].as_array().unwrap().len(),
        extensions[0]["sources"].as_array().unwrap().len() + 2
    );
}

#[test]
fn test_plan_is_deterministic() {
    let home = TempDir::new().unwrap();
    let tree = source_tree();

    let run = || {
        let output = pupil_build(home.path())
            .args(["plan", "--platform", "posix", "--python-version", "3.7"])
            .args(["--numpy-include", "/numpy/include", "--root"])
            .arg(tree.path())
            .output()
            .unwrap();
        assert!(output.status.success());
        output.stdout
    };

    assert_eq!(run(), run());
}

#[test]
fn test_project_config_overrides_layout() {
    let home = TempDir::new().unwrap();
    let tree = source_tree();
    fs::create_dir_all(tree.path().join(".pupil-build")).unwrap();
    fs::write(
        tree.path().join(".pupil-build/config.toml"),
        "[paths]\nopencv_prefix = \"/opt/custom-opencv\"\nros_distributions = []\n\n[cython]\nnthreads = 3\n",
    )
    .unwrap();

    pupil_build(home.path())
        .args(["plan", "--platform", "posix", "--python-version", "3.6"])
        .args(["--numpy-include", "/numpy/include", "--root"])
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("/opt/custom-opencv/lib"))
        .stdout(predicate::str::contains("\"nthreads\": 3"));
}

// ============================================================================
// pupil-build flags
// ============================================================================

#[test]
fn test_flags_compile_only() {
    let home = TempDir::new().unwrap();
    let tree = source_tree();

    pupil_build(home.path())
        .args(["flags", "detector_3d", "--compile", "--platform", "posix"])
        .args(["--python-version", "3.6", "--numpy-include", "/numpy/include", "--root"])
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("-std=c++11"))
        .stdout(predicate::str::contains("-D_USE_MATH_DEFINES"))
        .stdout(predicate::str::contains("-I/numpy/include"))
        .stdout(predicate::str::contains("# Cython entry: detector_3d.pyx"))
        .stdout(predicate::str::contains("singleeyefitter/EyeModelFitter.cpp"))
        .stdout(predicate::str::contains("Link flags").not());
}

#[test]
fn test_flags_link_only() {
    let home = TempDir::new().unwrap();
    let tree = source_tree();

    pupil_build(home.path())
        .args(["flags", "2d", "--link", "--platform", "posix"])
        .args(["--python-version", "3.6", "--numpy-include", "/numpy/include", "--root"])
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("-lceres"))
        .stdout(predicate::str::contains("Compile flags").not());
}

#[test]
fn test_flags_unknown_module_fails() {
    let home = TempDir::new().unwrap();
    let tree = source_tree();

    pupil_build(home.path())
        .args(["flags", "detector_4d", "--python-version", "3.6", "--root"])
        .arg(tree.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown extension module"));
}

#[test]
fn test_invalid_python_version_is_rejected() {
    let home = TempDir::new().unwrap();

    pupil_build(home.path())
        .args(["plan", "--python-version", "three"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid"));
}

// ============================================================================
// pupil-build completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();

    pupil_build(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pupil-build"));
}
