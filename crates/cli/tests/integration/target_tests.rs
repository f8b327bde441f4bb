//! Build, export and clean integration tests.

use predicates::prelude::*;
use serial_test::serial;

use super::common::TestEnv;

/// Fake docker that logs calls, reads the Dockerfile and writes archives on save.
///
/// `PATH` is isolated, so only shell builtins are available.
#[cfg(unix)]
const FAKE_DOCKER: &str = r#"echo "$*" >> "${0%/*}/../docker.log"
if [ "$1" = build ]; then while read -r _; do :; done; fi
if [ "$1" = save ]; then echo image > "$3"; fi"#;

/// Fake docker whose builds always fail.
#[cfg(unix)]
const FAILING_DOCKER: &str = r#"echo "$*" >> "${0%/*}/../docker.log"
exit 3"#;

#[test]
fn clean_twice_succeeds() {
  let env = TestEnv::new();
  env.write_file("build/aprendo-backend.tar", "image");
  env.write_file("build/aprendo-frontend.tar", "image");

  env.deploy_cmd().arg("clean").assert().success();
  assert!(!env.build_dir().join("aprendo-backend.tar").exists());
  assert!(!env.build_dir().join("aprendo-frontend.tar").exists());

  env.deploy_cmd().arg("clean").assert().success();
}

#[test]
fn build_without_runtime_fails() {
  let env = TestEnv::new();

  env
    .deploy_cmd()
    .arg("build")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Container runtime required"));
}

#[test]
fn target_unknown_name_fails() {
  let env = TestEnv::new();

  env
    .deploy_cmd()
    .args(["target", "deploy"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown target: deploy"));
}

#[test]
#[serial]
#[cfg(unix)]
fn export_images_writes_archives() {
  let env = TestEnv::new();
  env.install_script("docker", FAKE_DOCKER);

  env
    .deploy_cmd()
    .arg("export-images")
    .env("APRENDO_CONTAINER_RUNTIME", "docker")
    .assert()
    .success()
    .stdout(predicate::str::contains("Target export-images complete"));

  assert!(env.build_dir().join("aprendo-backend.tar").exists());
  assert!(env.build_dir().join("aprendo-frontend.tar").exists());

  let log = std::fs::read_to_string(env.path().join("docker.log")).unwrap();
  let first = log.lines().next().unwrap();
  assert!(first.starts_with("build -t aprendo-venv"), "{log}");
}

#[test]
#[serial]
#[cfg(unix)]
fn failed_build_exports_nothing() {
  let env = TestEnv::new();
  env.install_script("docker", FAILING_DOCKER);

  env
    .deploy_cmd()
    .arg("export-images")
    .env("APRENDO_CONTAINER_RUNTIME", "docker")
    .assert()
    .code(3)
    .stderr(predicate::str::contains("venv"))
    .stderr(predicate::str::contains("export-images (skipped)"));

  assert!(!env.build_dir().join("aprendo-backend.tar").exists());
  assert!(!env.build_dir().join("aprendo-frontend.tar").exists());

  // Only the venv build was attempted.
  let log = std::fs::read_to_string(env.path().join("docker.log")).unwrap();
  assert_eq!(log.lines().count(), 1, "{log}");
}

#[test]
#[serial]
#[cfg(unix)]
fn build_passes_runtime_exit_code_through() {
  let env = TestEnv::new();
  env.install_script("docker", FAILING_DOCKER);

  env
    .deploy_cmd()
    .arg("build")
    .env("APRENDO_CONTAINER_RUNTIME", "docker")
    .assert()
    .code(3)
    .stderr(predicate::str::contains("target build-all failed"));
}

#[test]
#[serial]
#[cfg(unix)]
fn single_target_builds_dependencies_first() {
  let env = TestEnv::new();
  env.install_script("docker", FAKE_DOCKER);

  env
    .deploy_cmd()
    .args(["target", "frontend"])
    .env("APRENDO_CONTAINER_RUNTIME", "docker")
    .assert()
    .success();

  let log = std::fs::read_to_string(env.path().join("docker.log")).unwrap();
  let tags: Vec<_> = log.lines().filter_map(|l| l.split_whitespace().nth(2)).collect();
  assert_eq!(tags, vec!["aprendo-venv", "aprendo-frontend"]);
}
