//! Launch and check-env integration tests.

use predicates::prelude::*;
use serial_test::serial;

use super::common::TestEnv;

#[test]
fn launch_without_csv_dir_fails() {
  let env = TestEnv::new();

  env
    .deploy_cmd()
    .arg("launch")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("APRENDO_CSV_DIR is not set or empty"));
}

#[test]
fn launch_with_empty_csv_dir_fails() {
  let env = TestEnv::new();

  env
    .deploy_cmd()
    .arg("launch")
    .env("APRENDO_CSV_DIR", "")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("APRENDO_CSV_DIR is not set or empty"));
}

#[test]
fn check_env_without_translations_fails() {
  let env = TestEnv::new();
  env.write_file("csv/notes.txt", "unrelated");

  env
    .deploy_cmd()
    .arg("check-env")
    .env("APRENDO_CSV_DIR", env.csv_dir())
    .assert()
    .code(1)
    .stderr(predicate::str::contains("translations.csv"));
}

#[test]
fn check_env_finds_translations() {
  let env = TestEnv::new();
  env.write_file("csv/translations.csv", "hola,здравей\n");

  env
    .deploy_cmd()
    .arg("check-env")
    .env("APRENDO_CSV_DIR", env.csv_dir())
    .assert()
    .success()
    .stdout(predicate::str::contains("translations.csv"));
}

#[test]
#[serial]
#[cfg(unix)]
fn launch_execs_backend_with_extra_args() {
  let env = TestEnv::new();
  env.write_file("csv/translations.csv", "hola,здравей\n");
  env.install_script("reflex", "echo \"reflex $*\"");

  env
    .deploy_cmd()
    .arg("launch")
    .env("APRENDO_CSV_DIR", env.csv_dir())
    .env("APRENDO_BACKEND_ARGS", "--foo bar")
    .assert()
    .success()
    .stdout(predicate::str::contains("reflex run --env prod --backend-only --foo bar"));
}

#[test]
#[serial]
#[cfg(unix)]
fn launch_propagates_backend_exit_code() {
  let env = TestEnv::new();
  env.write_file("csv/translations.csv", "hola,здравей\n");
  env.install_script("reflex", "exit 7");

  env
    .deploy_cmd()
    .arg("launch")
    .env("APRENDO_CSV_DIR", env.csv_dir())
    .assert()
    .code(7);
}

#[test]
fn launch_without_backend_reports_os_error() {
  let env = TestEnv::new();
  env.write_file("csv/translations.csv", "hola,здравей\n");

  env
    .deploy_cmd()
    .arg("launch")
    .env("APRENDO_CSV_DIR", env.csv_dir())
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to exec reflex"));
}
