//! Integration tests for the qasync CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const DOC_PATH: &str = "docs/QA.md";

/// Helper to get a qasync command isolated from the user's global config
fn qasync(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("qasync").unwrap();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".xdg"))
        .env("HOME", tmp.path())
        .env_remove("QASYNC_DOCUMENT")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a project with a config, a QA document and spec files
fn setup_project(config: &str, doc: &str, specs: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".qasync.yaml"), config).unwrap();
    write_file(tmp.path(), DOC_PATH, doc);
    for (path, content) in specs {
        write_file(tmp.path(), path, content);
    }
    tmp
}

fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read_doc(tmp: &TempDir) -> String {
    fs::read_to_string(tmp.path().join(DOC_PATH)).unwrap()
}

const BASIC_CONFIG: &str = "document: docs/QA.md\n\
sources:\n  - \"tests/e2e/**/*.spec.ts\"\n\
sections:\n  \"1.1\": 1.1 인증\n  \"4.2\": 4.2 example\n";

const PLIC_DOC: &str = "# PLIC QA\n\
\n\
> **E2E 자동화**: Playwright (0/4 = 0%)\n\
\n\
## 진행률\n\
\n\
| 구분 | 전체 | 완료 | 진행률 |\n\
|------|------|------|--------|\n\
| 1.1 인증 | 0 | 0 | 0% |\n\
| 4.1 동시성 | 0 | 0 | 0% |\n\
| **합계** | **0** | **0** | **0%** |\n\
\n\
## 1.1 인증\n\
\n\
| ID | 시나리오 | 기대 결과 | 자동화 |\n\
|----|----------|-----------|--------|\n\
| TC-1.1-001 | 회원가입 | 가입 완료 | 🔴 |\n\
| TC-1.1-002 | 로그인 | 토큰 발급 | 🟢 |\n\
| TC-1.1-003 | 로그아웃 | 세션 종료 | 🔴 |\n\
\n\
## 4.1 동시성\n\
\n\
| ID | 시나리오 | 기대 결과 | 자동화 |\n\
|----|----------|-----------|--------|\n\
| TC-4.1-001 | 동시 결제 | 하나만 성공 | 🔴 |\n";

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    qasync(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("QA"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    qasync(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("qasync"));
}

#[test]
fn test_unknown_command_fails() {
    let tmp = TempDir::new().unwrap();
    qasync(&tmp)
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

// ============================================================================
// Sync Tests
// ============================================================================

#[test]
fn test_remapped_pending_row_becomes_done() {
    let tmp = setup_project(
        BASIC_CONFIG,
        "| TC-4.1-001 | 동시 결제 | 하나만 성공 | 🔴 |\n",
        &[("tests/e2e/concurrency.spec.ts", "test('TC-4.1.1-001: foo', async () => {});\n")],
    );

    qasync(&tmp)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("updated: 1"))
        .stdout(predicate::str::contains("already 🟢: 0"));

    assert_eq!(read_doc(&tmp), "| TC-4.1-001 | 동시 결제 | 하나만 성공 | 🟢 |\n");
}

#[test]
fn test_remapped_done_row_is_unchanged() {
    let doc = "| TC-4.1-001 | 동시 결제 | 하나만 성공 | 🟢 |\n";
    let tmp = setup_project(
        BASIC_CONFIG,
        doc,
        &[("tests/e2e/concurrency.spec.ts", "test('TC-4.1.1-001: foo', async () => {});\n")],
    );

    qasync(&tmp)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("updated: 0"));

    assert_eq!(read_doc(&tmp), doc);
}

#[test]
fn test_direct_done_row_counts_as_already() {
    let doc = "| TC-1.1-002 | 로그인 | 🟢 |\n";
    let tmp = setup_project(
        BASIC_CONFIG,
        doc,
        &[("tests/e2e/login.spec.ts", "test(\"TC-1.1-002: login\", async () => {});\n")],
    );

    qasync(&tmp)
        .assert()
        .success()
        .stdout(predicate::str::contains("updated: 0"))
        .stdout(predicate::str::contains("already 🟢: 1"));

    assert_eq!(read_doc(&tmp), doc);
}

#[test]
fn test_section_summary_row_is_recomputed() {
    let doc = "| 4.2 example | 0 | 0 | 0% |\n\
\n\
| TC-4.2-001 | a | 🟢 |\n\
| TC-4.2-002 | b | 🟢 |\n\
| TC-4.2-003 | c | 🔴 |\n";
    let tmp = setup_project(BASIC_CONFIG, doc, &[]);

    qasync(&tmp).arg("sync").assert().success();

    assert!(read_doc(&tmp).starts_with("| 4.2 example | 3 | 2 | 66% |\n"));
}

#[test]
fn test_header_with_no_done_rows() {
    let mut doc = String::from("> **E2E 자동화**: Playwright (7/7 = 100%)\n\n");
    for i in 1..=10 {
        doc.push_str(&format!("| TC-1.{}-001 | case | 🔴 |\n", i));
    }
    let tmp = setup_project(BASIC_CONFIG, &doc, &[]);

    qasync(&tmp).arg("sync").assert().success();

    assert!(read_doc(&tmp).starts_with("> **E2E 자동화**: Playwright (0/10 = 0%)\n"));
}

#[test]
fn test_unnamed_section_still_counts_in_totals() {
    let doc = "| **합계** | **0** | **0** | **0%** |\n\
| 4.2 example | 0 | 0 | 0% |\n\
\n\
| TC-4.2-001 | a | 🟢 |\n\
| TC-7.7-001 | b | 🟢 |\n\
| TC-7.7-002 | c | 🔴 |\n";
    let tmp = setup_project(BASIC_CONFIG, doc, &[]);

    qasync(&tmp)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("7.7"));

    let text = read_doc(&tmp);
    assert!(text.contains("| **합계** | **3** | **2** | **66%** |"));
    assert!(text.contains("| 4.2 example | 1 | 1 | 100% |"));
}

#[test]
fn test_full_document_sync() {
    let tmp = setup_project(
        BASIC_CONFIG,
        PLIC_DOC,
        &[
            (
                "tests/e2e/auth/signup.spec.ts",
                "import { test } from '@playwright/test';\n\
                 test('TC-1.1-001: 회원가입 성공', async ({ page }) => {});\n\
                 test('TC-1.1-002: 로그인', async ({ page }) => {});\n",
            ),
            (
                "tests/e2e/edge-cases/edge-cases.spec.ts",
                "test('TC-4.1.1-001: 동시 결제', async () => {});\n\
                 test('TC-4.9.9-001: unmapped', async () => {});\n",
            ),
            ("tests/e2e/helpers.ts", "test('TC-1.1-003: not a spec file');\n"),
        ],
    );

    qasync(&tmp)
        .args(["sync", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Extracted 4 test id(s) from 2 source file(s)"))
        .stdout(predicate::str::contains("updated: 2"))
        .stdout(predicate::str::contains("already 🟢: 1"))
        .stdout(predicate::str::contains("TC-4.1-001 ← TC-4.1.1-001"));

    let text = read_doc(&tmp);
    assert!(text.contains("> **E2E 자동화**: Playwright (3/4 = 75%)"));
    assert!(text.contains("| 1.1 인증 | 3 | 2 | 66% |"));
    assert!(text.contains("| 4.1 동시성 | 1 | 1 | 100% |"));
    assert!(text.contains("| **합계** | **4** | **3** | **75%** |"));
    assert!(text.contains("| TC-1.1-003 | 로그아웃 | 세션 종료 | 🔴 |"));
    assert!(text.starts_with("# PLIC QA\n\n"));
}

#[test]
fn test_sync_is_idempotent() {
    let tmp = setup_project(
        BASIC_CONFIG,
        PLIC_DOC,
        &[("tests/e2e/a.spec.ts", "test('TC-1.1-001: a', async () => {});\n")],
    );

    qasync(&tmp).arg("sync").assert().success();
    let once = read_doc(&tmp);

    qasync(&tmp)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("updated: 0"));
    assert_eq!(read_doc(&tmp), once);
}

#[test]
fn test_dry_run_does_not_write() {
    let tmp = setup_project(
        BASIC_CONFIG,
        PLIC_DOC,
        &[("tests/e2e/a.spec.ts", "test('TC-1.1-001: a', async () => {});\n")],
    );

    qasync(&tmp)
        .args(["sync", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert_eq!(read_doc(&tmp), PLIC_DOC);
}

#[test]
fn test_check_fails_when_out_of_date() {
    let tmp = setup_project(
        BASIC_CONFIG,
        PLIC_DOC,
        &[("tests/e2e/a.spec.ts", "test('TC-1.1-001: a', async () => {});\n")],
    );

    qasync(&tmp)
        .args(["sync", "--check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of date"));
    assert_eq!(read_doc(&tmp), PLIC_DOC);

    qasync(&tmp).arg("sync").assert().success();
    qasync(&tmp)
        .args(["sync", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

#[test]
fn test_quiet_suppresses_output() {
    let tmp = setup_project(BASIC_CONFIG, PLIC_DOC, &[]);

    qasync(&tmp)
        .args(["sync", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_document_flag_overrides_config() {
    let tmp = setup_project(BASIC_CONFIG, PLIC_DOC, &[]);
    write_file(tmp.path(), "other/QA2.md", "| TC-1.1-001 | x | 🔴 |\n");
    write_file(tmp.path(), "tests/e2e/a.spec.ts", "test('TC-1.1-001: a', () => {});\n");

    qasync(&tmp)
        .args(["sync", "--document", "other/QA2.md"])
        .assert()
        .success();

    let other = fs::read_to_string(tmp.path().join("other/QA2.md")).unwrap();
    assert_eq!(other, "| TC-1.1-001 | x | 🟢 |\n");
    assert_eq!(read_doc(&tmp), PLIC_DOC);
}

#[test]
fn test_document_env_overrides_config() {
    let tmp = setup_project(BASIC_CONFIG, PLIC_DOC, &[]);
    write_file(tmp.path(), "env/QA.md", "| TC-1.1-001 | x | 🔴 |\n");
    write_file(tmp.path(), "tests/e2e/a.spec.ts", "test('TC-1.1-001: a', () => {});\n");

    qasync(&tmp)
        .env("QASYNC_DOCUMENT", "env/QA.md")
        .arg("sync")
        .assert()
        .success();

    let env_doc = fs::read_to_string(tmp.path().join("env/QA.md")).unwrap();
    assert_eq!(env_doc, "| TC-1.1-001 | x | 🟢 |\n");
}

#[test]
fn test_runs_from_subdirectory() {
    let tmp = setup_project(
        BASIC_CONFIG,
        "| TC-1.1-001 | x | 🔴 |\n",
        &[("tests/e2e/a.spec.ts", "test('TC-1.1-001: a', () => {});\n")],
    );
    let sub = tmp.path().join("tests/e2e");

    let mut cmd = qasync(&tmp);
    cmd.current_dir(&sub).arg("sync").assert().success();

    assert_eq!(read_doc(&tmp), "| TC-1.1-001 | x | 🟢 |\n");
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_missing_document_fails() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".qasync.yaml"), "document: docs/nope.md\n").unwrap();

    qasync(&tmp)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read QA document"));

    assert!(!tmp.path().join("docs/nope.md").exists());
}

#[test]
fn test_invalid_config_fails_with_diagnostic() {
    let tmp = setup_project("document: docs/QA.md\nsection_dept: 2\n", PLIC_DOC, &[]);

    qasync(&tmp)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains(".qasync.yaml"));

    assert_eq!(read_doc(&tmp), PLIC_DOC);
}

#[test]
fn test_invalid_remap_id_fails() {
    let tmp = setup_project(
        "document: docs/QA.md\nremap:\n  - { from: TC-4-001, to: TC-4.1-001 }\n",
        PLIC_DOC,
        &[],
    );

    qasync(&tmp).arg("sync").assert().failure();
}

#[test]
fn test_explicit_config_file() {
    let tmp = setup_project(BASIC_CONFIG, PLIC_DOC, &[]);
    write_file(
        tmp.path(),
        "ci/qa.yaml",
        "document: docs/QA.md\nheader: { label: E2E 자동화, tool: Cypress }\n",
    );
    write_file(
        tmp.path(),
        DOC_PATH,
        "> **E2E 자동화**: Cypress (0/0 = 0%)\n\n| TC-1.1-001 | x | 🟢 |\n",
    );

    qasync(&tmp)
        .args(["--config", "ci/qa.yaml", "sync"])
        .assert()
        .success();

    assert!(read_doc(&tmp).starts_with("> **E2E 자동화**: Cypress (1/1 = 100%)\n"));
}

// ============================================================================
// Status / Ids Tests
// ============================================================================

#[test]
fn test_status_json() {
    let tmp = setup_project(BASIC_CONFIG, PLIC_DOC, &[]);

    let output = qasync(&tmp)
        .args(["status", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total"], 4);
    assert_eq!(json["done"], 1);
    assert_eq!(json["percent"], 25);
    assert_eq!(json["sections"][0]["section"], "1.1");
    assert_eq!(json["sections"][0]["name"], "1.1 인증");
    assert_eq!(json["sections"][0]["total"], 3);

    assert_eq!(read_doc(&tmp), PLIC_DOC);
}

#[test]
fn test_status_markdown_table() {
    let tmp = setup_project(BASIC_CONFIG, PLIC_DOC, &[]);

    qasync(&tmp)
        .args(["status", "-f", "md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| Section"))
        .stdout(predicate::str::contains("4.1 동시성"))
        .stdout(predicate::str::contains("1/4 = 25%"));
}

#[test]
fn test_status_csv() {
    let tmp = setup_project(BASIC_CONFIG, PLIC_DOC, &[]);

    qasync(&tmp)
        .args(["status", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("section,name,total,done,percent\n"))
        .stdout(predicate::str::contains("4.1,4.1 동시성,1,0,0"));
}

#[test]
fn test_ids_lists_resolution() {
    let tmp = setup_project(
        BASIC_CONFIG,
        PLIC_DOC,
        &[(
            "tests/e2e/a.spec.ts",
            "test('TC-1.1-001: a', () => {});\n\
             test('TC-4.1.1-001: b', () => {});\n\
             test('TC-9.1-001: c', () => {});\n",
        )],
    );

    let output = qasync(&tmp).args(["ids", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let lines = json.as_array().unwrap();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["id"], "TC-1.1-001");
    assert_eq!(lines[0]["rows"][0]["id"], "TC-1.1-001");
    assert_eq!(lines[0]["rows"][0]["remapped"], false);
    assert_eq!(lines[0]["rows"][0]["status"], "pending");
    assert_eq!(lines[1]["id"], "TC-4.1.1-001");
    assert_eq!(lines[1]["rows"][0]["id"], "TC-4.1-001");
    assert_eq!(lines[1]["rows"][0]["remapped"], true);
    assert!(lines[2]["rows"].as_array().unwrap().is_empty());
}

#[test]
fn test_ids_shows_direct_and_remapped_rows() {
    let doc = "| TC-4.1.1-001 | own | 🟢 |\n| TC-4.1-001 | mapped | 🔴 |\n";
    let tmp = setup_project(
        BASIC_CONFIG,
        doc,
        &[("tests/e2e/a.spec.ts", "test('TC-4.1.1-001: both', () => {});\n")],
    );

    qasync(&tmp)
        .args(["ids", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TC-4.1.1-001,TC-4.1.1-001,false,done"))
        .stdout(predicate::str::contains("TC-4.1.1-001,TC-4.1-001,true,pending"));

    qasync(&tmp).arg("sync").assert().success().stdout(predicate::str::contains("updated: 1"));
    assert_eq!(read_doc(&tmp), "| TC-4.1.1-001 | own | 🟢 |\n| TC-4.1-001 | mapped | 🟢 |\n");
}

#[test]
fn test_ids_missing_only() {
    let tmp = setup_project(
        BASIC_CONFIG,
        PLIC_DOC,
        &[(
            "tests/e2e/a.spec.ts",
            "test('TC-1.1-001: a', () => {});\ntest('TC-9.1-001: c', () => {});\n",
        )],
    );

    qasync(&tmp)
        .args(["ids", "--missing", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TC-9.1-001"))
        .stdout(predicate::str::contains("TC-1.1-001").not());
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_writes_config() {
    let tmp = TempDir::new().unwrap();

    qasync(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let config = fs::read_to_string(tmp.path().join(".qasync.yaml")).unwrap();
    assert!(config.contains("section_depth: 2"));
    assert!(config.contains("TC-4.1.1-001"));

    qasync(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    qasync(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("qasync"));
}
