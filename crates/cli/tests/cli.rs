use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn definitions() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "orders.table.json",
        r#"{
            "schema_version": 1,
            "kind": "table",
            "table_name": "orders",
            "name": "Orders",
            "columns": [
                {"name": "id", "type": "uuid"},
                {"name": "customer", "type": "text", "max_length": 40},
                {"name": "status", "type": "enum", "enums": ["new", "shipped"]},
                {"name": "total", "type": "numeric"},
                {"name": "paid", "type": "bool", "is_nullable": true}
            ]
        }"#,
    );
    write(
        dir.path(),
        "orders.rows.json",
        r#"[
            {"id": "a", "customer": "Ada", "status": "new", "total": 12.5, "paid": true},
            {"id": "b", "customer": "Bob", "status": "shipped", "total": 3, "paid": false},
            {"id": "c", "customer": "Cy", "status": "new", "total": 40, "paid": null}
        ]"#,
    );
    dir
}

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

fn schemadash(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("schemadash").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("--definitions")
        .arg(dir.path());
    cmd
}

#[test]
fn test_tables_lists_definitions() {
    let dir = definitions();
    schemadash(&dir)
        .arg("tables")
        .assert()
        .success()
        .stdout(predicate::str::contains("orders").and(predicate::str::contains("5 columns")));
}

#[test]
fn test_table_prints_generated_config() {
    let dir = definitions();
    schemadash(&dir)
        .args(["table", "orders"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(r#""id": "select""#)
                .and(predicate::str::contains(r#""id": "actions""#))
                .and(predicate::str::contains(r#""type": "faceted""#)),
        );
}

#[test]
fn test_unknown_table_fails_with_classified_message() {
    let dir = definitions();
    schemadash(&dir)
        .args(["table", "ghosts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Database Error"));
}

#[test]
fn test_form_prints_render_tree() {
    let dir = definitions();
    schemadash(&dir)
        .args(["form", "orders"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(r#""name": "customer""#)
                .and(predicate::str::contains(r#""control": "select""#))
                .and(predicate::str::contains(r#""name": "id""#).not()),
        );
}

#[test]
fn test_form_with_ui_schema_file() {
    let dir = definitions();
    write(
        dir.path(),
        "layout.json",
        r#"{
            "customer": {"uiType": "text", "placeholder": "Who ordered?"},
            "money": {"uiType": "group", "fields": ["total", "paid"]}
        }"#,
    );
    schemadash(&dir)
        .args(["form", "orders", "--ui-schema", "layout.json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Who ordered?")
                .and(predicate::str::contains(r#""node": "group""#))
                .and(predicate::str::contains(r#""name": "status""#).not()),
        );
}

#[test]
fn test_validate_accepts_good_submission() {
    let dir = definitions();
    write(
        dir.path(),
        "good.json",
        r#"{"customer": "Ada", "status": "new", "total": "9.5"}"#,
    );
    schemadash(&dir)
        .args(["validate", "orders", "--input", "good.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Submission is valid"));
}

#[test]
fn test_validate_rejects_bad_submission() {
    let dir = definitions();
    write(
        dir.path(),
        "bad.json",
        r#"{"customer": "", "status": "lost", "total": "lots"}"#,
    );
    schemadash(&dir)
        .args(["validate", "orders", "--input", "bad.json"])
        .assert()
        .failure()
        .stdout(
            predicate::str::contains("Customer is required")
                .and(predicate::str::contains("Total must be a number")),
        )
        .stderr(predicate::str::contains("failed validation on 3 field(s)"));
}

#[test]
fn test_query_pages_and_sorts() {
    let dir = definitions();
    schemadash(&dir)
        .args(["query", "orders", "--size", "2", "--sort", "total:desc"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Cy | New")
                .and(predicate::str::contains("Page 1 of 2 (3 rows)"))
                .and(predicate::str::contains("Bob").not()),
        );
}

#[test]
fn test_query_json_output() {
    let dir = definitions();
    schemadash(&dir)
        .args(["query", "orders", "--page", "1", "--size", "2", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""totalRows": 3"#).and(predicate::str::contains("Cy")));
}

#[test]
fn test_infer_from_sample_file() {
    let dir = definitions();
    write(
        dir.path(),
        "events.json",
        r#"[{"id": 1, "kind": "click", "payload": {"x": 1}}]"#,
    );
    schemadash(&dir)
        .args(["infer", "events.json", "--json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(r#""type": "int8""#)
                .and(predicate::str::contains(r#""type": "jsonb""#)),
        );
}

#[test]
fn test_config_file_page_limits() {
    let dir = definitions();
    write(dir.path(), "schemadash.toml", "[table]\ndefault_page_size = 1\nmax_page_size = 1\n");
    schemadash(&dir)
        .args(["query", "orders", "--size", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Page 1 of 3 (3 rows)"));
}

#[test]
fn test_query_far_past_last_page_is_empty() {
    let dir = definitions();
    schemadash(&dir)
        .args(["query", "orders", "--page", &usize::MAX.to_string()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(format!("Page {} of 1 (3 rows)", usize::MAX))
                .and(predicate::str::contains("Ada").not()),
        );
}
