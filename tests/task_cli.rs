mod support;

use predicates::str::contains;
use serde_json::Value;

use support::{parse_envelope, TestStore};

fn new_task(env: &TestStore, args: &[&str]) -> Result<Value, Box<dyn std::error::Error>> {
    let output = env
        .cmd()
        .arg("--json")
        .arg("new")
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let envelope = parse_envelope(&output)?;
    Ok(envelope["data"].clone())
}

fn list_json(env: &TestStore, args: &[&str]) -> Result<Value, Box<dyn std::error::Error>> {
    let output = env
        .cmd()
        .args(["--json", "list"])
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    Ok(parse_envelope(&output)?)
}

fn titles(list: &Value) -> Vec<String> {
    list["data"]["tasks"]
        .as_array()
        .map(|tasks| {
            tasks
                .iter()
                .filter_map(|task| task["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn init_creates_document() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestStore::new();

    let output = env
        .cmd()
        .args(["--json", "init"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let envelope = parse_envelope(&output)?;
    assert_eq!(envelope["command"], "init");
    assert_eq!(envelope["data"]["created"]["document"], true);
    assert_eq!(envelope["data"]["created"]["config"], false);

    let document = env.read_document()?;
    assert!(document.tasks.is_empty());
    assert_eq!(document.meta.version, "1.0.0");

    let again = env
        .cmd()
        .args(["--json", "init"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(parse_envelope(&again)?["data"]["created"]["document"], false);
    Ok(())
}

#[test]
fn init_write_config_records_db_path() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestStore::new();

    env.cmd()
        .args(["--db", "tasks.json", "init", "--write-config"])
        .assert()
        .success()
        .stdout(contains("taskstore initialized"));

    let config = std::fs::read_to_string(env.path().join("taskstore.toml"))?;
    assert!(config.contains("tasks.json"));
    assert!(env.path().join("tasks.json").is_file());
    Ok(())
}

#[test]
fn new_then_show_roundtrips_fields() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestStore::new();

    let created = new_task(
        &env,
        &[
            "  Renew passport  ",
            "--description",
            "before summer",
            "--due",
            "2024-05-01",
            "--category",
            "admin",
        ],
    )?;
    assert_eq!(created["title"], "Renew passport");
    assert_eq!(created["status"], "open");
    assert_eq!(created["dueDate"], "2024-05-01");
    assert_eq!(created["category"], "admin");

    let id = created["id"].as_str().ok_or("missing id")?;
    let output = env
        .cmd()
        .args(["--json", "show", id])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(parse_envelope(&output)?["data"], created);
    Ok(())
}

#[test]
fn list_sorts_and_filters() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestStore::new();

    new_task(&env, &["Buy milk", "--due", "2024-01-05", "-c", "home"])?;
    let dentist = new_task(&env, &["Call dentist", "-c", "health"])?;
    new_task(&env, &["Pay rent", "--due", "2024-01-01", "-c", "home"])?;

    let default_order = list_json(&env, &[])?;
    assert_eq!(default_order["data"]["total"], 3);
    assert_eq!(
        titles(&default_order),
        vec!["Pay rent", "Buy milk", "Call dentist"]
    );

    let desc = list_json(&env, &["--sort", "dueDate", "--order", "desc"])?;
    assert_eq!(titles(&desc), vec!["Buy milk", "Pay rent", "Call dentist"]);

    let by_title = list_json(&env, &["--sort", "title"])?;
    assert_eq!(
        titles(&by_title),
        vec!["Buy milk", "Call dentist", "Pay rent"]
    );

    let home = list_json(&env, &["--category", "home"])?;
    assert_eq!(titles(&home), vec!["Pay rent", "Buy milk"]);

    let searched = list_json(&env, &["--search", "RENT"])?;
    assert_eq!(titles(&searched), vec!["Pay rent"]);

    let id = dentist["id"].as_str().ok_or("missing id")?;
    env.cmd().args(["toggle", id]).assert().success();
    let completed = list_json(&env, &["--status", "completed"])?;
    assert_eq!(titles(&completed), vec!["Call dentist"]);
    Ok(())
}

#[test]
fn list_human_output_marks_completed() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestStore::new();
    let task = new_task(&env, &["Feed cat"])?;
    let id = task["id"].as_str().ok_or("missing id")?;

    env.cmd()
        .args(["toggle", id])
        .assert()
        .success()
        .stdout(contains("Task completed"));

    env.cmd()
        .arg("ls")
        .assert()
        .success()
        .stdout(contains(format!("[x] {id} Feed cat")));

    env.cmd()
        .args(["toggle", id])
        .assert()
        .success()
        .stdout(contains("Task reopened"));
    Ok(())
}

#[test]
fn edit_merges_fields() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestStore::new();
    let task = new_task(&env, &["Draft", "-d", "first pass", "-c", "writing"])?;
    let id = task["id"].as_str().ok_or("missing id")?;

    let output = env
        .cmd()
        .args(["--json", "edit", id, "--title", "Final", "--status", "completed"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let updated = parse_envelope(&output)?["data"].clone();
    assert_eq!(updated["title"], "Final");
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["description"], "first pass");
    assert_eq!(updated["category"], "writing");
    assert_eq!(updated["createdAt"], task["createdAt"]);
    assert_ne!(updated["updatedAt"], task["updatedAt"]);
    Ok(())
}

#[test]
fn rm_then_missing_task_exits_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestStore::new();
    let task = new_task(&env, &["Temporary"])?;
    let id = task["id"].as_str().ok_or("missing id")?;

    env.cmd()
        .args(["rm", id])
        .assert()
        .success()
        .stdout(contains("Task deleted"));

    let output = env
        .cmd()
        .args(["--json", "delete", id])
        .assert()
        .failure()
        .code(3)
        .get_output()
        .stdout
        .clone();
    let envelope = parse_envelope(&output)?;
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["command"], "delete");
    assert_eq!(envelope["error"]["kind"], "not_found");
    assert_eq!(envelope["error"]["http_status"], 404);
    assert_eq!(envelope["error"]["details"]["id"], id);

    for cmd in ["show", "toggle"] {
        env.cmd()
            .args([cmd, id])
            .assert()
            .failure()
            .code(3)
            .stderr(contains(format!("Task with id {id} not found")));
    }
    Ok(())
}

#[test]
fn invalid_input_exits_user_error() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestStore::new();
    let task = new_task(&env, &["Valid"])?;
    let id = task["id"].as_str().ok_or("missing id")?;

    env.cmd()
        .args(["new", "   "])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Title is required"));

    let long_title = "x".repeat(201);
    env.cmd()
        .args(["new", long_title.as_str()])
        .assert()
        .failure()
        .code(2);

    env.cmd()
        .args(["edit", id, "--status", "done"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Status must be either"));

    env.cmd().args(["edit", id]).assert().failure().code(2);

    env.cmd()
        .args(["list", "--sort", "priority"])
        .assert()
        .failure()
        .code(2);

    assert_eq!(env.read_document()?.tasks.len(), 1);
    Ok(())
}

#[test]
fn corrupt_document_exits_operation_failed() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestStore::new();
    env.write_file("data/db.json", "{ not json")?;

    env.cmd()
        .arg("list")
        .assert()
        .failure()
        .code(4)
        .stderr(contains("Corrupt data"));
    Ok(())
}

#[test]
fn info_reports_counts() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestStore::new();
    let task = new_task(&env, &["One"])?;
    new_task(&env, &["Two"])?;
    let id = task["id"].as_str().ok_or("missing id")?;
    env.cmd().args(["-q", "toggle", id]).assert().success();

    let output = env
        .cmd()
        .args(["--json", "info"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let data = parse_envelope(&output)?["data"].clone();
    assert_eq!(data["status"], "ok");
    assert_eq!(data["total"], 2);
    assert_eq!(data["open"], 1);
    assert_eq!(data["completed"], 1);
    Ok(())
}

#[test]
fn config_sets_document_and_list_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestStore::new();
    env.write_file(
        "taskstore.toml",
        r#"
[store]
path = "store/tasks.json"

[list]
sort = "title"
order = "desc"
"#,
    )?;

    new_task(&env, &["apple"])?;
    new_task(&env, &["cherry"])?;
    new_task(&env, &["banana"])?;
    assert!(env.path().join("store/tasks.json").is_file());

    let listed = list_json(&env, &[])?;
    assert_eq!(titles(&listed), vec!["cherry", "banana", "apple"]);

    let overridden = list_json(&env, &["--order", "asc"])?;
    assert_eq!(titles(&overridden), vec!["apple", "banana", "cherry"]);
    Ok(())
}

#[test]
fn unparseable_due_date_is_kept_with_warning() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestStore::new();

    let output = env
        .cmd()
        .args(["--json", "new", "Someday task", "--due", "someday"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let envelope = parse_envelope(&output)?;
    assert_eq!(envelope["data"]["dueDate"], "someday");
    let warnings = envelope["warnings"].as_array().ok_or("warnings")?;
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0]
        .as_str()
        .is_some_and(|w| w.contains("sorts as undated")));

    new_task(&env, &["Dated task", "--due", "2024-01-01"])?;
    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("Warnings:"))
        .stdout(contains("\"someday\" is not a date"));

    let listed = list_json(&env, &[])?;
    assert_eq!(titles(&listed), vec!["Dated task", "Someday task"]);
    Ok(())
}

#[test]
fn explicit_missing_config_is_user_error() {
    let env = TestStore::new();
    env.cmd()
        .args(["--config", "nope.toml", "list"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("config file not found"));
}
