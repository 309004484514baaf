use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("asciitodo-{nanos}-{name}"))
}

fn write_store(store_dir: &Path, tasks: serde_json::Value) {
    std::fs::create_dir_all(store_dir).unwrap();
    std::fs::write(
        store_dir.join("ascii-todos.json"),
        serde_json::to_string(&tasks).unwrap(),
    )
    .unwrap();
}

fn stored(store_dir: &Path) -> serde_json::Value {
    let raw = std::fs::read_to_string(store_dir.join("ascii-todos.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn run_with_input(store_dir: &Path, args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_asciitodo"))
        .args(args)
        .env("ASCIITODO_STORE_DIR", store_dir)
        .env("ASCIITODO_CONFIG_PATH", store_dir.join("config.json"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn asciitodo");

    child
        .stdin
        .as_mut()
        .expect("stdin")
        .write_all(input.as_bytes())
        .expect("failed to write to stdin");

    child.wait_with_output().expect("failed to wait for asciitodo")
}

fn two_tasks() -> serde_json::Value {
    serde_json::json!([
        {
            "text": "first",
            "completed": false,
            "priority": "high",
            "dueDate": "2099-01-01",
            "createdAt": "2025-01-01T00:00:00.000Z"
        },
        {
            "text": "second",
            "completed": false,
            "createdAt": "2025-01-02T00:00:00.000Z"
        }
    ])
}

#[test]
fn edit_command_keeps_priority_and_due_date() {
    let store_dir = temp_path("cli-edit");
    write_store(&store_dir, two_tasks());

    let output = run_with_input(&store_dir, &["edit", "1", "renamed"], "");
    let tasks = stored(&store_dir);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Updated task: renamed (#1)"));
    assert_eq!(tasks[0]["text"], "renamed");
    assert_eq!(tasks[0]["priority"], "high");
    assert_eq!(tasks[0]["dueDate"], "2099-01-01");
    assert_eq!(tasks[0]["createdAt"], "2025-01-01T00:00:00.000Z");
}

#[test]
fn edit_command_prompts_when_text_missing() {
    let store_dir = temp_path("cli-edit-prompt");
    write_store(&store_dir, two_tasks());

    let output = run_with_input(&store_dir, &["edit", "2"], "second !medium\n");
    let tasks = stored(&store_dir);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Edit task [second]:"));
    assert_eq!(tasks[1]["priority"], "medium");
}

#[test]
fn edit_command_cancelled_prompt_leaves_store_untouched() {
    let store_dir = temp_path("cli-edit-cancel");
    write_store(&store_dir, two_tasks());
    let before = stored(&store_dir);

    let output = run_with_input(&store_dir, &["edit", "2"], "");
    let after = stored(&store_dir);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(output.status.success());
    assert_eq!(before, after);
}

#[test]
fn edit_command_rejects_empty_text() {
    let store_dir = temp_path("cli-edit-empty");
    write_store(&store_dir, two_tasks());

    let output = run_with_input(&store_dir, &["edit", "1", "@2100-01-01"], "");
    let tasks = stored(&store_dir);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: empty_text"));
    assert_eq!(tasks[0]["text"], "first");
}

#[test]
fn delete_command_with_yes_removes_task() {
    let store_dir = temp_path("cli-delete");
    write_store(&store_dir, two_tasks());

    let output = run_with_input(&store_dir, &["delete", "1", "--yes"], "");
    let tasks = stored(&store_dir);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Deleted task: first (#1)"));
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["text"], "second");
}

#[test]
fn delete_command_declined_keeps_task() {
    let store_dir = temp_path("cli-delete-declined");
    write_store(&store_dir, two_tasks());

    let output = run_with_input(&store_dir, &["delete", "1"], "n\n");
    let tasks = stored(&store_dir);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Are you sure"));
    assert_eq!(tasks.as_array().unwrap().len(), 2);
}

#[test]
fn delete_command_confirmed_removes_task() {
    let store_dir = temp_path("cli-delete-confirmed");
    write_store(&store_dir, two_tasks());

    let output = run_with_input(&store_dir, &["delete", "2"], "y\n");
    let tasks = stored(&store_dir);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(output.status.success());
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["text"], "first");
}

#[test]
fn delete_command_ignores_unknown_id() {
    let store_dir = temp_path("cli-delete-unknown");
    write_store(&store_dir, two_tasks());

    let output = run_with_input(&store_dir, &["delete", "9", "--yes"], "");
    let tasks = stored(&store_dir);
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(tasks.as_array().unwrap().len(), 2);
}

#[test]
fn delete_command_rejects_malformed_id() {
    let store_dir = temp_path("cli-delete-bad-id");
    write_store(&store_dir, two_tasks());

    let output = run_with_input(&store_dir, &["delete", "first", "--yes"], "");
    std::fs::remove_dir_all(&store_dir).ok();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: invalid_input"));
}
