use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper function to create a temporary directory for CLI tests
fn create_cli_test_environment() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Command with plain output and a scratch database, acting for `owner`
fn tfy_cmd_as(temp_dir: &TempDir, owner: &str) -> Command {
    let db_path = temp_dir.path().join("cli_test.db");
    let mut cmd = Command::cargo_bin("tfy").expect("Failed to find tfy binary");
    cmd.env_remove("TIGERFY_OWNER")
        .arg("--no-color")
        .arg("--database-file")
        .arg(db_path)
        .arg("--owner")
        .arg(owner);
    cmd
}

fn tfy_cmd(temp_dir: &TempDir) -> Command {
    tfy_cmd_as(temp_dir, "seller-1")
}

/// Runs a command that must succeed and returns its stdout
fn run_ok(temp_dir: &TempDir, args: &[&str]) -> String {
    let output = tfy_cmd(temp_dir)
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(output).expect("Invalid UTF-8 in CLI output")
}

#[test]
fn test_cli_requires_owner() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    Command::cargo_bin("tfy")
        .unwrap()
        .env_remove("TIGERFY_OWNER")
        .args(["--no-color", "--database-file", db_path.to_str().unwrap()])
        .args(["offer", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TIGERFY_OWNER"));
}

#[test]
fn test_cli_owner_from_environment() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    Command::cargo_bin("tfy")
        .unwrap()
        .env("TIGERFY_OWNER", "seller-1")
        .args(["--no-color", "--database-file", db_path.to_str().unwrap()])
        .args(["offer", "create", "From Env"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# 1. From Env"));
}

#[test]
fn test_cli_list_empty_offers() {
    let temp_dir = create_cli_test_environment();

    tfy_cmd(&temp_dir)
        .args(["offer", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No offers found."));

    // No subcommand lists offers too
    tfy_cmd(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No offers found."));
}

#[test]
fn test_cli_create_offer_with_options() {
    let temp_dir = create_cli_test_environment();

    tfy_cmd(&temp_dir)
        .args([
            "offer",
            "create",
            "Black Friday",
            "--bot-type",
            "wiin-flow",
            "--tracking-type",
            "utmify_pixel",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created offer with ID: 1"))
        .stdout(predicate::str::contains("- Status: incomplete"))
        .stdout(predicate::str::contains("- Bot type: wiin_flow"))
        .stdout(predicate::str::contains("- Tracking: utmify_pixel"))
        .stdout(predicate::str::contains("No steps in this offer."));
}

#[test]
fn test_cli_create_offer_rejects_unknown_bot_type() {
    let temp_dir = create_cli_test_environment();

    tfy_cmd(&temp_dir)
        .args(["offer", "create", "Broken", "--bot-type", "telegram"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bot_type"));
}

#[test]
fn test_cli_offers_are_scoped_to_owner() {
    let temp_dir = create_cli_test_environment();
    run_ok(&temp_dir, &["offer", "create", "Private"]);

    tfy_cmd_as(&temp_dir, "someone-else")
        .args(["offer", "show", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Offer with ID 1 not found"));
}

#[test]
fn test_cli_step_lifecycle() {
    let temp_dir = create_cli_test_environment();
    run_ok(&temp_dir, &["offer", "create", "Funnel"]);

    let output = run_ok(&temp_dir, &["step", "init", "1"]);
    assert!(output.contains("### 1. Step 1"));

    let output = run_ok(
        &temp_dir,
        &[
            "step",
            "add",
            "1",
            "--name",
            "Pitch",
            "--settings",
            r#"{"price": 97}"#,
        ],
    );
    assert!(output.contains("Created step with ID: 2"));
    assert!(output.contains("### 2. Pitch"));
    assert!(output.contains("\"price\": 97"));

    let output = run_ok(&temp_dir, &["step", "add", "1", "--duplicate-from", "2"]);
    assert!(output.contains("### 3. Step 3"));
    assert!(output.contains("Duplicated from step 2."));
    assert!(output.contains("\"price\": 97"));

    let output = run_ok(&temp_dir, &["step", "next", "1"]);
    assert!(output.contains("Next step number for offer 1: 4"));

    let output = run_ok(&temp_dir, &["step", "rename", "1", "3", "Upsell"]);
    assert!(output.contains("### 3. Upsell"));

    let output = run_ok(&temp_dir, &["step", "reorder", "1", "1,3,2"]);
    assert!(output.contains("### 2. Upsell (ID: 3)"));
    assert!(output.contains("### 3. Pitch (ID: 2)"));

    let output = run_ok(&temp_dir, &["step", "delete", "1", "3"]);
    assert!(output.contains("Deleted step 'Upsell' (ID: 3)"));

    let output = run_ok(&temp_dir, &["step", "list", "1"]);
    assert!(output.contains("### 1. Step 1 (ID: 1)"));
    assert!(output.contains("### 2. Pitch (ID: 2)"));
    assert!(!output.contains("Upsell"));
}

#[test]
fn test_cli_first_step_is_protected() {
    let temp_dir = create_cli_test_environment();
    run_ok(&temp_dir, &["offer", "create", "Funnel"]);
    run_ok(&temp_dir, &["step", "init", "1"]);

    tfy_cmd(&temp_dir)
        .args(["step", "delete", "1", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("first step"));
}

#[test]
fn test_cli_reorder_must_cover_every_step() {
    let temp_dir = create_cli_test_environment();
    run_ok(&temp_dir, &["offer", "create", "Funnel"]);
    run_ok(&temp_dir, &["step", "add", "1"]);
    run_ok(&temp_dir, &["step", "add", "1"]);

    tfy_cmd(&temp_dir)
        .args(["step", "reorder", "1", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("step_ids"));
}

#[test]
fn test_cli_update_step_settings() {
    let temp_dir = create_cli_test_environment();
    run_ok(&temp_dir, &["offer", "create", "Funnel"]);
    run_ok(&temp_dir, &["step", "add", "1"]);

    let output = run_ok(
        &temp_dir,
        &["step", "update", "1", "1", "--settings", r#"{"delay": 30}"#],
    );
    assert!(output.contains("Updated step with ID: 1"));
    assert!(output.contains("\"delay\": 30"));

    // Settings that are not an object leave the step alone
    let output = run_ok(&temp_dir, &["step", "update", "1", "1", "--settings", "[1]"]);
    assert!(output.contains("\"delay\": 30"));
}

#[test]
fn test_cli_bot_token_activates_offer() {
    let temp_dir = create_cli_test_environment();
    run_ok(&temp_dir, &["offer", "create", "Funnel"]);

    let output = run_ok(
        &temp_dir,
        &[
            "offer",
            "token",
            "1",
            "--token",
            "123456789:AAHsecretvalue",
            "--username",
            "@tiger_bot",
        ],
    );
    assert!(output.contains("- Status: active"));
    assert!(output.contains("- Telegram: @tiger_bot"));
    assert!(output.contains("****alue"));
    assert!(!output.contains("AAHsecret"));

    let output = run_ok(&temp_dir, &["offer", "token", "1"]);
    assert!(output.contains("- Status: incomplete"));
    assert!(output.contains("- Bot token: not set"));
}

#[test]
fn test_cli_current_step_resolution() {
    let temp_dir = create_cli_test_environment();
    run_ok(&temp_dir, &["offer", "create", "Funnel"]);

    let output = run_ok(&temp_dir, &["offer", "current", "1"]);
    assert!(output.contains("Offer 1 has no steps yet"));

    run_ok(&temp_dir, &["step", "add", "1"]);
    run_ok(&temp_dir, &["step", "add", "1", "--name", "Checkout"]);

    let output = run_ok(&temp_dir, &["offer", "current", "1"]);
    assert!(output.contains("### 1. Step 1"));

    let output = run_ok(&temp_dir, &["offer", "focus", "1", "2"]);
    assert!(output.contains("Offer 1 now opens on step 2"));

    let output = run_ok(&temp_dir, &["offer", "current", "1"]);
    assert!(output.contains("### 2. Checkout"));

    let output = run_ok(&temp_dir, &["offer", "current", "1", "--step-no", "1"]);
    assert!(output.contains("### 1. Step 1"));
}

#[test]
fn test_cli_delete_offer_requires_confirmation() {
    let temp_dir = create_cli_test_environment();
    run_ok(&temp_dir, &["offer", "create", "Doomed"]);

    tfy_cmd(&temp_dir)
        .args(["offer", "delete", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("confirmation"));

    let output = run_ok(&temp_dir, &["offer", "delete", "1", "--confirm"]);
    assert!(output.contains("Deleted offer 'Doomed' (ID: 1)"));

    let output = run_ok(&temp_dir, &["offer", "list"]);
    assert!(output.contains("No offers found."));
}

#[test]
fn test_cli_acquirer_management() {
    let temp_dir = create_cli_test_environment();

    let output = run_ok(
        &temp_dir,
        &[
            "acquirer",
            "add",
            "--name",
            "Main",
            "--provider",
            "pushinpay",
            "--token",
            "pp_live_0123456789",
            "--extra",
            r#"{"split": 10}"#,
        ],
    );
    assert!(output.contains("Created acquirer with ID: 1"));
    assert!(output.contains("## Main (ID: 1, active)"));
    assert!(output.contains("****6789"));
    assert!(!output.contains("pp_live"));

    run_ok(
        &temp_dir,
        &["acquirer", "add", "--name", "Backup", "--inactive"],
    );

    let output = run_ok(&temp_dir, &["acquirer", "list", "--active", "true"]);
    assert!(output.contains("Main"));
    assert!(!output.contains("Backup"));

    let output = run_ok(&temp_dir, &["acquirer", "list", "--provider", "PUSHIN"]);
    assert!(output.contains("Main"));

    let output = run_ok(
        &temp_dir,
        &["acquirer", "upsert", "Backup", "--active", "true"],
    );
    assert!(output.contains("Updated acquirer with ID: 2"));
    assert!(output.contains("## Backup (ID: 2, active)"));

    let output = run_ok(&temp_dir, &["acquirer", "upsert", "Spare"]);
    assert!(output.contains("Created acquirer with ID: 3"));

    let output = run_ok(&temp_dir, &["acquirer", "remove", "1"]);
    assert!(output.contains("Deleted acquirer 'Main' (ID: 1)"));

    tfy_cmd(&temp_dir)
        .args(["acquirer", "show", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Acquirer with ID 1 not found"));
}

#[test]
fn test_cli_rejects_invalid_extra_json() {
    let temp_dir = create_cli_test_environment();

    tfy_cmd(&temp_dir)
        .args(["acquirer", "add", "--extra", "{not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON"));
}
