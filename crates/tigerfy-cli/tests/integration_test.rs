//! Integration tests comparing CLI output with the core Display
//! implementations the MCP server returns.

use std::process::Command;

use futures::future::join_all;
use tigerfy_core::{
    params::{CreateOffer, CreateStep, OfferRef, StepRef},
    Backoffice, BackofficeBuilder, Session,
};
use tempfile::TempDir;

const OWNER: &str = "seller-1";

/// Helper function to create a test backoffice with temporary database
async fn create_test_backoffice() -> (Backoffice, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let db_path = temp_dir.path().join("test.db");

    let backoffice = BackofficeBuilder::new()
        .with_database_path(Some(db_path))
        .build()
        .await
        .expect("Failed to create backoffice");

    (backoffice, temp_dir)
}

/// Run a CLI command and capture its output
fn run_cli_command(db_path: &str, args: &[&str]) -> String {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tfy"));
    cmd.env_remove("TIGERFY_OWNER")
        .arg("--no-color")
        .arg("--database-file")
        .arg(db_path)
        .arg("--owner")
        .arg(OWNER);

    for arg in args {
        cmd.arg(arg);
    }

    let output = cmd.output().expect("Failed to run CLI command");
    String::from_utf8(output.stdout).expect("Invalid UTF-8 in CLI output")
}

#[tokio::test]
async fn test_offer_display_consistency() {
    let (backoffice, temp_dir) = create_test_backoffice().await;
    let db_path = temp_dir.path().join("test.db");
    let db_str = db_path.to_str().unwrap();
    let session = Session::for_owner(OWNER);

    run_cli_command(db_str, &["offer", "create", "Consistent"]);
    run_cli_command(db_str, &["step", "add", "1", "--settings", r#"{"a": 1}"#]);

    let offer = backoffice
        .get_offer(&session, &OfferRef { offer_id: 1 })
        .await
        .unwrap();
    let cli_output = run_cli_command(db_str, &["offer", "show", "1"]);
    assert_eq!(cli_output, offer.to_string());

    let steps = backoffice
        .list_steps(&session, &OfferRef { offer_id: 1 })
        .await
        .unwrap();
    let cli_output = run_cli_command(db_str, &["step", "list", "1"]);
    assert_eq!(cli_output, steps.to_string());
}

#[tokio::test]
async fn test_offer_list_consistency() {
    let (backoffice, temp_dir) = create_test_backoffice().await;
    let db_path = temp_dir.path().join("test.db");
    let db_str = db_path.to_str().unwrap();
    let session = Session::for_owner(OWNER);

    for name in ["First", "Second"] {
        backoffice
            .create_offer(
                &session,
                &CreateOffer {
                    name: name.to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let offers = backoffice.list_offers(&session).await.unwrap();
    let cli_output = run_cli_command(db_str, &["offer", "list"]);
    assert_eq!(cli_output, offers.to_string());

    // Newest first
    let second = cli_output.find("## Second").unwrap();
    let first = cli_output.find("## First").unwrap();
    assert!(second < first);
}

#[tokio::test]
async fn test_concurrent_step_creation_keeps_numbers_unique() {
    let (backoffice, _temp_dir) = create_test_backoffice().await;
    let session = Session::for_owner(OWNER);
    let offer = backoffice
        .create_offer(
            &session,
            &CreateOffer {
                name: "Rush".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let results = join_all((0..8).map(|_| {
        backoffice.create_step(
            &session,
            CreateStep {
                offer_id: offer.id,
                ..Default::default()
            },
        )
    }))
    .await;
    assert!(results.iter().all(Result::is_ok));

    let steps = backoffice
        .list_steps(&session, &OfferRef { offer_id: offer.id })
        .await
        .unwrap();
    let numbers: Vec<u32> = steps.iter().map(|s| s.step_no).collect();
    assert_eq!(numbers, (1..=8).collect::<Vec<u32>>());
}

#[tokio::test]
async fn test_cli_sees_steps_created_through_backoffice() {
    let (backoffice, temp_dir) = create_test_backoffice().await;
    let db_path = temp_dir.path().join("test.db");
    let db_str = db_path.to_str().unwrap();
    let session = Session::for_owner(OWNER);

    let offer = backoffice
        .create_offer(
            &session,
            &CreateOffer {
                name: "Shared".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let first = backoffice
        .ensure_first_step(&session, &OfferRef { offer_id: offer.id })
        .await
        .unwrap();

    let cli_output = run_cli_command(
        db_str,
        &["step", "show", &offer.id.to_string(), &first.id.to_string()],
    );
    let step = backoffice
        .get_step(
            &session,
            &StepRef {
                offer_id: offer.id,
                step_id: first.id,
            },
        )
        .await
        .unwrap();
    assert_eq!(cli_output, step.to_string());
}
