use tigerfy_core::{params::CreateOffer, Backoffice, BackofficeBuilder, Session};
use tempfile::TempDir;

/// Helper function to create a test backoffice
pub async fn create_test_backoffice() -> (TempDir, Backoffice) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let backoffice = BackofficeBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create backoffice");
    (temp_dir, backoffice)
}

/// Create an offer for `session` and return its ID
pub async fn create_offer(backoffice: &Backoffice, session: &Session, name: &str) -> u64 {
    backoffice
        .create_offer(
            session,
            &CreateOffer {
                name: name.to_string(),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to create offer")
        .id
}
