mod common;

use common::{create_offer, create_test_backoffice};
use serde_json::json;
use tigerfy_core::{
    params::{
        CreateStep, DeleteOffer, OfferRef, ReorderSteps, ResolveCurrentStep, SaveBotToken,
        SetCurrentStep, StepRef, UpdateStepSettings,
    },
    BackofficeError, OfferStatus, Session, SettingsInput,
};

#[tokio::test]
async fn test_funnel_building_workflow() {
    let (_temp_dir, backoffice) = create_test_backoffice().await;
    let session = Session::for_owner("seller@example.com");
    let offer_id = create_offer(&backoffice, &session, "Black Friday").await;
    let offer = OfferRef { offer_id };

    // Opening the builder creates the first step
    let first = backoffice.ensure_first_step(&session, &offer).await.unwrap();
    assert_eq!(first.step_no, 1);
    assert_eq!(first.name, "Step 1");

    let pitch = backoffice
        .create_step(
            &session,
            CreateStep {
                offer_id,
                name: Some("Pitch".to_string()),
                settings: Some(SettingsInput::Encoded(r#"{"delay": 5}"#.to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let upsell = backoffice
        .create_step(
            &session,
            CreateStep {
                offer_id,
                duplicate_from: Some(pitch.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(upsell.step_no, 3);
    assert_eq!(upsell.settings, json!({"delay": 5}));
    assert_eq!(
        backoffice.next_step_number(&session, &offer).await.unwrap(),
        4
    );

    let upsell = backoffice
        .update_step_settings(
            &session,
            &UpdateStepSettings {
                offer_id,
                step_id: upsell.id,
                name: Some("Upsell".to_string()),
                settings: Some(json!({"delay": 10}).into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(upsell.name, "Upsell");

    // Move the upsell right after the opening step
    let steps = backoffice
        .reorder_steps(
            &session,
            &ReorderSteps {
                offer_id,
                step_ids: vec![first.id, upsell.id, pitch.id],
            },
        )
        .await
        .unwrap();
    let names: Vec<&str> = steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Step 1", "Upsell", "Pitch"]);

    backoffice
        .set_current_step(
            &session,
            &SetCurrentStep {
                offer_id,
                step_id: Some(pitch.id),
            },
        )
        .await
        .unwrap();

    // Old links address steps by number
    let resolved = backoffice
        .resolve_current_step(
            &session,
            &ResolveCurrentStep {
                offer_id,
                step_no: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.id, upsell.id);

    // Deleting the current step drops the pointer and closes the gap
    backoffice
        .delete_step(
            &session,
            &StepRef {
                offer_id,
                step_id: pitch.id,
            },
        )
        .await
        .unwrap();
    let resolved = backoffice
        .resolve_current_step(
            &session,
            &ResolveCurrentStep {
                offer_id,
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.id, first.id);

    let err = backoffice
        .delete_step(
            &session,
            &StepRef {
                offer_id,
                step_id: first.id,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BackofficeError::ProtectedStep { .. }));

    let offer_state = backoffice.get_offer(&session, &offer).await.unwrap();
    assert_eq!(offer_state.current_step_id, None);
    assert_eq!(offer_state.steps.len(), 2);
    assert_eq!(offer_state.steps[1].step_no, 2);
}

#[tokio::test]
async fn test_publishing_and_removing_offer() {
    let (_temp_dir, backoffice) = create_test_backoffice().await;
    let session = Session::for_owner("seller@example.com");
    let offer_id = create_offer(&backoffice, &session, "Evergreen").await;

    let offer = backoffice
        .save_bot_token(
            &session,
            &SaveBotToken {
                offer_id,
                bot_token: Some("123456:ABCDEF".to_string()),
                telegram_username: Some("@evergreen_bot".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(offer.status, OfferStatus::Active);
    assert_eq!(offer.telegram_username.as_deref(), Some("evergreen_bot"));

    let rendered = offer.to_string();
    assert!(!rendered.contains("123456:ABCDEF"));

    // Somebody else cannot see or remove it
    let stranger = Session::for_owner("other@example.com");
    assert!(backoffice.list_offers(&stranger).await.unwrap().is_empty());
    let err = backoffice
        .delete_offer(
            &stranger,
            &DeleteOffer {
                offer_id,
                confirmed: true,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    backoffice
        .delete_offer(
            &session,
            &DeleteOffer {
                offer_id,
                confirmed: true,
            },
        )
        .await
        .unwrap();
    assert!(backoffice.list_offers(&session).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_backoffice_reopens_existing_database() {
    let (temp_dir, backoffice) = create_test_backoffice().await;
    let session = Session::for_owner("seller@example.com");
    let offer_id = create_offer(&backoffice, &session, "Persistent").await;
    drop(backoffice);

    let reopened = tigerfy_core::BackofficeBuilder::new()
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .build()
        .await
        .unwrap();
    let offer = reopened
        .get_offer(&session, &OfferRef { offer_id })
        .await
        .unwrap();
    assert_eq!(offer.name, "Persistent");
}
