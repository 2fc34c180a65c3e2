use serde_json::json;

use super::*;
use crate::{
    models::{NewStep, StepDraft},
    store::MemoryStepStore,
};

const OFFER: u64 = 1;

fn sequencer() -> StepSequencer<MemoryStepStore> {
    StepSequencer::new(MemoryStepStore::new())
}

fn seeded(count: u32) -> (StepSequencer<MemoryStepStore>, Vec<Step>) {
    let mut sequencer = sequencer();
    let steps = (0..count)
        .map(|_| sequencer.insert_step(OFFER, &StepDraft::default()).unwrap())
        .collect();
    (sequencer, steps)
}

fn numbers(sequencer: &StepSequencer<impl StepStore>) -> Vec<(u64, u32)> {
    sequencer
        .list_steps(OFFER)
        .unwrap()
        .iter()
        .map(|s| (s.id, s.step_no))
        .collect()
}

/// Store whose next `collisions` inserts lose a race: a competing writer
/// grabs the same number right before the insert lands.
struct RacingStore {
    inner: MemoryStepStore,
    collisions: usize,
}

impl StepStore for RacingStore {
    fn insert(&mut self, step: &NewStep) -> Result<Step> {
        if self.collisions > 0 {
            self.collisions -= 1;
            let competitor = NewStep {
                name: "Competitor".to_string(),
                ..step.clone()
            };
            self.inner.insert(&competitor)?;
        }
        self.inner.insert(step)
    }

    fn select_ordered(
        &self,
        offer_id: u64,
        direction: Direction,
        limit: Option<usize>,
    ) -> Result<Vec<Step>> {
        self.inner.select_ordered(offer_id, direction, limit)
    }

    fn select_one(&self, offer_id: u64, step_id: u64) -> Result<Option<Step>> {
        self.inner.select_one(offer_id, step_id)
    }

    fn update_by_id(
        &mut self,
        offer_id: u64,
        step_id: u64,
        patch: &StepPatch,
    ) -> Result<Option<Step>> {
        self.inner.update_by_id(offer_id, step_id, patch)
    }

    fn delete_by_id(&mut self, offer_id: u64, step_id: u64) -> Result<bool> {
        self.inner.delete_by_id(offer_id, step_id)
    }

    fn delete_by_ids(&mut self, offer_id: u64, step_ids: &[u64]) -> Result<usize> {
        self.inner.delete_by_ids(offer_id, step_ids)
    }
}

/// Store that counts write calls.
#[derive(Default)]
struct CountingStore {
    inner: MemoryStepStore,
    writes: usize,
}

impl StepStore for CountingStore {
    fn insert(&mut self, step: &NewStep) -> Result<Step> {
        self.writes += 1;
        self.inner.insert(step)
    }

    fn select_ordered(
        &self,
        offer_id: u64,
        direction: Direction,
        limit: Option<usize>,
    ) -> Result<Vec<Step>> {
        self.inner.select_ordered(offer_id, direction, limit)
    }

    fn select_one(&self, offer_id: u64, step_id: u64) -> Result<Option<Step>> {
        self.inner.select_one(offer_id, step_id)
    }

    fn update_by_id(
        &mut self,
        offer_id: u64,
        step_id: u64,
        patch: &StepPatch,
    ) -> Result<Option<Step>> {
        self.writes += 1;
        self.inner.update_by_id(offer_id, step_id, patch)
    }

    fn delete_by_id(&mut self, offer_id: u64, step_id: u64) -> Result<bool> {
        self.writes += 1;
        self.inner.delete_by_id(offer_id, step_id)
    }

    fn delete_by_ids(&mut self, offer_id: u64, step_ids: &[u64]) -> Result<usize> {
        self.writes += 1;
        self.inner.delete_by_ids(offer_id, step_ids)
    }
}

#[test]
fn test_next_sequence_number_empty_offer() {
    assert_eq!(sequencer().next_sequence_number(OFFER).unwrap(), 1);
}

#[test]
fn test_next_sequence_number_follows_max_not_count() {
    let mut store = MemoryStepStore::new();
    for step_no in [2, 7, 3] {
        store
            .insert(&NewStep {
                offer_id: OFFER,
                name: Step::default_name(step_no),
                step_no,
                settings: json!({}),
                duplicated: false,
                duplicated_from: None,
            })
            .unwrap();
    }
    let sequencer = StepSequencer::new(store);

    assert_eq!(sequencer.next_sequence_number(OFFER).unwrap(), 8);
    // Other offers are independent
    assert_eq!(sequencer.next_sequence_number(OFFER + 1).unwrap(), 1);
}

#[test]
fn test_insert_on_empty_offer_defaults_name() {
    let mut sequencer = sequencer();
    let draft = StepDraft {
        name: Some("   ".to_string()),
        settings: Some(json!({})),
        duplicate_source_id: None,
    };

    let step = sequencer.insert_step(OFFER, &draft).unwrap();
    assert_eq!(step.name, "Step 1");
    assert_eq!(step.step_no, 1);
    assert_eq!(step.settings, json!({}));
    assert!(!step.duplicated);
    assert_eq!(step.duplicated_from, None);
}

#[test]
fn test_insert_keeps_trimmed_name_and_settings() {
    let mut sequencer = sequencer();
    let draft = StepDraft {
        name: Some("  Welcome ".to_string()),
        settings: Some(json!({"message": "hi"})),
        duplicate_source_id: None,
    };

    let step = sequencer.insert_step(OFFER, &draft).unwrap();
    assert_eq!(step.name, "Welcome");
    assert_eq!(step.settings, json!({"message": "hi"}));
}

#[test]
fn test_duplicate_copies_source_settings() {
    let (mut sequencer, steps) = seeded(3);
    let source = sequencer
        .update_step_settings(
            OFFER,
            steps[1].id,
            None,
            Some(&SettingsInput::from(json!({"price": 19.9, "upsell": true}))),
        )
        .unwrap();

    let draft = StepDraft {
        name: None,
        // Ignored when duplicating
        settings: Some(json!({"other": 1})),
        duplicate_source_id: Some(source.id),
    };
    let copy = sequencer.insert_step(OFFER, &draft).unwrap();

    assert_eq!(copy.step_no, 4);
    assert_eq!(copy.name, "Step 4");
    assert_eq!(copy.settings, source.settings);
    assert!(copy.duplicated);
    assert_eq!(copy.duplicated_from, Some(source.id));
}

#[test]
fn test_duplicate_source_must_belong_to_offer() {
    let mut sequencer = sequencer();
    let foreign = sequencer
        .insert_step(OFFER + 1, &StepDraft::default())
        .unwrap();

    let draft = StepDraft {
        duplicate_source_id: Some(foreign.id),
        ..Default::default()
    };
    let err = sequencer.insert_step(OFFER, &draft).unwrap_err();
    assert!(matches!(err, BackofficeError::StepNotFound { id } if id == foreign.id));
    assert!(sequencer.list_steps(OFFER).unwrap().is_empty());
}

#[test]
fn test_insert_retries_once_after_collision() {
    let (seed, _) = seeded(3);
    let mut sequencer = StepSequencer::new(RacingStore {
        inner: seed.into_inner(),
        collisions: 1,
    });

    let step = sequencer.insert_step(OFFER, &StepDraft::default()).unwrap();
    assert_eq!(step.step_no, 5);
    assert_eq!(step.name, "Step 5");

    let names: Vec<String> = sequencer
        .list_steps(OFFER)
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Step 1", "Step 2", "Step 3", "Competitor", "Step 5"]);
}

#[test]
fn test_insert_gives_up_after_second_collision() {
    let (seed, _) = seeded(3);
    let mut sequencer = StepSequencer::new(RacingStore {
        inner: seed.into_inner(),
        collisions: 2,
    });

    let err = sequencer
        .insert_step(OFFER, &StepDraft::named("Mine"))
        .unwrap_err();
    assert!(matches!(
        err,
        BackofficeError::Conflict {
            offer_id: OFFER,
            step_no: 5
        }
    ));
    assert!(err.is_retryable());
    assert!(sequencer
        .list_steps(OFFER)
        .unwrap()
        .iter()
        .all(|s| s.name != "Mine"));
}

#[test]
fn test_rename_step() {
    let (mut sequencer, steps) = seeded(2);

    let renamed = sequencer.rename_step(OFFER, steps[1].id, " Checkout ").unwrap();
    assert_eq!(renamed.name, "Checkout");
    assert_eq!(renamed.step_no, 2);

    let err = sequencer.rename_step(OFFER, steps[1].id, "  ").unwrap_err();
    assert!(matches!(err, BackofficeError::InvalidInput { .. }));

    let err = sequencer.rename_step(OFFER + 1, steps[1].id, "X").unwrap_err();
    assert!(matches!(err, BackofficeError::StepNotFound { .. }));
}

#[test]
fn test_update_settings_without_changes_issues_no_write() {
    let mut inner = CountingStore::default();
    let created = StepSequencer::new(&mut inner)
        .insert_step(OFFER, &StepDraft::default())
        .unwrap();
    inner.writes = 0;

    let mut sequencer = StepSequencer::new(inner);
    let invalid = SettingsInput::Encoded("{not json".to_string());
    let array = SettingsInput::from(json!([1, 2, 3]));
    for (name, settings) in [
        (None, None),
        (Some("   "), None),
        (None, Some(&invalid)),
        (Some(""), Some(&array)),
    ] {
        let step = sequencer
            .update_step_settings(OFFER, created.id, name, settings)
            .unwrap();
        assert_eq!(step, created);
    }
    assert_eq!(sequencer.store().writes, 0);

    let err = sequencer
        .update_step_settings(OFFER, 999, None, None)
        .unwrap_err();
    assert!(matches!(err, BackofficeError::StepNotFound { id: 999 }));
}

#[test]
fn test_update_settings_replaces_document() {
    let (mut sequencer, steps) = seeded(1);
    sequencer
        .update_step_settings(
            OFFER,
            steps[0].id,
            None,
            Some(&SettingsInput::from(json!({"a": 1, "b": 2}))),
        )
        .unwrap();

    let encoded = SettingsInput::Encoded(r#"{"c": 3}"#.to_string());
    let updated = sequencer
        .update_step_settings(OFFER, steps[0].id, Some(" Intro "), Some(&encoded))
        .unwrap();
    assert_eq!(updated.settings, json!({"c": 3}));
    assert_eq!(updated.name, "Intro");
}

#[test]
fn test_delete_first_step_is_protected() {
    let (mut sequencer, steps) = seeded(3);

    let err = sequencer.delete_step(OFFER, steps[0].id).unwrap_err();
    assert!(matches!(err, BackofficeError::ProtectedStep { id } if id == steps[0].id));
    assert_eq!(sequencer.list_steps(OFFER).unwrap().len(), 3);
}

#[test]
fn test_delete_protection_follows_current_number() {
    let (mut sequencer, steps) = seeded(3);
    sequencer
        .reorder_steps(OFFER, &[steps[2].id, steps[0].id, steps[1].id])
        .unwrap();

    // The original first step is now number 2 and may go
    sequencer.delete_step(OFFER, steps[0].id).unwrap();
    let err = sequencer.delete_step(OFFER, steps[2].id).unwrap_err();
    assert!(matches!(err, BackofficeError::ProtectedStep { .. }));
}

#[test]
fn test_delete_renumbers_remaining_steps() {
    let (mut sequencer, steps) = seeded(5);

    sequencer.delete_step(OFFER, steps[1].id).unwrap();
    sequencer.delete_step(OFFER, steps[3].id).unwrap();

    assert_eq!(
        numbers(&sequencer),
        vec![(steps[0].id, 1), (steps[2].id, 2), (steps[4].id, 3)]
    );
    assert_eq!(sequencer.next_sequence_number(OFFER).unwrap(), 4);
}

#[test]
fn test_delete_missing_or_foreign_step() {
    let (mut sequencer, steps) = seeded(2);

    let err = sequencer.delete_step(OFFER, 12345).unwrap_err();
    assert!(err.is_not_found());

    let err = sequencer.delete_step(OFFER + 1, steps[1].id).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(sequencer.list_steps(OFFER).unwrap().len(), 2);
}

#[test]
fn test_reorder_assigns_list_positions() {
    let (mut sequencer, steps) = seeded(3);
    let (a, b, c) = (steps[0].id, steps[1].id, steps[2].id);

    sequencer.reorder_steps(OFFER, &[c, a, b]).unwrap();
    assert_eq!(numbers(&sequencer), vec![(c, 1), (a, 2), (b, 3)]);

    sequencer.reorder_steps(OFFER, &[a, b, c]).unwrap();
    assert_eq!(numbers(&sequencer), vec![(a, 1), (b, 2), (c, 3)]);
}

#[test]
fn test_reorder_rejects_malformed_lists() {
    let (mut sequencer, steps) = seeded(3);
    let (a, b, c) = (steps[0].id, steps[1].id, steps[2].id);

    for ids in [vec![], vec![a, b], vec![a, a, b, c]] {
        let err = sequencer.reorder_steps(OFFER, &ids).unwrap_err();
        assert!(
            matches!(err, BackofficeError::InvalidInput { .. }),
            "{ids:?} gave {err:?}"
        );
    }

    let err = sequencer.reorder_steps(OFFER, &[a, b, 999]).unwrap_err();
    assert!(matches!(err, BackofficeError::StepNotFound { id: 999 }));

    assert_eq!(numbers(&sequencer), vec![(a, 1), (b, 2), (c, 3)]);
}

#[test]
fn test_reorder_closes_gaps() {
    let (mut sequencer, steps) = seeded(3);
    // Leave a gap at 2 without renumbering
    sequencer.store_mut().delete_by_id(OFFER, steps[1].id).unwrap();

    sequencer
        .reorder_steps(OFFER, &[steps[2].id, steps[0].id])
        .unwrap();
    assert_eq!(numbers(&sequencer), vec![(steps[2].id, 1), (steps[0].id, 2)]);
}

#[test]
fn test_list_steps_is_idempotent() {
    let (sequencer, _) = seeded(4);
    assert_eq!(
        sequencer.list_steps(OFFER).unwrap(),
        sequencer.list_steps(OFFER).unwrap()
    );
    assert!(sequencer.list_steps(OFFER + 1).unwrap().is_empty());
}

#[test]
fn test_ensure_first_step() {
    let mut sequencer = sequencer();

    let created = sequencer.ensure_first_step(OFFER).unwrap();
    assert_eq!(created.step_no, 1);
    assert_eq!(created.name, "Step 1");

    let again = sequencer.ensure_first_step(OFFER).unwrap();
    assert_eq!(again.id, created.id);
    assert_eq!(sequencer.list_steps(OFFER).unwrap().len(), 1);
}

#[test]
fn test_clear_steps_removes_first_step_too() {
    let (mut sequencer, _) = seeded(3);
    sequencer.insert_step(OFFER + 1, &StepDraft::default()).unwrap();

    assert_eq!(sequencer.clear_steps(OFFER).unwrap(), 3);
    assert!(sequencer.list_steps(OFFER).unwrap().is_empty());
    assert_eq!(sequencer.list_steps(OFFER + 1).unwrap().len(), 1);
    assert_eq!(sequencer.clear_steps(OFFER).unwrap(), 0);
}
