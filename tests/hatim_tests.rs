use chrono::NaiveDate;
use hatim_planner::{
    Hatim, HatimId, HatimPatch, NewHatim, Participant, ValidationError, calculate_reading_progress,
};
use serde_json::json;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_hatim() -> Hatim {
    let mut hatim = NewHatim::named("Ramazan Hatmi", None).into_hatim(HatimId::new_local());
    hatim.start_date = Some(d(2025, 3, 1));
    hatim.end_date = Some(d(2025, 3, 30));
    hatim.participants = vec![
        Participant::new("Ali Yılmaz", 20),
        Participant::new("Ayşe Demir", 20),
        Participant::new("Mehmet Kaya", 20),
    ];
    hatim
}

#[test]
fn ids_keep_their_origin() {
    let local = HatimId::new_local();
    assert!(local.is_local());
    assert!(local.as_str().starts_with("local_"));

    let parsed: HatimId = local.to_string().parse().unwrap();
    assert_eq!(parsed, local);

    let remote: HatimId = "6f1c2d3e-0000-4000-8000-000000000001".parse().unwrap();
    assert!(!remote.is_local());
    assert_eq!(
        remote,
        HatimId::Remote("6f1c2d3e-0000-4000-8000-000000000001".into())
    );

    let json = serde_json::to_string(&local).unwrap();
    assert_eq!(json, format!("\"{local}\""));
    let back: HatimId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, local);
}

#[test]
fn blank_name_falls_back_to_default() {
    let draft = NewHatim::named("   ", Some("user-1".into()));
    assert_eq!(draft.name, "Yeni Hatim");
    assert_eq!(draft.owner.as_deref(), Some("user-1"));
    assert!(draft.participants.is_empty());
    assert!(draft.start_date.is_none() && draft.end_date.is_none());
}

#[test]
fn legacy_local_records_deserialize() {
    let raw = json!({
        "id": "local_abc",
        "name": "Aile Hatmi",
        "startDate": "",
        "endDate": "2025-04-01",
        "participants": [{ "fullName": "Ali", "pages": 30 }],
        "created": "2025-02-01T08:30:00Z"
    });
    let hatim: Hatim = serde_json::from_value(raw).unwrap();
    assert_eq!(hatim.id, HatimId::Local("local_abc".into()));
    assert_eq!(hatim.start_date, None);
    assert_eq!(hatim.end_date, Some(d(2025, 4, 1)));
    assert_eq!(hatim.participants[0].full_name, "Ali");
    assert!(hatim.participants[0].checked_days.is_empty());
    assert_eq!(hatim.owner, None);

    let canonical = serde_json::to_value(&hatim).unwrap();
    assert_eq!(canonical["start_date"], serde_json::Value::Null);
    assert_eq!(canonical["end_date"], "2025-04-01");
    assert!(canonical.get("created_at").is_some());
}

#[test]
fn patch_distinguishes_absent_from_cleared() {
    let patch: HatimPatch = serde_json::from_value(json!({ "name": "Yeni Ad" })).unwrap();
    assert_eq!(patch.start_date, None);

    let patch: HatimPatch =
        serde_json::from_value(json!({ "start_date": null, "endDate": "" })).unwrap();
    assert_eq!(patch.start_date, Some(None));
    assert_eq!(patch.end_date, Some(None));

    let mut hatim = sample_hatim();
    hatim.apply(&patch);
    assert_eq!(hatim.start_date, None);
    assert_eq!(hatim.end_date, None);
    assert_eq!(hatim.name, "Ramazan Hatmi");

    assert!(HatimPatch::default().is_empty());
    assert!(!HatimPatch::name("x").is_empty());
}

#[test]
fn participant_editing_preserves_order_rules() {
    let mut hatim = sample_hatim();

    hatim.add_participant(Participant::new("Zeynep", 10)).unwrap();
    assert_eq!(hatim.participants.len(), 4);
    assert_eq!(
        hatim.add_participant(Participant::new("  ", 10)),
        Err(ValidationError::EmptyParticipantName)
    );

    hatim.move_participant(3, 0).unwrap();
    let names: Vec<_> = hatim.participants.iter().map(|p| p.full_name.as_str()).collect();
    assert_eq!(names, ["Zeynep", "Ali Yılmaz", "Ayşe Demir", "Mehmet Kaya"]);

    hatim.update_participant(0, "Zeynep Şahin", 15).unwrap();
    assert_eq!(hatim.participants[0].pages, 15);

    let removed = hatim.remove_participant(1).unwrap();
    assert_eq!(removed.full_name, "Ali Yılmaz");
    assert!(matches!(
        hatim.remove_participant(9),
        Err(ValidationError::UnknownParticipant { index: 9, len: 3 })
    ));
}

#[test]
fn checked_days_toggle_inside_the_range_only() {
    let mut hatim = sample_hatim();
    assert_eq!(hatim.toggle_checked_day(1, d(2025, 3, 5)), Ok(true));
    assert_eq!(hatim.toggle_checked_day(1, d(2025, 3, 2)), Ok(true));
    assert_eq!(
        hatim.participants[1].checked_days,
        vec![d(2025, 3, 2), d(2025, 3, 5)]
    );
    assert_eq!(hatim.toggle_checked_day(1, d(2025, 3, 5)), Ok(false));
    assert_eq!(hatim.participants[1].checked_days, vec![d(2025, 3, 2)]);

    assert!(matches!(
        hatim.toggle_checked_day(1, d(2025, 4, 1)),
        Err(ValidationError::DateOutsideRange { .. })
    ));

    // no range set: any day is accepted
    hatim.start_date = None;
    assert_eq!(hatim.toggle_checked_day(0, d(2030, 1, 1)), Ok(true));
}

#[test]
fn stored_checked_days_are_sorted_and_deduplicated() {
    let mut participant: Participant = serde_json::from_value(json!({
        "fullName": "Ali",
        "pages": 20,
        "checkedDays": ["2025-01-05", "2025-01-01", "2025-01-03", "2025-01-01"]
    }))
    .unwrap();
    assert_eq!(
        participant.checked_days,
        vec![d(2025, 1, 1), d(2025, 1, 3), d(2025, 1, 5)]
    );
    assert!(participant.is_checked(d(2025, 1, 5)));

    // toggling a stored day unchecks it instead of adding a repeat
    assert!(!participant.toggle_checked_day(d(2025, 1, 5)));
    assert_eq!(participant.checked_days, vec![d(2025, 1, 1), d(2025, 1, 3)]);

    let progress = calculate_reading_progress(&[participant], None, None);
    assert!((progress - 40.0 / 604.0 * 100.0).abs() < 1e-9);
}

#[test]
fn patch_participants_are_normalized_too() {
    let patch: HatimPatch = serde_json::from_value(json!({
        "participants": [
            { "fullName": "Ayşe", "pages": 10, "checkedDays": ["2025-03-04", "2025-03-02", "2025-03-04"] }
        ]
    }))
    .unwrap();
    let participants = patch.participants.unwrap();
    assert_eq!(
        participants[0].checked_days,
        vec![d(2025, 3, 2), d(2025, 3, 4)]
    );
}
