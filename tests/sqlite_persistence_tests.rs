#![cfg(feature = "sqlite")]

use chrono::NaiveDate;
use hatim_planner::{HatimId, HatimPatch, HatimRepository, NewHatim, Participant, SqliteHatimRepository};
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn sqlite_repository_round_trip_hatim() {
    let file = NamedTempFile::new().unwrap();
    let repo = SqliteHatimRepository::new(file.path()).unwrap();

    let mut draft = NewHatim::named("SQLite Hatmi", Some("user-1".into()));
    draft.start_date = Some(d(2025, 3, 1));
    draft.end_date = Some(d(2025, 3, 30));
    let mut ali = Participant::new("Ali", 20);
    ali.toggle_checked_day(d(2025, 3, 2));
    draft.participants = vec![ali, Participant::new("Ayşe", 30)];

    let inserted = repo.insert(&draft).expect("insert hatim");
    assert!(matches!(inserted.id, HatimId::Remote(_)));

    // reopen to make sure everything reached the file
    drop(repo);
    let repo = SqliteHatimRepository::new(file.path()).unwrap();
    let loaded = repo
        .get_by_id(inserted.id.as_str())
        .expect("load hatim")
        .expect("hatim exists");

    assert_eq!(loaded.name, "SQLite Hatmi");
    assert_eq!(loaded.start_date, Some(d(2025, 3, 1)));
    assert_eq!(loaded.end_date, Some(d(2025, 3, 30)));
    assert_eq!(loaded.owner.as_deref(), Some("user-1"));
    assert_eq!(loaded.participants, inserted.participants);
    assert_eq!(
        loaded.created.timestamp_micros(),
        inserted.created.timestamp_micros()
    );
}

#[test]
fn list_by_owner_is_newest_first() {
    let repo = SqliteHatimRepository::in_memory().unwrap();
    let first = repo.insert(&NewHatim::named("Birinci", Some("u1".into()))).unwrap();
    let second = repo.insert(&NewHatim::named("İkinci", Some("u1".into()))).unwrap();
    repo.insert(&NewHatim::named("Başkası", Some("u2".into()))).unwrap();

    let listed = repo.list_by_owner("u1").unwrap();
    let ids: Vec<_> = listed.iter().map(|h| h.id.clone()).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert!(repo.list_by_owner("nobody").unwrap().is_empty());
}

#[test]
fn partial_update_touches_only_given_columns() {
    let repo = SqliteHatimRepository::in_memory().unwrap();
    let mut draft = NewHatim::named("Hatim", Some("u1".into()));
    draft.start_date = Some(d(2025, 1, 1));
    draft.end_date = Some(d(2025, 1, 31));
    let hatim = repo.insert(&draft).unwrap();
    let id = hatim.id.as_str();

    repo.update(id, &HatimPatch::name("Yeni Ad")).unwrap();
    let loaded = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.name, "Yeni Ad");
    assert_eq!(loaded.start_date, Some(d(2025, 1, 1)));

    repo.update(id, &HatimPatch::dates(None, Some(d(2025, 2, 28))))
        .unwrap();
    repo.update(id, &HatimPatch::participants(vec![Participant::new("Ali", 10)]))
        .unwrap();
    let loaded = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.start_date, None);
    assert_eq!(loaded.end_date, Some(d(2025, 2, 28)));
    assert_eq!(loaded.participants.len(), 1);
    assert_eq!(loaded.name, "Yeni Ad");

    // empty patch and unknown ids are no-ops
    repo.update(id, &HatimPatch::default()).unwrap();
    repo.update("missing", &HatimPatch::name("x")).unwrap();
}

#[test]
fn delete_is_a_no_op_for_unknown_rows() {
    let repo = SqliteHatimRepository::in_memory().unwrap();
    let hatim = repo.insert(&NewHatim::named("Hatim", Some("u1".into()))).unwrap();

    repo.delete(hatim.id.as_str()).unwrap();
    assert!(repo.get_by_id(hatim.id.as_str()).unwrap().is_none());
    repo.delete(hatim.id.as_str()).unwrap();
}
