use hatim_planner::{
    HatimId, HatimPatch, LocalHatims, LocalStorage, NewHatim, Participant,
    persistence::LOCAL_HATIMS_KEY,
};
use tempfile::tempdir;

fn guest_hatim(name: &str) -> hatim_planner::Hatim {
    NewHatim::named(name, None).into_hatim(HatimId::new_local())
}

#[test]
fn missing_file_reads_as_empty() {
    let dir = tempdir().unwrap();
    let storage = LocalStorage::file(dir.path().join("nested").join("local.json"));
    assert_eq!(storage.get_item(LOCAL_HATIMS_KEY).unwrap(), None);

    let hatims = LocalHatims::new(storage);
    assert!(hatims.list().unwrap().is_empty());
}

#[test]
fn file_storage_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("local.json");

    let first = guest_hatim("Birinci");
    let second = guest_hatim("İkinci");
    {
        let hatims = LocalHatims::new(LocalStorage::file(&path));
        hatims.insert(&first).unwrap();
        hatims.insert(&second).unwrap();
        hatims
            .update(
                &first.id,
                &HatimPatch::participants(vec![Participant::new("Ali", 20)]),
            )
            .unwrap();
    }

    let hatims = LocalHatims::new(LocalStorage::file(&path));
    let listed = hatims.list().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].participants[0].full_name, "Ali");

    // the raw value is the JSON array under the well-known key
    let raw = LocalStorage::file(&path)
        .get_item(LOCAL_HATIMS_KEY)
        .unwrap()
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(2));
}

#[test]
fn unknown_ids_are_ignored() {
    let hatims = LocalHatims::new(LocalStorage::in_memory());
    let kept = guest_hatim("Kalıcı");
    hatims.insert(&kept).unwrap();

    let missing = HatimId::new_local();
    hatims.update(&missing, &HatimPatch::name("x")).unwrap();
    hatims.delete(&missing).unwrap();
    assert_eq!(hatims.list().unwrap(), vec![kept.clone()]);

    hatims.delete(&kept.id).unwrap();
    assert!(hatims.get(&kept.id).unwrap().is_none());
}

#[test]
fn clear_removes_the_list_and_bad_json_is_an_error() {
    let storage = LocalStorage::in_memory();
    storage
        .set_item(LOCAL_HATIMS_KEY, "not json".to_string())
        .unwrap();
    let hatims = LocalHatims::new(storage);
    assert!(hatims.list().is_err());

    hatims.clear().unwrap();
    assert!(hatims.list().unwrap().is_empty());
}

#[test]
fn file_writes_replace_the_file_whole() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("local.json");
    let hatims = LocalHatims::new(LocalStorage::file(&path));

    let first = guest_hatim("Birinci");
    hatims.insert(&first).unwrap();
    hatims.update(&first.id, &HatimPatch::name("Yeniden")).unwrap();
    hatims.insert(&guest_hatim("İkinci")).unwrap();

    // staged copies are renamed into place, never left behind
    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("local.json")]);

    let raw = std::fs::read_to_string(&path).unwrap();
    let parsed: std::collections::BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(hatims.list().unwrap()[1].name, "Yeniden");
}
