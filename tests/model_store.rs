use tempfile::TempDir;

use querymodel::{
    clock::StepClock,
    codec::{
        CodecError,
        grammar::{ATTRIBUTES, MODEL_ROW},
    },
    core::store::{ModelStore, StoreError},
    key::StoreMutation,
    mapping::{Attribute, FieldMapping},
    persist::{
        ModelTable, PersistError,
        memory::MemoryTable,
        sqlite::{SqliteModelTable, SqliteTableConfig, Synchronous},
    },
};

fn mappings() -> Vec<FieldMapping> {
    vec![
        FieldMapping::forward("NAME_FIRST", "FIRST_NAME")
            .with_datatype("csv")
            .with_visibility("PUBLIC"),
        FieldMapping::forward("NAME_LAST", "LAST_NAME").with_index_only(true),
        FieldMapping::reverse("NAME_FIRST", "FIRST_NAME").with_datatype("csv"),
        FieldMapping::strict("FIRST_NAME"),
        FieldMapping::model_attribute(Attribute::version("3.1")),
    ]
}

fn sorted(mut v: Vec<FieldMapping>) -> Vec<FieldMapping> {
    v.sort_by_key(|m| format!("{m:?}"));
    v
}

fn exercise_put_load_delete<T: ModelTable>(table: T) -> T {
    let mut store = ModelStore::with_clock(table, StepClock::new(1_000, 1));
    for m in mappings() {
        store.put_mapping("PEOPLE", &m).unwrap();
    }
    store
        .put_mapping("PLACES", &FieldMapping::forward("GEO", "LOCATION"))
        .unwrap();

    assert_eq!(sorted(store.load_model("PEOPLE").unwrap()), sorted(mappings()));
    assert_eq!(store.model_names().unwrap(), vec!["PEOPLE", "PLACES"]);

    let grouped = store.mappings_by_model().unwrap();
    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped["PEOPLE"].len(), 5);
    assert_eq!(grouped["PLACES"], vec![FieldMapping::forward("GEO", "LOCATION")]);

    // Deleting the plain forward mapping also clears the index-only cell.
    store
        .delete_mapping("PEOPLE", &FieldMapping::forward("NAME_LAST", "LAST_NAME"))
        .unwrap();
    store
        .delete_mapping("PEOPLE", &FieldMapping::strict("FIRST_NAME"))
        .unwrap();
    store
        .delete_mapping("PEOPLE", &FieldMapping::model_attribute(Attribute::version("3.1")))
        .unwrap();

    let remaining = sorted(store.load_model("PEOPLE").unwrap());
    assert_eq!(remaining, sorted(mappings()[..1].iter().chain(&mappings()[2..3]).cloned().collect()));
    store.into_table()
}

#[test]
fn memory_table_put_load_delete() {
    let table = exercise_put_load_delete(MemoryTable::new());
    assert!(table.version_count() > table.scan().unwrap().len());
}

#[test]
fn sqlite_table_put_load_delete() {
    exercise_put_load_delete(SqliteModelTable::open_in_memory().unwrap());
}

#[test]
fn sqlite_reopen_preserves_model() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("model.db");

    let table = SqliteModelTable::open(&db_path).expect("open sqlite");
    let mut store = ModelStore::with_clock(table, StepClock::new(10, 1));
    store.put_mappings("PEOPLE", &mappings()).expect("put");
    store
        .delete_mapping("PEOPLE", &FieldMapping::strict("FIRST_NAME"))
        .expect("delete");
    drop(store);

    let config = SqliteTableConfig {
        wal: false,
        synchronous: Synchronous::Full,
    };
    let reopened = SqliteModelTable::open_with_config(&db_path, &config).expect("reopen");
    let store = ModelStore::new(reopened);
    let loaded = sorted(store.load_model("PEOPLE").expect("load"));
    let expected: Vec<_> = mappings().into_iter().filter(|m| !m.is_strict()).collect();
    assert_eq!(loaded, sorted(expected));
}

#[test]
fn sqlite_compaction_keeps_live_cells() {
    let mut table = SqliteModelTable::open_in_memory().unwrap();
    let mut m = StoreMutation::new("FIRST_NAME");
    m.put("PEOPLE", "NAME\0forward", "", 1, b"".to_vec());
    m.put("PEOPLE", "NAME\0forward", "", 2, b"".to_vec());
    m.put_delete("PEOPLE", "OLD\0forward", "", 3);
    table.apply(&m).unwrap();
    assert_eq!(table.version_count().unwrap(), 3);

    let removed = table.compact().unwrap();
    assert_eq!(removed, 2);
    let live = table.scan().unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].key.timestamp, 2);
}

#[test]
fn sqlite_delete_hides_put_at_same_timestamp() {
    let mut table = SqliteModelTable::open_in_memory().unwrap();
    let mut put = StoreMutation::new(MODEL_ROW);
    put.put("PEOPLE", "version", "", 5, b"1".to_vec());
    table.apply(&put).unwrap();
    let mut delete = StoreMutation::new(MODEL_ROW);
    delete.put_delete("PEOPLE", "version", "", 5);
    table.apply(&delete).unwrap();
    assert!(table.scan().unwrap().is_empty());
}

#[test]
fn invalid_mapping_writes_nothing() {
    let mut store = ModelStore::with_clock(MemoryTable::new(), StepClock::new(1, 1));
    let batch = vec![
        FieldMapping::forward("A", "B"),
        FieldMapping::reverse("C", "D").with_index_only(true),
    ];
    let err = store.put_mappings("PEOPLE", &batch).unwrap_err();
    assert!(matches!(err, StoreError::Codec(_)));
    assert!(store.table().scan().unwrap().is_empty());
    assert_eq!(store.clock().reads(), 1);
}

#[test]
fn corrupt_entry_fails_the_load() {
    let mut store = ModelStore::with_clock(MemoryTable::new(), StepClock::new(1, 1));
    store.put_mapping("PEOPLE", &FieldMapping::forward("A", "B")).unwrap();
    let mut bad = StoreMutation::new("B");
    bad.put("PEOPLE", "A\0sideways", "", 9, b"".to_vec());
    store.table_mut().apply(&bad).unwrap();

    let err = store.load_model("PEOPLE").unwrap_err();
    assert!(matches!(err, StoreError::Codec(_)));
    assert!(store.load_model("OTHER").unwrap().is_empty());
}

#[test]
fn legacy_strict_cell_survives_export_import_and_delete() {
    let mut store = ModelStore::with_clock(MemoryTable::new(), StepClock::new(10, 1));
    let mut legacy = StoreMutation::new("FIRST_NAME");
    legacy.put("PEOPLE", ATTRIBUTES, "", 1, b"strict".to_vec());
    store.table_mut().apply(&legacy).unwrap();

    let loaded = store.load_model("PEOPLE").unwrap();
    assert_eq!(loaded, vec![FieldMapping::strict("FIRST_NAME")]);

    let doc = store.export_document("PEOPLE").unwrap();
    let mut copy = ModelStore::with_clock(MemoryTable::new(), StepClock::new(10, 1));
    copy.import_document(&doc).unwrap();
    assert_eq!(copy.load_model("PEOPLE").unwrap(), loaded);

    store.delete_mapping("PEOPLE", &loaded[0]).unwrap();
    assert!(store.load_model("PEOPLE").unwrap().is_empty());
}

#[test]
fn legacy_non_strict_field_cell_fails_the_export() {
    let mut store = ModelStore::with_clock(MemoryTable::new(), StepClock::new(10, 1));
    let mut legacy = StoreMutation::new("FIRST_NAME");
    legacy.put("PEOPLE", ATTRIBUTES, "", 1, b"version=VER".to_vec());
    store.table_mut().apply(&legacy).unwrap();

    assert!(matches!(
        store.export_document("PEOPLE"),
        Err(StoreError::Codec(CodecError::InvalidKeyFormat { .. }))
    ));
}

#[test]
fn sqlite_rejects_timestamps_beyond_its_range() {
    let mut table = SqliteModelTable::open_in_memory().unwrap();
    let mut m = StoreMutation::new("FIRST_NAME");
    m.put("PEOPLE", "NAME_FIRST\0forward", "", 1, b"".to_vec());
    m.put("PEOPLE", "NAME_LAST\0forward", "", u64::MAX, b"".to_vec());

    assert!(matches!(table.apply(&m), Err(PersistError::Corrupt(_))));
    assert!(table.scan().unwrap().is_empty());
    assert_eq!(table.version_count().unwrap(), 0);
}
