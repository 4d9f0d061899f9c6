use fhirstore_core::db::open_db;
use fhirstore_core::{FhirResource, ResourceStore, StoreError};
use serde_json::json;
use std::sync::Barrier;
use std::thread;

const CALLERS: usize = 8;

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Inserted,
    AlreadyExists,
}

#[test]
fn concurrent_inserts_with_same_key_admit_exactly_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("concurrent.db");
    drop(open_db(&path).unwrap());

    let barrier = Barrier::new(CALLERS);
    let outcomes: Vec<Outcome> = thread::scope(|scope| {
        let handles: Vec<_> = (0..CALLERS)
            .map(|caller| {
                let path = &path;
                let barrier = &barrier;
                scope.spawn(move || {
                    let conn = open_db(path).unwrap();
                    let store = ResourceStore::sqlite_json(&conn).unwrap();
                    let patient = FhirResource::with_id("Patient", "shared")
                        .with_element("caller", json!(caller));

                    barrier.wait();
                    match store.insert(&patient) {
                        Ok(()) => Outcome::Inserted,
                        Err(StoreError::AlreadyExists(_)) => Outcome::AlreadyExists,
                        Err(other) => panic!("caller {caller} failed unexpectedly: {other}"),
                    }
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    let inserted = outcomes
        .iter()
        .filter(|outcome| **outcome == Outcome::Inserted)
        .count();
    assert_eq!(inserted, 1);
    assert_eq!(outcomes.len() - inserted, CALLERS - 1);

    let conn = open_db(&path).unwrap();
    let rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM resources WHERE resource_type = 'Patient' AND resource_id = 'shared';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, 1);

    let store = ResourceStore::sqlite_json(&conn).unwrap();
    let winner: FhirResource = store.select("Patient", "shared").unwrap();
    assert!(winner.element("caller").is_some());
}

#[test]
fn readers_see_whole_records_while_writers_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("interleave.db");
    drop(open_db(&path).unwrap());

    thread::scope(|scope| {
        let writer_path = &path;
        scope.spawn(move || {
            let conn = open_db(writer_path).unwrap();
            let store = ResourceStore::sqlite_json(&conn).unwrap();
            for n in 0..50 {
                let observation = FhirResource::with_id("Observation", format!("obs-{n}"))
                    .with_element("valueInteger", json!(n));
                store.insert(&observation).unwrap();
            }
        });

        let reader_path = &path;
        scope.spawn(move || {
            let conn = open_db(reader_path).unwrap();
            let store = ResourceStore::sqlite_json(&conn).unwrap();
            for n in 0..50 {
                let id = format!("obs-{n}");
                match store.select::<FhirResource>("Observation", &id) {
                    Ok(found) => assert_eq!(found.element("valueInteger"), Some(&json!(n))),
                    Err(StoreError::NotFound(_)) => {}
                    Err(other) => panic!("reader failed on {id}: {other}"),
                }
            }
        });
    });
}
