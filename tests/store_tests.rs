//! Integration tests for the credvault record store.

use std::thread::sleep;
use std::time::Duration;

use credvault::crypto::{KeyMaterial, RevealedSecret, SecretCodec, FAILURE_PLACEHOLDER};
use credvault::errors::VaultError;
use credvault::vault::{NewRecord, RecordStore, RecordUpdate, SecretField, DEFAULT_CATEGORY};
use regex::Regex;
use tempfile::TempDir;
use zeroize::Zeroizing;

fn codec() -> SecretCodec {
    SecretCodec::new(KeyMaterial::from_bytes([0x5A; 32]))
}

/// Helper: a store backed by a file inside a fresh temp dir.
fn store() -> (TempDir, RecordStore) {
    let dir = TempDir::new().expect("create temp dir");
    let store = RecordStore::open(&dir.path().join("vault.db"), codec()).expect("open store");
    (dir, store)
}

fn is_envelope(s: &str) -> bool {
    Regex::new("(?i)^[0-9a-f]{32}:[0-9a-f]+$")
        .unwrap()
        .is_match(s)
}

// ---------------------------------------------------------------------------
// Create and fetch
// ---------------------------------------------------------------------------

#[test]
fn create_then_fetch_reveals_password() {
    let (_dir, store) = store();

    let record = store
        .create(
            "alice",
            NewRecord::new("Mail", "alice@example.com", "Tr0ub4dor&3"),
        )
        .unwrap();
    let id = record.id.unwrap();

    let raw = store.raw_secret("alice", id).unwrap();
    assert!(is_envelope(&raw), "stored field is not an envelope: {raw}");
    assert!(!raw.contains("Tr0ub4dor"));

    let fetched = store.get("alice", id).unwrap();
    assert_eq!(store.reveal(&fetched).as_plaintext(), Some("Tr0ub4dor&3"));
    assert_eq!(fetched.category, DEFAULT_CATEGORY);
}

#[test]
fn records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vault.db");

    let id = {
        let store = RecordStore::open(&path, codec()).unwrap();
        store
            .create("alice", NewRecord::new("Bank", "alice", "s3cure"))
            .unwrap()
            .id
            .unwrap()
    };

    let store = RecordStore::open(&path, codec()).unwrap();
    let record = store.get("alice", id).unwrap();
    assert_eq!(store.reveal(&record).as_plaintext(), Some("s3cure"));
}

#[test]
fn reopen_with_other_key_fails_soft() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vault.db");

    {
        let store = RecordStore::open(&path, codec()).unwrap();
        store
            .create("alice", NewRecord::new("Bank", "alice", "s3cure"))
            .unwrap();
    }

    let other = SecretCodec::new(KeyMaterial::from_bytes([0x00; 32]));
    let store = RecordStore::open(&path, other).unwrap();
    let records = store.list("alice").unwrap();
    assert_eq!(records.len(), 1);
    assert_ne!(store.view(&records[0]).password, "s3cure");
}

// ---------------------------------------------------------------------------
// Idempotent re-save
// ---------------------------------------------------------------------------

#[test]
fn resave_does_not_reencrypt() {
    let (_dir, store) = store();
    let mut record = store
        .create("alice", NewRecord::new("Git", "octo", "pw"))
        .unwrap();
    let id = record.id.unwrap();
    let first = store.raw_secret("alice", id).unwrap();

    store.save(&mut record).unwrap();
    store.save(&mut record).unwrap();

    assert_eq!(store.raw_secret("alice", id).unwrap(), first);
}

#[test]
fn category_only_update_keeps_secret_bytes() {
    let (_dir, store) = store();
    let id = store
        .create("alice", NewRecord::new("Git", "octo", "pw"))
        .unwrap()
        .id
        .unwrap();
    let before = store.raw_secret("alice", id).unwrap();

    let updated = store
        .update(
            "alice",
            id,
            RecordUpdate {
                category: Some("Work".into()),
                ..RecordUpdate::default()
            },
        )
        .unwrap();

    assert_eq!(updated.category, "Work");
    assert_eq!(store.raw_secret("alice", id).unwrap(), before);
}

#[test]
fn password_update_reencrypts() {
    let (_dir, store) = store();
    let id = store
        .create("alice", NewRecord::new("Git", "octo", "old-pw"))
        .unwrap()
        .id
        .unwrap();
    let before = store.raw_secret("alice", id).unwrap();

    store
        .update(
            "alice",
            id,
            RecordUpdate {
                password: Some(Zeroizing::new("new-pw".into())),
                ..RecordUpdate::default()
            },
        )
        .unwrap();

    let after = store.raw_secret("alice", id).unwrap();
    assert_ne!(after, before);
    assert!(is_envelope(&after));
    let record = store.get("alice", id).unwrap();
    assert_eq!(store.reveal(&record).as_plaintext(), Some("new-pw"));
}

#[test]
fn update_bumps_last_updated() {
    let (_dir, store) = store();
    let created = store
        .create("alice", NewRecord::new("Git", "octo", "pw"))
        .unwrap();
    sleep(Duration::from_millis(5));

    let updated = store
        .update(
            "alice",
            created.id.unwrap(),
            RecordUpdate {
                notes: Some("rotated".into()),
                ..RecordUpdate::default()
            },
        )
        .unwrap();
    assert!(updated.last_updated > created.last_updated);
    assert_eq!(updated.notes, "rotated");
}

#[test]
fn empty_update_still_touches_record() {
    let (_dir, store) = store();
    let created = store
        .create("alice", NewRecord::new("Git", "octo", "pw"))
        .unwrap();
    let id = created.id.unwrap();
    let before = store.raw_secret("alice", id).unwrap();
    sleep(Duration::from_millis(5));

    let touched = store.update("alice", id, RecordUpdate::default()).unwrap();
    assert!(touched.last_updated > created.last_updated);
    assert_eq!(store.raw_secret("alice", id).unwrap(), before);
}

// ---------------------------------------------------------------------------
// Legacy rows
// ---------------------------------------------------------------------------

#[test]
fn legacy_plaintext_row_reads_back_unchanged() {
    let (_dir, store) = store();
    let id = store
        .import_legacy("alice", NewRecord::new("Old", "alice", "OldPass1"))
        .unwrap()
        .id
        .unwrap();

    assert_eq!(store.raw_secret("alice", id).unwrap(), "OldPass1");

    let record = store.get("alice", id).unwrap();
    assert_eq!(
        store.reveal(&record),
        RevealedSecret::Legacy("OldPass1".into())
    );
}

#[test]
fn legacy_row_stays_plaintext_on_unrelated_update() {
    let (_dir, store) = store();
    let id = store
        .import_legacy("alice", NewRecord::new("Old", "alice", "OldPass1"))
        .unwrap()
        .id
        .unwrap();

    store
        .update(
            "alice",
            id,
            RecordUpdate {
                title: Some("Renamed".into()),
                ..RecordUpdate::default()
            },
        )
        .unwrap();

    assert_eq!(store.raw_secret("alice", id).unwrap(), "OldPass1");
}

#[test]
fn legacy_row_is_encrypted_once_password_changes() {
    let (_dir, store) = store();
    let id = store
        .import_legacy("alice", NewRecord::new("Old", "alice", "OldPass1"))
        .unwrap()
        .id
        .unwrap();

    store
        .update(
            "alice",
            id,
            RecordUpdate {
                password: Some(Zeroizing::new("NewPass2".into())),
                ..RecordUpdate::default()
            },
        )
        .unwrap();

    assert!(is_envelope(&store.raw_secret("alice", id).unwrap()));
}

// ---------------------------------------------------------------------------
// Fail-soft reads
// ---------------------------------------------------------------------------

#[test]
fn corrupt_row_does_not_break_listing() {
    let (_dir, store) = store();
    store
        .create("alice", NewRecord::new("Good", "alice", "fine"))
        .unwrap();
    let mut bad = store
        .create("alice", NewRecord::new("Bad", "alice", "doomed"))
        .unwrap();

    bad.secret = SecretField::Stored("deadbeef:zz".into());
    store.save(&mut bad).unwrap();

    let views: Vec<_> = store
        .list("alice")
        .unwrap()
        .iter()
        .map(|r| store.view(r))
        .collect();
    assert_eq!(views.len(), 2);

    let bad_view = views.iter().find(|v| v.title == "Bad").unwrap();
    assert!(bad_view.decryption_failed);
    assert_eq!(bad_view.password, FAILURE_PLACEHOLDER);

    let good_view = views.iter().find(|v| v.title == "Good").unwrap();
    assert!(!good_view.decryption_failed);
    assert_eq!(good_view.password, "fine");
}

#[test]
fn envelope_shaped_password_is_stored_verbatim() {
    let (_dir, store) = store();
    let existing = store.codec().encrypt("inner").unwrap();

    let id = store
        .create("alice", NewRecord::new("Copy", "alice", &existing))
        .unwrap()
        .id
        .unwrap();

    assert_eq!(store.raw_secret("alice", id).unwrap(), existing);
    let record = store.get("alice", id).unwrap();
    assert_eq!(store.reveal(&record).as_plaintext(), Some("inner"));
}

#[test]
fn hex_prefixed_password_is_encrypted() {
    let (_dir, store) = store();
    let id = store
        .create("alice", NewRecord::new("Cafe", "alice", "cafe:latte"))
        .unwrap()
        .id
        .unwrap();

    let raw = store.raw_secret("alice", id).unwrap();
    assert!(is_envelope(&raw), "password persisted unencrypted: {raw}");

    let view = store.view(&store.get("alice", id).unwrap());
    assert!(!view.decryption_failed);
    assert_eq!(view.password, "cafe:latte");
}

// ---------------------------------------------------------------------------
// Ownership, listing, search, delete
// ---------------------------------------------------------------------------

#[test]
fn owners_cannot_see_each_other() {
    let (_dir, store) = store();
    let id = store
        .create("alice", NewRecord::new("Mail", "alice", "pw"))
        .unwrap()
        .id
        .unwrap();

    assert!(matches!(
        store.get("bob", id),
        Err(VaultError::RecordNotFound(_))
    ));
    assert!(store.list("bob").unwrap().is_empty());
    assert!(store.delete("bob", id).is_err());
    assert!(store
        .update("bob", id, RecordUpdate::default())
        .is_err());
    assert_eq!(store.count("alice").unwrap(), 1);
}

#[test]
fn list_is_newest_first() {
    let (_dir, store) = store();
    for title in ["first", "second", "third"] {
        store
            .create("alice", NewRecord::new(title, "u", "pw"))
            .unwrap();
        sleep(Duration::from_millis(2));
    }

    let titles: Vec<String> = store
        .list("alice")
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(titles, ["third", "second", "first"]);
}

#[test]
fn list_by_category_filters() {
    let (_dir, store) = store();
    store
        .create("alice", NewRecord::new("A", "u", "pw").category("Work"))
        .unwrap();
    store
        .create("alice", NewRecord::new("B", "u", "pw"))
        .unwrap();

    let work = store.list_by_category("alice", "Work").unwrap();
    assert_eq!(work.len(), 1);
    assert_eq!(work[0].title, "A");

    let general = store.list_by_category("alice", DEFAULT_CATEGORY).unwrap();
    assert_eq!(general.len(), 1);
    assert_eq!(general[0].title, "B");
}

#[test]
fn search_matches_text_fields_case_insensitively() {
    let (_dir, store) = store();
    store
        .create(
            "alice",
            NewRecord::new("GitHub", "octocat", "pw").website("https://github.com"),
        )
        .unwrap();
    store
        .create(
            "alice",
            NewRecord::new("Bank", "alice", "pw").notes("savings account"),
        )
        .unwrap();

    assert_eq!(store.search("alice", "github").unwrap().len(), 1);
    assert_eq!(store.search("alice", "SAVINGS").unwrap().len(), 1);
    assert_eq!(store.search("alice", "OCTO").unwrap().len(), 1);
    assert!(store.search("alice", "nothing").unwrap().is_empty());
    // Regex metacharacters are matched literally.
    assert!(store.search("alice", ".*").unwrap().is_empty());
}

#[test]
fn search_never_matches_password() {
    let (_dir, store) = store();
    store
        .create("alice", NewRecord::new("T", "u", "needle"))
        .unwrap();
    assert!(store.search("alice", "needle").unwrap().is_empty());
}

#[test]
fn delete_removes_record() {
    let (_dir, store) = store();
    let id = store
        .create("alice", NewRecord::new("T", "u", "pw"))
        .unwrap()
        .id
        .unwrap();

    store.delete("alice", id).unwrap();
    assert!(matches!(
        store.get("alice", id),
        Err(VaultError::RecordNotFound(_))
    ));
    assert!(matches!(
        store.delete("alice", id),
        Err(VaultError::RecordNotFound(_))
    ));
}

#[test]
fn validation_errors_surface() {
    let (_dir, store) = store();
    let result = store.create("alice", NewRecord::new("T", "", "pw"));
    assert!(matches!(result, Err(VaultError::Validation(_))));
}
