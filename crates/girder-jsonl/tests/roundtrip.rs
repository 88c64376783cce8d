//! Round-trip and resilience tests against real files.

use girder_jsonl::{read_jsonl, read_jsonl_resilient, write_jsonl_atomic};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Entry {
    user: String,
    entity_id: String,
    position: u32,
}

fn sample_entries(n: u32) -> Vec<Entry> {
    (0..n)
        .map(|i| Entry {
            user: format!("user-{}", i % 3),
            entity_id: format!("PROJ-{i}"),
            position: i,
        })
        .collect()
}

#[tokio::test]
async fn write_then_read_preserves_records_and_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("entries.jsonl");

    let entries = sample_entries(25);
    write_jsonl_atomic(&path, &entries).await.unwrap();

    let loaded: Vec<Entry> = read_jsonl(&path).await.unwrap();
    assert_eq!(loaded, entries);
}

#[tokio::test]
async fn rewrite_replaces_previous_contents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("entries.jsonl");

    write_jsonl_atomic(&path, &sample_entries(10)).await.unwrap();
    let smaller = sample_entries(3);
    write_jsonl_atomic(&path, &smaller).await.unwrap();

    let loaded: Vec<Entry> = read_jsonl(&path).await.unwrap();
    assert_eq!(loaded, smaller);
}

#[tokio::test]
async fn resilient_read_survives_corrupt_lines_between_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("entries.jsonl");

    let good = sample_entries(2);
    let mut contents = serde_json::to_string(&good[0]).unwrap();
    contents.push('\n');
    contents.push_str("{\"user\": \"truncated\n");
    contents.push_str(&serde_json::to_string(&good[1]).unwrap());
    contents.push('\n');
    tokio::fs::write(&path, contents).await.unwrap();

    let (loaded, warnings) = read_jsonl_resilient::<Entry, _>(&path).await.unwrap();
    assert_eq!(loaded, good);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].line_number(), 2);
}

#[tokio::test]
async fn resilient_read_of_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("never-written.jsonl");

    let result = read_jsonl_resilient::<Entry, _>(&path).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn unicode_survives_the_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("unicode.jsonl");

    let entries = vec![Entry {
        user: "u\u{4e16}\u{754c}".to_string(),
        entity_id: "PROJ-\u{1F600}".to_string(),
        position: 0,
    }];
    write_jsonl_atomic(&path, &entries).await.unwrap();

    let loaded: Vec<Entry> = read_jsonl(&path).await.unwrap();
    assert_eq!(loaded, entries);
}
