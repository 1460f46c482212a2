use storage::{InMemorySnapshot, SnapshotSource};
use tracker_core::model::{EntryStatus, EntryTarget, ProjectId, TopicId};

const SNAPSHOT: &str = r#"{
    "topics": [
        { "id": 1, "name": "Frontend", "benchmark_hours": 5.0 },
        { "id": 2, "parent_id": 1, "name": "React", "benchmark_hours": 7.0,
          "mastery": { "progress": 60.0, "total_hours": 4.5 } },
        { "id": 3, "parent_id": 1, "name": "CSS", "benchmark_hours": 3.0, "is_active": false }
    ],
    "entries": [
        { "id": 42, "user_id": 7, "topic_id": 2, "hours": 1.5, "progress_percent": 30.0,
          "status": "flagged", "date": "2024-03-01" },
        { "id": 43, "user_id": 7, "project_id": 9, "hours": 2.0, "date": "2024-03-02" }
    ]
}"#;

#[tokio::test]
async fn json_snapshot_loads_topics_and_entries() {
    let source = InMemorySnapshot::from_json(SNAPSHOT).expect("parse");

    let topics = source.fetch_topics().await.expect("topics");
    assert_eq!(topics.len(), 3);
    let react = topics.iter().find(|t| t.id() == TopicId::new(2)).unwrap();
    assert_eq!(react.parent_id(), Some(TopicId::new(1)));
    assert_eq!(react.stored_progress(), 60.0);
    assert!(!topics.iter().find(|t| t.id() == TopicId::new(3)).unwrap().is_active());

    let entries = source.fetch_entries().await.expect("entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].status(), EntryStatus::Flagged);
    assert_eq!(entries[1].target(), EntryTarget::Project(ProjectId::new(9)));
    assert!(!entries[1].is_completed());
}

#[tokio::test]
async fn exported_snapshot_can_be_reloaded() {
    let source = InMemorySnapshot::from_json(SNAPSHOT).expect("parse");
    let exported = source.to_json().expect("export");
    let reloaded = InMemorySnapshot::from_json(&exported).expect("reparse");

    assert_eq!(
        source.fetch_topics().await.unwrap(),
        reloaded.fetch_topics().await.unwrap()
    );
    assert_eq!(
        source.fetch_entries().await.unwrap(),
        reloaded.fetch_entries().await.unwrap()
    );
}

#[tokio::test]
async fn entry_with_both_targets_is_rejected() {
    let raw = r#"{ "entries": [
        { "id": 5, "user_id": 1, "topic_id": 1, "project_id": 1, "hours": 1.0, "date": "2024-01-01" }
    ] }"#;
    let err = InMemorySnapshot::from_json(raw).err().expect("should fail");
    assert!(err.to_string().contains("entry 5"));
}
