#![allow(dead_code)]

use chrono::Duration;
use tracker_core::model::{
    Entry, EntryId, EntryStatus, EntryTarget, Mastery, ProjectId, Topic, TopicId, UserId,
    ViewSettings, ViewSettingsDraft,
};
use tracker_core::time::fixed_today;

pub const REVIEWER: u64 = 7;

pub fn topic(id: u64, parent: Option<u64>, name: &str, hours: f64, progress: f64) -> Topic {
    Topic::new(TopicId::new(id), parent.map(TopicId::new), name, hours)
        .unwrap()
        .with_mastery(Some(Mastery::new(progress).unwrap()))
}

/// Frontend (React 20%, CSS 60%) plus an inactive Backend topic.
pub fn topics() -> Vec<Topic> {
    vec![
        topic(1, None, "Frontend", 0.0, 40.0),
        topic(2, Some(1), "React", 10.0, 20.0),
        topic(3, Some(1), "CSS", 5.0, 60.0),
        topic(4, None, "Backend", 8.0, 0.0).inactive(),
    ]
}

pub fn entry(id: u64, target: EntryTarget, days_ago: i64, status: EntryStatus) -> Entry {
    Entry::new(
        EntryId::new(id),
        UserId::new(REVIEWER),
        target,
        1.5,
        30.0,
        fixed_today() - Duration::days(days_ago),
    )
    .unwrap()
    .with_status(status)
}

pub fn entries() -> Vec<Entry> {
    let frontend = EntryTarget::Topic(TopicId::new(1));
    vec![
        entry(42, frontend, 1, EntryStatus::Flagged),
        entry(43, frontend, 3, EntryStatus::Approved),
        entry(44, EntryTarget::Topic(TopicId::new(4)), 10, EntryStatus::Pending),
        entry(45, EntryTarget::Project(ProjectId::new(9)), 0, EntryStatus::Pending),
        entry(46, EntryTarget::Topic(TopicId::new(2)), 5, EntryStatus::Rejected),
    ]
}

pub fn settings(page_size: usize, step: usize) -> ViewSettings {
    ViewSettingsDraft {
        default_page_size: Some(page_size),
        show_more_step: Some(step),
        ..ViewSettingsDraft::default()
    }
    .validate()
    .unwrap()
}
