mod entry;
mod ids;
mod settings;
mod topic;

pub use ids::{EntryId, ParseIdError, ProjectId, TopicId, UserId};

pub use entry::{AiStatus, Entry, EntryError, EntryStatus, EntryTarget};
pub use settings::{ViewSettings, ViewSettingsDraft, ViewSettingsError};
pub use topic::{Mastery, Topic, TopicError};
