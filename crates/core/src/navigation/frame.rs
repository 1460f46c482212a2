use crate::model::{EntryId, ProjectId, TopicId, UserId};
use crate::query::{Page, QueryState};

/// Which table or detail view a frame renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Topics,
    TopicEntries,
    Entries,
    UserEntries,
    ProjectEntries,
    EntryDetail,
}

/// Reference to one entity shown by a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Topic(TopicId),
    Entry(EntryId),
    User(UserId),
    Project(ProjectId),
}

/// What a frame displays: a list of rows or a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramePayload {
    List(Vec<EntityRef>),
    Detail(EntityRef),
}

/// One level of a drill-down view with its own filter/sort/page state.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationFrame {
    view_kind: ViewKind,
    title: String,
    payload: FramePayload,
    query: QueryState,
}

impl NavigationFrame {
    #[must_use]
    pub fn new(view_kind: ViewKind, title: impl Into<String>, payload: FramePayload) -> Self {
        Self {
            view_kind,
            title: title.into(),
            payload,
            query: QueryState::default(),
        }
    }

    #[must_use]
    pub fn list(view_kind: ViewKind, title: impl Into<String>, items: Vec<EntityRef>) -> Self {
        Self::new(view_kind, title, FramePayload::List(items))
    }

    #[must_use]
    pub fn detail(view_kind: ViewKind, title: impl Into<String>, item: EntityRef) -> Self {
        Self::new(view_kind, title, FramePayload::Detail(item))
    }

    #[must_use]
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.query.page = Page::prefix(size);
        self
    }

    #[must_use]
    pub fn view_kind(&self) -> ViewKind {
        self.view_kind
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn payload(&self) -> &FramePayload {
        &self.payload
    }

    #[must_use]
    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut QueryState {
        &mut self.query
    }
}
