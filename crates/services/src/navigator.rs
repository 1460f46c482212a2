use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use storage::SnapshotSource;
use tracker_core::Clock;
use tracker_core::aggregate::PendingOverride;
use tracker_core::model::{Entry, EntryId, ProjectId, TopicId, UserId, ViewSettings};
use tracker_core::navigation::{
    BackOutcome, DrillDownStack, EntityRef, FramePayload, NavigationFrame, ViewKind,
};
use tracker_core::query::{self, QueryResult, QueryState, Queryable, SortDirection};

use crate::error::NavigatorError;
use crate::rows::{EntryRow, TopicRow};
use crate::topic_service::TopicService;

const DATE_FIELD: &str = "date";
const STATUS_FIELD: &str = "status";
const TOPIC_SEARCH_FIELDS: [&str; 2] = ["name", "path"];

//
// ─── RENDERED FRAME ────────────────────────────────────────────────────────────
//

/// Rows of the current frame after filter, sort and paging.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameRows {
    Topics(QueryResult<TopicRow>),
    Entries(QueryResult<EntryRow>),
    /// `None` when the record left the snapshot after the frame was opened.
    Detail(Option<EntryRow>),
}

/// Everything a presentation layer needs to draw the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFrame {
    pub view_kind: ViewKind,
    pub title: String,
    pub depth: usize,
    pub can_go_back: bool,
    pub trail: Vec<String>,
    /// Offset page the rows come from, after clamping to the matched rows.
    pub page_index: usize,
    pub has_more: bool,
    pub sort_key: Option<String>,
    pub sort_direction: Option<SortDirection>,
    pub rows: FrameRows,
}

//
// ─── NAVIGATOR ─────────────────────────────────────────────────────────────────
//

/// Drill-down review of one snapshot: topics, their entries, single entries.
///
/// Every action goes through `&mut self`, so actions are applied one at a
/// time in the order they are issued. Only the top frame's query state is
/// ever changed.
#[derive(Debug, Clone)]
pub struct ReviewNavigator {
    topics: TopicService,
    entries: Vec<Entry>,
    entry_index: HashMap<EntryId, usize>,
    settings: ViewSettings,
    clock: Clock,
    pending: Option<PendingOverride>,
    stack: DrillDownStack,
}

impl ReviewNavigator {
    #[must_use]
    pub fn new(
        topics: TopicService,
        entries: Vec<Entry>,
        settings: ViewSettings,
        clock: Clock,
    ) -> Self {
        let entry_index = index_entries(&entries);
        Self {
            topics,
            entries,
            entry_index,
            settings,
            clock,
            pending: None,
            stack: DrillDownStack::new(),
        }
    }

    /// Fetch a snapshot from `source` and start closed.
    ///
    /// # Errors
    ///
    /// Returns `NavigatorError` if the source cannot be read.
    pub async fn load(
        source: &dyn SnapshotSource,
        settings: ViewSettings,
        clock: Clock,
    ) -> Result<Self, NavigatorError> {
        let topics = TopicService::load(source).await?;
        let entries = source.fetch_entries().await?;
        Ok(Self::new(topics, entries, settings, clock))
    }

    /// Re-fetch the snapshot, keeping the open frames and their query state.
    ///
    /// # Errors
    ///
    /// Returns `NavigatorError` if the source cannot be read; the current
    /// snapshot is kept in that case.
    pub async fn refresh(&mut self, source: &dyn SnapshotSource) -> Result<(), NavigatorError> {
        let topics = TopicService::load(source).await?;
        let entries = source.fetch_entries().await?;
        self.replace_snapshot(topics, entries);
        Ok(())
    }

    /// Swap in a new snapshot. Frames stay open; ids that vanished simply
    /// stop rendering.
    pub fn replace_snapshot(&mut self, topics: TopicService, entries: Vec<Entry>) {
        self.entry_index = index_entries(&entries);
        self.topics = topics;
        self.entries = entries;
        debug!(
            topics = self.topics.graph().len(),
            entries = self.entries.len(),
            "navigator snapshot replaced"
        );
    }

    /// Fold an unsaved completion edit into displayed topic progress.
    pub fn set_pending_override(&mut self, pending: Option<PendingOverride>) {
        self.pending = pending;
    }

    #[must_use]
    pub fn topics(&self) -> &TopicService {
        &self.topics
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn stack(&self) -> &DrillDownStack {
        &self.stack
    }

    #[must_use]
    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.stack.is_open()
    }

    // ─── OPEN / DRILL ──────────────────────────────────────────────────────────

    /// Open on the table of active topics, replacing any open frames.
    pub fn open_topics(&mut self) {
        let refs = self
            .topics
            .graph()
            .topics()
            .iter()
            .filter(|topic| topic.is_active())
            .map(|topic| EntityRef::Topic(topic.id()))
            .collect();
        let frame = self.list_frame(ViewKind::Topics, "Topics", refs);
        self.stack.open(frame);
        debug!("opened topics view");
    }

    /// Open on every entry in the snapshot, replacing any open frames.
    pub fn open_entries(&mut self) {
        let refs = self.entry_refs(|_| true);
        let frame = self.list_frame(ViewKind::Entries, "Entries", refs);
        self.stack.open(frame);
        debug!("opened entries view");
    }

    /// Push the entries logged against an active topic.
    ///
    /// # Errors
    ///
    /// - `UnknownTopic` / `InactiveTopic` if the topic cannot be drilled into
    /// - `Navigation` if the view is closed
    pub fn drill_into_topic(&mut self, id: TopicId) -> Result<(), NavigatorError> {
        let topic = self
            .topics
            .topic(id)
            .ok_or(NavigatorError::UnknownTopic(id))?;
        if !topic.is_active() {
            return Err(NavigatorError::InactiveTopic(id));
        }
        let title = topic.name().to_owned();
        let refs = self.entry_refs(|entry| entry.topic_id() == Some(id));
        let frame = self.list_frame(ViewKind::TopicEntries, title, refs);
        self.push(frame)
    }

    /// Push the entries of one user.
    ///
    /// # Errors
    ///
    /// Returns `Navigation` if the view is closed.
    pub fn drill_into_user(&mut self, user: UserId) -> Result<(), NavigatorError> {
        let refs = self.entry_refs(|entry| entry.user_id() == user);
        let frame = self.list_frame(ViewKind::UserEntries, format!("User {user}"), refs);
        self.push(frame)
    }

    /// Push the entries logged against a project.
    ///
    /// # Errors
    ///
    /// Returns `Navigation` if the view is closed.
    pub fn drill_into_project(&mut self, project: ProjectId) -> Result<(), NavigatorError> {
        let refs = self.entry_refs(|entry| entry.project_id() == Some(project));
        let frame = self.list_frame(ViewKind::ProjectEntries, format!("Project {project}"), refs);
        self.push(frame)
    }

    /// Push the detail view of one entry.
    ///
    /// # Errors
    ///
    /// - `UnknownEntry` if the entry is not in the snapshot
    /// - `Navigation` if the view is closed
    pub fn drill_into_entry(&mut self, id: EntryId) -> Result<(), NavigatorError> {
        if !self.entry_index.contains_key(&id) {
            return Err(NavigatorError::UnknownEntry(id));
        }
        let frame =
            NavigationFrame::detail(ViewKind::EntryDetail, format!("Entry #{id}"), EntityRef::Entry(id));
        self.push(frame)
    }

    fn push(&mut self, frame: NavigationFrame) -> Result<(), NavigatorError> {
        let kind = frame.view_kind();
        self.stack.push(frame)?;
        debug!(?kind, depth = self.stack.depth(), "drilled down");
        Ok(())
    }

    /// Go back one level; at the root this closes the view.
    pub fn back(&mut self) -> BackOutcome {
        let outcome = self.stack.back();
        if outcome == BackOutcome::CloseRequested {
            self.stack.close();
            debug!("review view closed from root");
        } else {
            debug!(depth = self.stack.depth(), "went back");
        }
        outcome
    }

    pub fn close(&mut self) {
        self.stack.close();
        debug!("review view closed");
    }

    // ─── QUERY ─────────────────────────────────────────────────────────────────

    /// Free-text search over the current frame's searchable fields.
    ///
    /// # Errors
    ///
    /// Returns `Closed` if no frame is open.
    pub fn search(&mut self, needle: &str) -> Result<(), NavigatorError> {
        let fields: Vec<String> = match self.current_kind()? {
            ViewKind::Topics => TOPIC_SEARCH_FIELDS.iter().map(|f| (*f).to_owned()).collect(),
            _ => self.settings.entry_search_fields().to_vec(),
        };
        let query = self.current_query()?;
        query.filters.set_search(needle, fields);
        query.page.index = 0;
        Ok(())
    }

    /// Column-header click on `key`.
    ///
    /// # Errors
    ///
    /// Returns `Closed` if no frame is open.
    pub fn toggle_sort(&mut self, key: &str) -> Result<(), NavigatorError> {
        self.current_query()?.sort.toggle(key);
        Ok(())
    }

    /// Keep only rows whose status is one of `statuses`; empty clears.
    ///
    /// # Errors
    ///
    /// Returns `Closed` if no frame is open.
    pub fn filter_statuses<S: AsRef<str>>(
        &mut self,
        statuses: impl IntoIterator<Item = S>,
    ) -> Result<(), NavigatorError> {
        let query = self.current_query()?;
        query.filters.set_statuses(STATUS_FIELD, statuses);
        query.page.index = 0;
        Ok(())
    }

    /// Inclusive numeric bounds on `field` (e.g. `hours`, `progress`).
    ///
    /// # Errors
    ///
    /// Returns `Closed` if no frame is open.
    pub fn filter_range(
        &mut self,
        field: &str,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<(), NavigatorError> {
        let query = self.current_query()?;
        query.filters.set_range(field, min, max);
        query.page.index = 0;
        Ok(())
    }

    /// Inclusive date bounds on the entry date.
    ///
    /// # Errors
    ///
    /// Returns `Closed` if no frame is open.
    pub fn filter_dates(
        &mut self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<(), NavigatorError> {
        let query = self.current_query()?;
        query.filters.set_dates(DATE_FIELD, from, to);
        query.page.index = 0;
        Ok(())
    }

    /// Entries from the last `days` days, today included.
    ///
    /// # Errors
    ///
    /// Returns `Closed` if no frame is open.
    pub fn filter_last_days(&mut self, days: u32) -> Result<(), NavigatorError> {
        let (from, to) = self.clock.last_days(days);
        self.filter_dates(Some(from), Some(to))
    }

    /// Drop every filter on the current frame, keeping its sort.
    ///
    /// # Errors
    ///
    /// Returns `Closed` if no frame is open.
    pub fn clear_filters(&mut self) -> Result<(), NavigatorError> {
        let query = self.current_query()?;
        query.filters.clear();
        query.page.index = 0;
        Ok(())
    }

    /// Grow the current frame's window by the configured step.
    ///
    /// # Errors
    ///
    /// Returns `Closed` if no frame is open.
    pub fn show_more(&mut self) -> Result<(), NavigatorError> {
        let step = self.settings.show_more_step();
        self.current_query()?.page.show_more(step);
        Ok(())
    }

    /// Move the current frame's window one page forward.
    ///
    /// Returns whether the window moved; it stays put on the last page.
    ///
    /// # Errors
    ///
    /// Returns `Closed` if no frame is open.
    pub fn next_page(&mut self) -> Result<bool, NavigatorError> {
        let frame = self.render().ok_or(NavigatorError::Closed)?;
        if !frame.has_more {
            return Ok(false);
        }
        let page = &mut self.current_query()?.page;
        page.index = frame.page_index;
        page.next();
        Ok(true)
    }

    /// Move the current frame's window one page back.
    ///
    /// Returns whether the window moved; it stays put on the first page.
    ///
    /// # Errors
    ///
    /// Returns `Closed` if no frame is open.
    pub fn prev_page(&mut self) -> Result<bool, NavigatorError> {
        let frame = self.render().ok_or(NavigatorError::Closed)?;
        if frame.page_index == 0 {
            return Ok(false);
        }
        let page = &mut self.current_query()?.page;
        page.index = frame.page_index;
        page.prev();
        Ok(true)
    }

    fn current_kind(&self) -> Result<ViewKind, NavigatorError> {
        self.stack
            .current()
            .map(NavigationFrame::view_kind)
            .ok_or(NavigatorError::Closed)
    }

    fn current_query(&mut self) -> Result<&mut QueryState, NavigatorError> {
        self.stack
            .current_mut()
            .map(NavigationFrame::query_mut)
            .ok_or(NavigatorError::Closed)
    }

    // ─── RENDER ────────────────────────────────────────────────────────────────

    /// The current frame with its rows; `None` while closed.
    #[must_use]
    pub fn render(&self) -> Option<RenderedFrame> {
        let frame = self.stack.current()?;
        let query = frame.query();
        let (rows, page) = match frame.payload() {
            FramePayload::List(refs) if frame.view_kind() == ViewKind::Topics => {
                let (result, page) = run_query(&self.topic_rows(refs), query);
                (FrameRows::Topics(result), Some(page))
            }
            FramePayload::List(refs) => {
                let (result, page) = run_query(&self.entry_rows(refs), query);
                (FrameRows::Entries(result), Some(page))
            }
            FramePayload::Detail(EntityRef::Entry(id)) => {
                let row = self.entry(*id).map(|entry| EntryRow::build(entry, &self.topics));
                (FrameRows::Detail(row), None)
            }
            FramePayload::Detail(_) => (FrameRows::Detail(None), None),
        };
        let (page_index, has_more) = page.unwrap_or((0, false));
        Some(RenderedFrame {
            view_kind: frame.view_kind(),
            title: frame.title().to_owned(),
            depth: self.stack.depth(),
            can_go_back: self.stack.can_go_back(),
            trail: self.stack.trail().into_iter().map(str::to_owned).collect(),
            page_index,
            has_more,
            sort_key: query.sort.key().map(str::to_owned),
            sort_direction: query.sort.direction(),
            rows,
        })
    }

    fn topic_rows(&self, refs: &[EntityRef]) -> Vec<TopicRow> {
        let decimals = self.settings.progress_decimals();
        refs.iter()
            .filter_map(|entity| match entity {
                EntityRef::Topic(id) => self.topics.topic(*id),
                _ => None,
            })
            .map(|topic| TopicRow::build(topic, &self.topics, self.pending, decimals))
            .collect()
    }

    fn entry_rows(&self, refs: &[EntityRef]) -> Vec<EntryRow> {
        refs.iter()
            .filter_map(|entity| match entity {
                EntityRef::Entry(id) => self.entry(*id),
                _ => None,
            })
            .map(|entry| EntryRow::build(entry, &self.topics))
            .collect()
    }

    fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entry_index.get(&id).map(|&pos| &self.entries[pos])
    }

    fn entry_refs(&self, keep: impl Fn(&Entry) -> bool) -> Vec<EntityRef> {
        self.entries
            .iter()
            .filter(|entry| keep(entry))
            .map(|entry| EntityRef::Entry(entry.id()))
            .collect()
    }

    fn list_frame(
        &self,
        kind: ViewKind,
        title: impl Into<String>,
        refs: Vec<EntityRef>,
    ) -> NavigationFrame {
        NavigationFrame::list(kind, title, refs).with_page_size(self.settings.default_page_size())
    }
}

fn index_entries(entries: &[Entry]) -> HashMap<EntryId, usize> {
    entries
        .iter()
        .enumerate()
        .map(|(pos, entry)| (entry.id(), pos))
        .collect()
}

/// Query result plus the effective page index and whether more rows follow.
fn run_query<T: Queryable + Clone>(
    rows: &[T],
    query: &QueryState,
) -> (QueryResult<T>, (usize, bool)) {
    let result = query::apply(rows, query);
    let page = query.page.clamped_to(result.matched);
    let has_more = result.has_more(&page);
    (result.map(Clone::clone), (page.index, has_more))
}
