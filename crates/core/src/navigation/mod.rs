//! Stack-based drill-down navigation (e.g. Topics → a topic's entries → one
//! entry).

mod frame;
mod stack;

use thiserror::Error;

pub use frame::{EntityRef, FramePayload, NavigationFrame, ViewKind};
pub use stack::NonEmptyStack;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NavigationError {
    #[error("cannot {action} while the drill-down view is closed")]
    InvalidTransition { action: &'static str },
}

/// Result of a back action.
#[derive(Debug, Clone, PartialEq)]
pub enum BackOutcome {
    /// The top frame was removed; the previous one is current again.
    Popped(NavigationFrame),
    /// Already at the root (or closed): the caller should close the view.
    CloseRequested,
}

/// Drill-down view state: closed, or open with at least the root frame.
///
/// Frames below the top are never handed out mutably, so returning to one
/// restores exactly the filter/sort/page state it had when left.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DrillDownStack {
    #[default]
    Closed,
    Open(NonEmptyStack<NavigationFrame>),
}

impl DrillDownStack {
    #[must_use]
    pub fn new() -> Self {
        Self::Closed
    }

    /// Open the view on `root`, discarding any frames already open.
    pub fn open(&mut self, root: NavigationFrame) {
        *self = Self::Open(NonEmptyStack::new(root));
    }

    /// Drill one level deeper.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidTransition` when the view is closed;
    /// the state is left untouched.
    pub fn push(&mut self, frame: NavigationFrame) -> Result<(), NavigationError> {
        match self {
            Self::Open(stack) => {
                stack.push(frame);
                Ok(())
            }
            Self::Closed => Err(NavigationError::InvalidTransition { action: "push" }),
        }
    }

    /// Go back one level. At the root this only asks the caller to close.
    pub fn back(&mut self) -> BackOutcome {
        match self {
            Self::Open(stack) => stack
                .pop()
                .map_or(BackOutcome::CloseRequested, BackOutcome::Popped),
            Self::Closed => BackOutcome::CloseRequested,
        }
    }

    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    /// Number of frames; 0 while closed.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Open(stack) => stack.len(),
            Self::Closed => 0,
        }
    }

    /// Whether a "back" control should be shown.
    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.depth() > 1
    }

    #[must_use]
    pub fn current(&self) -> Option<&NavigationFrame> {
        match self {
            Self::Open(stack) => Some(stack.top()),
            Self::Closed => None,
        }
    }

    /// The top frame, the only one that may change in place.
    pub fn current_mut(&mut self) -> Option<&mut NavigationFrame> {
        match self {
            Self::Open(stack) => Some(stack.top_mut()),
            Self::Closed => None,
        }
    }

    /// All frames, root first.
    #[must_use]
    pub fn frames(&self) -> Vec<&NavigationFrame> {
        match self {
            Self::Open(stack) => stack.iter().collect(),
            Self::Closed => Vec::new(),
        }
    }

    /// Frame titles root first, for breadcrumbs.
    #[must_use]
    pub fn trail(&self) -> Vec<&str> {
        self.frames().into_iter().map(NavigationFrame::title).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntryId, TopicId};

    fn topics_frame() -> NavigationFrame {
        NavigationFrame::list(
            ViewKind::Topics,
            "Topics",
            vec![EntityRef::Topic(TopicId::new(1)), EntityRef::Topic(TopicId::new(2))],
        )
        .with_page_size(10)
    }

    fn topic_entries_frame() -> NavigationFrame {
        NavigationFrame::list(
            ViewKind::TopicEntries,
            "Frontend",
            vec![EntityRef::Entry(EntryId::new(42))],
        )
        .with_page_size(10)
    }

    fn entry_frame() -> NavigationFrame {
        NavigationFrame::detail(
            ViewKind::EntryDetail,
            "Entry #42",
            EntityRef::Entry(EntryId::new(42)),
        )
    }

    #[test]
    fn push_while_closed_is_rejected() {
        let mut nav = DrillDownStack::new();
        let err = nav.push(topics_frame()).unwrap_err();
        assert_eq!(err, NavigationError::InvalidTransition { action: "push" });
        assert_eq!(nav, DrillDownStack::Closed);
    }

    #[test]
    fn back_at_root_requests_close_without_mutating() {
        let mut nav = DrillDownStack::new();
        nav.open(topics_frame());
        let before = nav.clone();
        assert_eq!(nav.back(), BackOutcome::CloseRequested);
        assert_eq!(nav, before);
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn back_twice_restores_root_state_exactly() {
        let mut nav = DrillDownStack::new();
        let mut root = topics_frame();
        root.query_mut().filters.set_search("react", ["name"]);
        root.query_mut().sort.toggle("benchmark");
        nav.open(root);
        let root_snapshot = nav.current().cloned().unwrap();

        nav.push(topic_entries_frame()).unwrap();
        let child = nav.current_mut().unwrap();
        child.query_mut().filters.set_statuses("status", ["flagged"]);
        child.query_mut().sort.toggle("date");
        child.query_mut().page.show_more(10);
        nav.push(entry_frame()).unwrap();
        assert_eq!(nav.depth(), 3);
        assert!(nav.can_go_back());

        assert!(matches!(nav.back(), BackOutcome::Popped(f) if f.view_kind() == ViewKind::EntryDetail));
        assert!(matches!(nav.back(), BackOutcome::Popped(f) if f.view_kind() == ViewKind::TopicEntries));
        assert_eq!(nav.current(), Some(&root_snapshot));
        assert!(!nav.can_go_back());
    }

    #[test]
    fn child_filters_do_not_leak_into_parent() {
        let mut nav = DrillDownStack::new();
        nav.open(topics_frame());
        nav.push(topic_entries_frame()).unwrap();
        nav.current_mut()
            .unwrap()
            .query_mut()
            .filters
            .set_search("css", ["topic"]);
        let root = nav.frames()[0];
        assert!(root.query().filters.is_empty());
    }

    #[test]
    fn close_discards_frames() {
        let mut nav = DrillDownStack::new();
        nav.open(topics_frame());
        nav.push(entry_frame()).unwrap();
        nav.close();
        assert!(!nav.is_open());
        assert_eq!(nav.depth(), 0);
        assert!(nav.current().is_none());
        assert_eq!(nav.back(), BackOutcome::CloseRequested);
    }

    #[test]
    fn reopen_replaces_stack() {
        let mut nav = DrillDownStack::new();
        nav.open(topics_frame());
        nav.push(entry_frame()).unwrap();
        nav.open(topic_entries_frame());
        assert_eq!(nav.trail(), ["Frontend"]);
    }

    #[test]
    fn random_walk_never_empties_open_stack() {
        // Deterministic LCG so the walk is reproducible.
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        let mut nav = DrillDownStack::new();
        nav.open(topics_frame());
        let mut history: Vec<NavigationFrame> = Vec::new();
        for step in 0..2_000 {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            if seed >> 62 == 0 {
                match nav.back() {
                    BackOutcome::Popped(_) => {
                        let expected = history.pop().unwrap();
                        assert_eq!(nav.current(), Some(&expected));
                    }
                    BackOutcome::CloseRequested => assert!(history.is_empty()),
                }
            } else {
                history.push(nav.current().cloned().unwrap());
                let mut frame = topic_entries_frame();
                frame.query_mut().filters.set_search(&format!("q{step}"), ["topic"]);
                nav.push(frame).unwrap();
            }
            assert!(nav.depth() >= 1);
            assert_eq!(nav.depth(), history.len() + 1);
        }
    }
}
