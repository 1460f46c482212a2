/// A stack that always holds at least one element (its root).
#[derive(Debug, Clone, PartialEq)]
pub struct NonEmptyStack<T> {
    root: T,
    rest: Vec<T>,
}

impl<T> NonEmptyStack<T> {
    #[must_use]
    pub fn new(root: T) -> Self {
        Self {
            root,
            rest: Vec::new(),
        }
    }

    pub fn push(&mut self, item: T) {
        self.rest.push(item);
    }

    /// Remove the top element, unless it is the root.
    pub fn pop(&mut self) -> Option<T> {
        self.rest.pop()
    }

    #[must_use]
    pub fn top(&self) -> &T {
        self.rest.last().unwrap_or(&self.root)
    }

    pub fn top_mut(&mut self) -> &mut T {
        self.rest.last_mut().unwrap_or(&mut self.root)
    }

    /// Never zero.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.rest.len() + 1
    }

    /// Root first, top last.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        std::iter::once(&self.root).chain(self.rest.iter())
    }
}
