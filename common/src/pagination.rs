//! Cursor-based pagination.

/// Page of `I` nodes pointed to by `C` cursors.
#[derive(Clone, Debug)]
pub struct Page<C, I> {
    /// [`Edge`]s on this [`Page`].
    pub edges: Vec<Edge<C, I>>,

    /// [`Direction`] this [`Page`] was requested in.
    pub direction: Direction,

    /// Indicator whether there are more nodes beyond this [`Page`] in its
    /// [`Direction`].
    pub has_more: bool,
}

impl<C, I> Page<C, I> {
    /// Creates a new [`Page`] from the provided [`Edge`]s.
    #[must_use]
    pub fn new(
        args: &Arguments<C>,
        edges: impl IntoIterator<Item = impl Into<Edge<C, I>>>,
        has_more: bool,
    ) -> Self {
        Self {
            edges: edges.into_iter().map(Into::into).collect(),
            direction: args.direction(),
            has_more,
        }
    }

    /// Returns [`PageInfo`] of this [`Page`].
    #[must_use]
    pub fn page_info(&self) -> PageInfo<C>
    where
        C: Clone,
    {
        PageInfo {
            start_cursor: self.edges.first().map(|e| e.cursor.clone()),
            end_cursor: self.edges.last().map(|e| e.cursor.clone()),
            has_next_page: self.has_more
                && self.direction == Direction::Forward,
            has_previous_page: self.has_more
                && self.direction == Direction::Backward,
        }
    }
}

/// Information about a [`Page`].
#[derive(Clone, Copy, Debug)]
pub struct PageInfo<C> {
    /// First cursor on the [`Page`].
    pub start_cursor: Option<C>,

    /// Last cursor on the [`Page`].
    pub end_cursor: Option<C>,

    /// Indicator whether there is a next [`Page`].
    pub has_next_page: bool,

    /// Indicator whether there is a previous [`Page`].
    pub has_previous_page: bool,
}

/// An edge on a [`Page`].
#[derive(Clone, Copy, Debug)]
pub struct Edge<C, I> {
    /// Cursor of this [`Edge`].
    pub cursor: C,

    /// Node of this [`Edge`].
    pub node: I,
}

impl<C, I> From<(C, I)> for Edge<C, I> {
    fn from((cursor, node): (C, I)) -> Self {
        Self { cursor, node }
    }
}

/// Pagination arguments.
#[derive(Clone, Copy, Debug)]
pub enum Arguments<C> {
    /// Forward pagination.
    Forward {
        /// Number of items to return.
        first: usize,

        /// Cursor after which to return items.
        after: Option<C>,
    },

    /// Backward pagination.
    Backward {
        /// Number of items to return.
        last: usize,

        /// Cursor before which to return items.
        before: Option<C>,
    },
}

impl<C> Arguments<C> {
    /// Creates new [`Arguments`] out of the GraphQL-style `first`/`after` and
    /// `last`/`before` pairs.
    ///
    /// [`None`] is returned if the pairs are mixed or the numbers are
    /// negative.
    pub fn new<Num>(
        first: Option<Num>,
        after: Option<C>,
        last: Option<Num>,
        before: Option<C>,
        default: Num,
    ) -> Option<Self>
    where
        Num: TryInto<usize>,
    {
        Some(match (first, after, last, before) {
            (None, None, None, None) => Self::Forward {
                first: default.try_into().ok()?,
                after: None,
            },
            (Some(first), after, None, None) => Self::Forward {
                first: first.try_into().ok()?,
                after,
            },
            (None, None, Some(last), before) => Self::Backward {
                last: last.try_into().ok()?,
                before,
            },
            _ => return None,
        })
    }

    /// Returns the cursor requested by these [`Arguments`].
    #[must_use]
    pub fn cursor(&self) -> Option<&C> {
        match self {
            Self::Forward { after, .. } => after.as_ref(),
            Self::Backward { before, .. } => before.as_ref(),
        }
    }

    /// Returns [`Direction`] these [`Arguments`] request.
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self {
            Self::Forward { .. } => Direction::Forward,
            Self::Backward { .. } => Direction::Backward,
        }
    }

    /// Returns the page size requested by these [`Arguments`].
    #[must_use]
    pub fn limit(&self) -> usize {
        match *self {
            Self::Forward { first, .. } => first,
            Self::Backward { last, .. } => last,
        }
    }
}

/// Pagination selector.
#[derive(Clone, Debug)]
pub struct Selector<C, F> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments<C>,

    /// Additional filter being applied to the result.
    pub filter: F,
}

/// Direction of pagination.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Direction {
    /// From older to newer.
    Forward,

    /// From newer to older.
    Backward,
}

impl Direction {
    /// Returns comparison operator selecting items past a cursor.
    #[must_use]
    pub const fn operator(self) -> &'static str {
        match self {
            Self::Forward => ">",
            Self::Backward => "<",
        }
    }

    /// Returns SQL order keyword matching this [`Direction`].
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Forward => "ASC",
            Self::Backward => "DESC",
        }
    }
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($cursor:ty, $node:ty, $filter:ty) => {
        #[doc = "Edge of a [`Page`]."]
        pub type Edge = $crate::pagination::Edge<$cursor, $node>;

        #[doc = "A [`Page`] of nodes."]
        pub type Page = $crate::pagination::Page<$cursor, $node>;

        #[doc = "An information about a [`Page`]."]
        pub type PageInfo = $crate::pagination::PageInfo<$cursor>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments<$cursor>;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$cursor, $filter>;
    };
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Direction, Page};

    #[test]
    fn rejects_mixed_directions() {
        assert!(Arguments::new(Some(1), Some(1), Some(1), None, 10).is_none());
        assert!(Arguments::new(None, Some(1), None, None, 10).is_none());
        assert!(Arguments::<u8>::new(Some(-1), None, None, None, 10).is_none());
    }

    #[test]
    fn defaults_to_forward() {
        let args = Arguments::<u8>::new(None, None, None, None, 10).unwrap();

        assert_eq!(args.direction(), Direction::Forward);
        assert_eq!(args.limit(), 10);
        assert_eq!(args.cursor(), None);
    }

    #[test]
    fn page_info_follows_direction() {
        let args = Arguments::new(None, None, Some(2), Some(9_u8), 10).unwrap();
        let page = Page::<u8, u8>::new(&args, [(8_u8, 8_u8), (7, 7)], true);
        let info = page.page_info();

        assert!(info.has_previous_page);
        assert!(!info.has_next_page);
        assert_eq!(info.start_cursor, Some(8));
        assert_eq!(info.end_cursor, Some(7));
    }
}
