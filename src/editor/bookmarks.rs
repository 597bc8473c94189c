//! Row-range bookmarks kept in sorted order.

use serde::{Deserialize, Serialize};

use super::selection::{Position, SelectionMode};

/// Cursor state restored when jumping to a bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkData {
    pub pen: Position,
    pub marker: Position,
    pub mode: SelectionMode,
}

/// A bookmark over rows `begin..=end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    begin: usize,
    end: usize,
    pub data: BookmarkData,
}

impl Bookmark {
    /// Create a bookmark; the row bounds may be given in either order.
    pub fn new(a: usize, b: usize, data: BookmarkData) -> Self {
        Self {
            begin: a.min(b),
            end: a.max(b),
            data,
        }
    }

    pub const fn begin(&self) -> usize {
        self.begin
    }

    pub const fn end(&self) -> usize {
        self.end
    }

    pub const fn range(&self) -> (usize, usize) {
        (self.begin, self.end)
    }

    pub const fn contains(&self, row: usize) -> bool {
        self.begin <= row && row <= self.end
    }

    pub const fn overlaps(&self, begin: usize, end: usize) -> bool {
        self.begin <= end && self.end >= begin
    }
}

/// Bookmarks of one document, sorted by `(begin, end)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bookmarks {
    list: Vec<Bookmark>,
}

impl Bookmarks {
    /// Build from any order; overlapping entries keep the later one.
    pub fn from_vec(bookmarks: Vec<Bookmark>) -> Self {
        let mut set = Self::default();
        for bookmark in bookmarks {
            set.add(bookmark);
        }
        set
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bookmark> {
        self.list.iter()
    }

    /// Bookmark covering `row`, for gutter rendering.
    pub fn at_row(&self, row: usize) -> Option<&Bookmark> {
        let index = self.list.partition_point(|b| b.end < row);
        self.list.get(index).filter(|b| b.contains(row))
    }

    /// Insert, replacing any bookmark that overlaps the new one.
    pub fn add(&mut self, bookmark: Bookmark) {
        self.remove_overlapping(bookmark.begin, bookmark.end);
        let index = self.list.partition_point(|b| b.range() <= bookmark.range());
        self.list.insert(index, bookmark);
    }

    /// Remove every bookmark sharing a row with `begin..=end`.
    ///
    /// Returns whether anything was removed.
    pub fn remove_overlapping(&mut self, begin: usize, end: usize) -> bool {
        let before = self.list.len();
        self.list.retain(|b| !b.overlaps(begin, end));
        self.list.len() != before
    }

    /// First bookmark starting after `row`, wrapping to the first one.
    pub fn next_after(&self, row: usize) -> Option<&Bookmark> {
        if self.list.is_empty() {
            return None;
        }
        let needle = (row + 1, row + 1);
        let index = self.list.partition_point(|b| b.range() < needle);
        self.list.get(index % self.list.len())
    }

    /// Last bookmark before `row`, wrapping to the last one.
    pub fn prior_before(&self, row: usize) -> Option<&Bookmark> {
        if self.list.is_empty() {
            return None;
        }
        let needle = (row, row);
        let index = self.list.partition_point(|b| b.range() < needle);
        let len = self.list.len();
        self.list.get((index + len - 1) % len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark(begin: usize, end: usize) -> Bookmark {
        let pen = Position::new(begin, 0);
        Bookmark::new(
            begin,
            end,
            BookmarkData {
                pen,
                marker: pen,
                mode: SelectionMode::None,
            },
        )
    }

    fn rows(set: &Bookmarks) -> Vec<(usize, usize)> {
        set.iter().map(Bookmark::range).collect()
    }

    #[test]
    fn test_add_keeps_sorted() {
        let set = Bookmarks::from_vec(vec![mark(5, 5), mark(2, 2), mark(9, 12)]);
        assert_eq!(rows(&set), vec![(2, 2), (5, 5), (9, 12)]);
    }

    #[test]
    fn test_add_replaces_overlapping() {
        let mut set = Bookmarks::from_vec(vec![mark(2, 2), mark(5, 5), mark(8, 8)]);
        set.add(mark(4, 6));
        assert_eq!(rows(&set), vec![(2, 2), (4, 6), (8, 8)]);
    }

    #[test]
    fn test_next_after_wraps() {
        let set = Bookmarks::from_vec(vec![mark(2, 2), mark(5, 5)]);
        assert_eq!(set.next_after(3).map(Bookmark::begin), Some(5));
        assert_eq!(set.next_after(2).map(Bookmark::begin), Some(5));
        assert_eq!(set.next_after(6).map(Bookmark::begin), Some(2));
    }

    #[test]
    fn test_prior_before_wraps() {
        let set = Bookmarks::from_vec(vec![mark(2, 2), mark(5, 5)]);
        assert_eq!(set.prior_before(5).map(Bookmark::begin), Some(2));
        assert_eq!(set.prior_before(6).map(Bookmark::begin), Some(5));
        assert_eq!(set.prior_before(2).map(Bookmark::begin), Some(5));
    }

    #[test]
    fn test_remove_overlapping() {
        let mut set = Bookmarks::from_vec(vec![mark(2, 3), mark(5, 5), mark(8, 8)]);
        assert!(set.remove_overlapping(3, 5));
        assert_eq!(rows(&set), vec![(8, 8)]);
        assert!(!set.remove_overlapping(0, 1));
    }

    #[test]
    fn test_at_row() {
        let set = Bookmarks::from_vec(vec![mark(2, 4), mark(7, 7)]);
        assert_eq!(set.at_row(3).map(Bookmark::begin), Some(2));
        assert!(set.at_row(5).is_none());
        assert!(Bookmarks::default().next_after(0).is_none());
    }
}
