//! Ordered list store.
//!
//! # Invariants
//! - Item ids are unique within a list.
//! - Display position is derived from the vector index and never stored.
//! - `reorder` is a permutation: length and id-set are unchanged.
//! - Failed operations leave the list untouched.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::InsertMode;
use crate::error::{Error, Result};
use crate::model::ReferenceItem;

/// In-memory ordered sequence of reference items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedList {
    items: Vec<ReferenceItem>,
}

impl OrderedList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from plain contents, synthesizing fresh ids in order.
    pub fn from_contents<I, S>(contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: contents.into_iter().map(ReferenceItem::new).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn items(&self) -> &[ReferenceItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReferenceItem> {
        self.items.iter()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ReferenceItem> {
        self.items.get(index)
    }

    /// Plain contents in display order (the persisted form).
    #[must_use]
    pub fn contents(&self) -> Vec<String> {
        self.items.iter().map(|i| i.content().to_string()).collect()
    }

    /// Add a single entry.
    ///
    /// Whitespace-only content is ignored and `None` is returned. Content is
    /// stored trimmed.
    pub fn add(&mut self, content: &str, mode: InsertMode) -> Option<&ReferenceItem> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }

        let item = ReferenceItem::new(content);
        let index = match mode {
            InsertMode::Prepend => {
                self.items.insert(0, item);
                0
            }
            InsertMode::Append => {
                self.items.push(item);
                self.items.len() - 1
            }
        };

        debug!(index, len = self.items.len(), "Added reference");
        self.items.get(index)
    }

    /// Insert parsed items as one contiguous block, keeping their order.
    ///
    /// Returns the number of items inserted.
    pub fn import_many(&mut self, items: Vec<ReferenceItem>, mode: InsertMode) -> usize {
        let count = items.len();
        match mode {
            InsertMode::Prepend => {
                self.items.splice(0..0, items);
            }
            InsertMode::Append => self.items.extend(items),
        }

        debug!(count, len = self.items.len(), ?mode, "Imported references");
        count
    }

    /// Remove the item at `index`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> Result<ReferenceItem> {
        self.check_index(index)?;
        let removed = self.items.remove(index);

        debug!(index, id = %removed.id(), "Removed reference");
        Ok(removed)
    }

    /// Move the item at `from` so it occupies `to`.
    ///
    /// Items between the two positions shift by one. `from == to` is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if either index is `>= len`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;

        if from == to {
            return Ok(());
        }

        let item = self.items.remove(from);
        self.items.insert(to, item);

        debug!(from, to, "Reordered reference");
        Ok(())
    }

    /// Apply the end of a drag gesture.
    ///
    /// A drop without a destination (cancelled drag) changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` as [`reorder`](Self::reorder) does.
    pub fn drop_at(&mut self, from: usize, to: Option<usize>) -> Result<()> {
        match to {
            Some(to) => self.reorder(from, to),
            None => Ok(()),
        }
    }

    /// Replace the whole list with fresh items built from `contents`.
    pub fn replace_all(&mut self, contents: Vec<String>) {
        self.items = contents.into_iter().map(ReferenceItem::new).collect();
        debug!(len = self.items.len(), "Replaced reference list");
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.replace_all(Vec::new());
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }
}

impl<'a> IntoIterator for &'a OrderedList {
    type Item = &'a ReferenceItem;
    type IntoIter = std::slice::Iter<'a, ReferenceItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::import::parse;
    use crate::model::ItemId;

    fn contents(list: &OrderedList) -> Vec<String> {
        list.contents()
    }

    fn ids(list: &OrderedList) -> Vec<ItemId> {
        list.iter().map(|i| i.id().clone()).collect()
    }

    #[test]
    fn test_add_append_then_prepend() {
        let mut list = OrderedList::new();
        list.add("Smith 2020", InsertMode::Append);
        list.add("Jones 2019", InsertMode::Prepend);

        assert_eq!(contents(&list), vec!["Jones 2019", "Smith 2020"]);
    }

    #[test]
    fn test_add_ignores_blank_content() {
        let mut list = OrderedList::new();
        assert!(list.add("", InsertMode::Append).is_none());
        assert!(list.add("   \t", InsertMode::Prepend).is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn test_import_many_prepend_keeps_block_order() {
        let mut list = OrderedList::from_contents(["Existing"]);
        let parsed = parse("[1] A\n\n[2] B", InsertMode::Prepend);

        assert_eq!(list.import_many(parsed, InsertMode::Prepend), 2);
        assert_eq!(contents(&list), vec!["A", "B", "Existing"]);
    }

    #[test]
    fn test_import_many_append() {
        let mut list = OrderedList::from_contents(["Existing"]);
        let parsed = parse("A\n\nB", InsertMode::Append);
        list.import_many(parsed, InsertMode::Append);

        assert_eq!(contents(&list), vec!["Existing", "A", "B"]);
    }

    #[test]
    fn test_remove_at_out_of_range_leaves_list_unchanged() {
        let mut list = OrderedList::from_contents(["A", "B", "C"]);
        let before = list.clone();

        let err = list.remove_at(5).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 5, len: 3 }));
        assert_eq!(list, before);
    }

    #[test]
    fn test_remove_at_keeps_other_ids() {
        let mut list = OrderedList::from_contents(["A", "B", "C"]);
        let before = ids(&list);

        let removed = list.remove_at(1).unwrap();
        assert_eq!(removed.content(), "B");
        assert_eq!(ids(&list), vec![before[0].clone(), before[2].clone()]);
    }

    #[test]
    fn test_reorder_moves_first_to_last() {
        let mut list = OrderedList::from_contents(["A", "B", "C"]);
        list.reorder(0, 2).unwrap();
        assert_eq!(contents(&list), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_reorder_moves_last_to_first() {
        let mut list = OrderedList::from_contents(["A", "B", "C"]);
        list.reorder(2, 0).unwrap();
        assert_eq!(contents(&list), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_reorder_is_permutation_for_all_pairs() {
        let list = OrderedList::from_contents(["A", "B", "C", "D"]);
        let mut expected_ids = ids(&list);
        expected_ids.sort();

        for from in 0..list.len() {
            for to in 0..list.len() {
                let mut moved = list.clone();
                moved.reorder(from, to).unwrap();

                let mut moved_ids = ids(&moved);
                moved_ids.sort();
                assert_eq!(moved.len(), list.len());
                assert_eq!(moved_ids, expected_ids, "reorder({from}, {to})");
                assert_eq!(moved.get(to).unwrap().id(), list.get(from).unwrap().id());
            }
        }
    }

    #[test]
    fn test_reorder_rejects_invalid_indices() {
        let mut list = OrderedList::from_contents(["A", "B"]);
        assert!(list.reorder(2, 0).is_err());
        assert!(list.reorder(0, 2).is_err());
        assert_eq!(contents(&list), vec!["A", "B"]);
    }

    #[test]
    fn test_reorder_same_index_is_noop() {
        let mut list = OrderedList::from_contents(["A", "B"]);
        let before = list.clone();
        list.reorder(1, 1).unwrap();
        assert_eq!(list, before);
    }

    #[test]
    fn test_cancelled_drop_is_noop() {
        let mut list = OrderedList::from_contents(["A", "B"]);
        let before = list.clone();
        list.drop_at(0, None).unwrap();
        assert_eq!(list, before);
    }

    #[test]
    fn test_replace_all_synthesizes_new_ids() {
        let mut list = OrderedList::from_contents(["A", "B"]);
        let old_ids = ids(&list);

        list.replace_all(vec!["A".into(), "B".into()]);
        assert_eq!(contents(&list), vec!["A", "B"]);
        assert!(ids(&list).iter().all(|id| !old_ids.contains(id)));

        list.clear();
        assert!(list.is_empty());
    }
}
