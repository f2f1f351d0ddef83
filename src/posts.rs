//! Post list helpers shared by the CLI and the terminal browser
//!
//! Search filtering, multi-selection and author-name annotation.

use std::collections::{BTreeSet, HashMap};

use crate::api::Post;

/// Label shown for posts whose author is not in the users index
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Case-insensitive substring match against title and body
///
/// An empty or whitespace-only query matches every post.
pub fn matches_search(post: &Post, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    post.title.to_lowercase().contains(&query) || post.body.to_lowercase().contains(&query)
}

/// Returns the posts matching `query`, in their original order
pub fn filter_posts<'a>(posts: &'a [Post], query: &str) -> Vec<&'a Post> {
    posts
        .iter()
        .filter(|post| matches_search(post, query))
        .collect()
}

/// Resolves the author name of a post from a users index
pub fn author_label(by_id: &HashMap<u64, String>, user_id: u64) -> &str {
    by_id
        .get(&user_id)
        .map(String::as_str)
        .unwrap_or(UNKNOWN_AUTHOR)
}

/// Set of selected post ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<u64>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the id if absent, removes it if present
    ///
    /// # Returns
    /// Whether the id is selected afterwards
    pub fn toggle(&mut self, id: u64) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn remove(&mut self, id: u64) {
        self.ids.remove(&id);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in ascending order
    pub fn ids(&self) -> Vec<u64> {
        self.ids.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_posts() -> Vec<Post> {
        vec![
            Post {
                id: 1,
                user_id: 1,
                title: "sunt aut facere repellat provident occaecati excepturi optio reprehenderit"
                    .to_string(),
                body: "quia et suscipit\nsuscipit recusandae consequuntur expedita".to_string(),
            },
            Post {
                id: 2,
                user_id: 2,
                title: "qui est esse".to_string(),
                body: "est rerum tempore vitae\nsequi sint nihil".to_string(),
            },
        ]
    }

    #[test]
    fn test_search_filters_by_title() {
        let posts = sample_posts();

        let filtered = filter_posts(&posts, "sunt aut");

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
    }

    #[test]
    fn test_search_matches_body_case_insensitively() {
        let posts = sample_posts();

        let filtered = filter_posts(&posts, "SEQUI SINT");

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 2);
    }

    #[test]
    fn test_cleared_search_shows_everything() {
        let posts = sample_posts();

        assert_eq!(filter_posts(&posts, "").len(), 2);
        assert_eq!(filter_posts(&posts, "   ").len(), 2);
    }

    #[test]
    fn test_search_without_match_is_empty() {
        let posts = sample_posts();
        assert!(filter_posts(&posts, "no such words").is_empty());
    }

    #[test]
    fn test_author_label_known_and_unknown() {
        let mut by_id = HashMap::new();
        by_id.insert(1, "Leanne Graham".to_string());

        assert_eq!(author_label(&by_id, 1), "Leanne Graham");
        assert_eq!(author_label(&by_id, 2), UNKNOWN_AUTHOR);
    }

    #[test]
    fn test_selection_toggle() {
        let mut selection = Selection::new();

        assert!(selection.toggle(1));
        assert!(selection.toggle(2));
        assert_eq!(selection.len(), 2);
        assert!(!selection.toggle(1));
        assert!(!selection.contains(1));
        assert!(selection.contains(2));
    }

    #[test]
    fn test_selection_ids_sorted_and_clear() {
        let mut selection = Selection::new();
        selection.toggle(5);
        selection.toggle(2);
        selection.toggle(9);

        assert_eq!(selection.ids(), vec![2, 5, 9]);

        selection.clear();
        assert!(selection.is_empty());
    }
}
