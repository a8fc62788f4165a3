//! Post query descriptor consumed by `PostRepository::find`.
//!
//! `matches` and `PostOrder::compare` are the reference semantics. The
//! in-memory adapter evaluates them directly; SQL adapters translate the
//! descriptor and must agree with them.

use std::cmp::Ordering;

use uuid::Uuid;

use crate::domain::{Post, PostStatus};
use crate::text;

/// Result ordering. Every variant ends on `id` so no order depends on the
/// store's default collection order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostOrder {
    /// `created_at` asc, then `id` asc. Insertion order.
    #[default]
    Oldest,
    /// `created_at` desc, then `id` desc.
    Newest,
    /// Like count desc, views desc, `created_at` desc, `id` desc.
    Popularity,
}

impl PostOrder {
    pub fn compare(&self, a: &Post, b: &Post) -> Ordering {
        match self {
            PostOrder::Oldest => a
                .created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id)),
            PostOrder::Newest => b
                .created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id)),
            PostOrder::Popularity => b
                .like_count()
                .cmp(&a.like_count())
                .then_with(|| b.views.cmp(&a.views))
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.cmp(&a.id)),
        }
    }
}

/// Text predicate over title and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMatch {
    /// Case-insensitive substring of title or content.
    Substring(String),
    /// Tokenized full-text match backed by the store's text index.
    FullText(String),
}

/// Topics of a source post: a candidate is related when it shares any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topics {
    pub category_ids: Vec<Uuid>,
    pub tags: Vec<String>,
}

impl Topics {
    pub fn of(post: &Post) -> Self {
        Self {
            category_ids: post.category_ids.clone(),
            tags: post.tags.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.category_ids.is_empty() && self.tags.is_empty()
    }

    /// True when `post` carries at least one of these categories or tags.
    pub fn shared_by(&self, post: &Post) -> bool {
        self.category_ids
            .iter()
            .any(|c| post.category_ids.contains(c))
            || self.tags.iter().any(|t| post.tags.contains(t))
    }
}

/// Conjunction of optional predicates plus ordering and limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub exclude_id: Option<Uuid>,
    pub related_to: Option<Topics>,
    pub category_id: Option<Uuid>,
    pub tag: Option<String>,
    pub status: Option<PostStatus>,
    pub text: Option<TextMatch>,
    pub order: PostOrder,
    pub limit: Option<u64>,
}

impl PostQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn excluding(mut self, id: Uuid) -> Self {
        self.exclude_id = Some(id);
        self
    }

    pub fn related_to(mut self, topics: Topics) -> Self {
        self.related_to = Some(topics);
        self
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matching(mut self, text: TextMatch) -> Self {
        self.text = Some(text);
        self
    }

    pub fn ordered_by(mut self, order: PostOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when `post` satisfies every predicate of the query.
    pub fn matches(&self, post: &Post) -> bool {
        if self.exclude_id == Some(post.id) {
            return false;
        }
        if let Some(topics) = &self.related_to {
            if !topics.shared_by(post) {
                return false;
            }
        }
        if let Some(category_id) = &self.category_id {
            if !post.category_ids.contains(category_id) {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !post.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if post.status != status {
                return false;
            }
        }
        match &self.text {
            Some(TextMatch::Substring(needle)) => {
                text::contains_ignore_case(&post.title, needle)
                    || text::contains_ignore_case(&post.content, needle)
            }
            Some(TextMatch::FullText(query)) => {
                text::full_text_match(&format!("{} {}", post.title, post.content), query)
            }
            None => true,
        }
    }

    /// Filter, sort and truncate an unordered collection.
    pub fn apply<I>(&self, posts: I) -> Vec<Post>
    where
        I: IntoIterator<Item = Post>,
    {
        let mut selected: Vec<Post> = posts.into_iter().filter(|p| self.matches(p)).collect();
        selected.sort_by(|a, b| self.order.compare(a, b));
        if let Some(limit) = self.limit {
            selected.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::domain::NewPost;

    fn post(title: &str, tags: &[&str], minutes_ago: i64) -> Post {
        let mut p = Post::new(
            Uuid::new_v4(),
            NewPost {
                title: title.to_string(),
                content: format!("{title} body"),
                status: PostStatus::Published,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                ..Default::default()
            },
            title.to_lowercase(),
        );
        p.created_at = Utc::now() - Duration::minutes(minutes_ago);
        p
    }

    #[test]
    fn test_empty_query_matches_everything_in_insertion_order() {
        let old = post("Old", &[], 10);
        let new = post("New", &[], 1);
        let result = PostQuery::new().apply(vec![new.clone(), old.clone()]);
        assert_eq!(result, vec![old, new]);
    }

    #[test]
    fn test_topics_are_shared_by_tag_or_category() {
        let rust = Uuid::new_v4();
        let mut categorised = post("Categorised", &["go"], 1);
        categorised.category_ids = vec![rust];

        let by_tag = Topics::of(&post("Tagged", &["rust", "async"], 1));
        assert!(by_tag.shared_by(&post("Other", &["rust"], 1)));
        assert!(!by_tag.shared_by(&categorised));

        let by_category = Topics {
            category_ids: vec![rust],
            tags: vec![],
        };
        assert!(by_category.shared_by(&categorised));
    }

    #[test]
    fn test_related_to_empty_topics_matches_nothing() {
        let p = post("Rust", &["rust"], 1);
        let q = PostQuery::new().related_to(Topics::default());
        assert!(!q.matches(&p));
    }

    #[test]
    fn test_excluded_post_never_matches() {
        let p = post("Rust", &["rust"], 1);
        let q = PostQuery::new()
            .related_to(Topics::of(&p))
            .excluding(p.id);
        assert!(!q.matches(&p));
    }

    #[test]
    fn test_popularity_ordering_breaks_ties() {
        let mut liked = post("Liked", &[], 30);
        liked.likes = vec![Uuid::new_v4(), Uuid::new_v4()];
        let mut viewed = post("Viewed", &[], 20);
        viewed.likes = vec![Uuid::new_v4()];
        viewed.views = 500;
        let mut newer = post("Newer", &[], 1);
        newer.likes = vec![Uuid::new_v4()];
        newer.views = 500;

        let result = PostQuery::new()
            .ordered_by(PostOrder::Popularity)
            .apply(vec![viewed.clone(), newer.clone(), liked.clone()]);

        let titles: Vec<_> = result.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Liked", "Newer", "Viewed"]);
    }

    #[test]
    fn test_limit_truncates_after_sorting() {
        let posts = (0..5).map(|i| post(&format!("P{i}"), &[], i)).collect::<Vec<_>>();
        let result = PostQuery::new()
            .ordered_by(PostOrder::Newest)
            .limit(2)
            .apply(posts);
        let titles: Vec<_> = result.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["P0", "P1"]);
    }

    #[test]
    fn test_substring_and_full_text_differ() {
        let p = post("Ownership", &[], 1);
        assert!(
            PostQuery::new()
                .matching(TextMatch::Substring("owner".to_string()))
                .matches(&p)
        );
        assert!(
            !PostQuery::new()
                .matching(TextMatch::FullText("owner".to_string()))
                .matches(&p)
        );
        assert!(
            PostQuery::new()
                .matching(TextMatch::FullText("ownership".to_string()))
                .matches(&p)
        );
    }
}
