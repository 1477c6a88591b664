//! One fetched feed document.

use crate::model::Entity;

/// The entities of a single feed response, plus the continuation the server
/// advertised with `<link rel="next">` and the `m:count` total it reported
/// for `$inlinecount=allpages`.
///
/// Pages come out of [`FeedPages`](super::FeedPages); a [`Query`](super::Query)
/// concatenates them.
///
/// ```ignore
/// let mut pages = service.collection("Courses").inline_count().pages();
///
/// while let Some(page) = pages.next().await {
///     let page = page?;
///     for course in &page {
///         println!("{:?}", course.get_string("Title"));
///     }
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Page {
    entities: Vec<Entity>,
    next_link: Option<String>,
    total_count: Option<usize>,
}

impl Page {
    pub fn new(entities: Vec<Entity>, next_link: Option<String>, total_count: Option<usize>) -> Self {
        Self {
            entities,
            next_link,
            total_count,
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    /// The continuation path or URL, exactly as the feed wrote it.
    pub fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref()
    }

    /// The server-side total across all pages, not the size of this page.
    pub fn total_count(&self) -> Option<usize> {
        self.total_count
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the feed pointed at a following page. A page cap may still
    /// stop [`FeedPages`](super::FeedPages) from fetching it.
    pub fn has_more(&self) -> bool {
        self.next_link.is_some()
    }
}

impl IntoIterator for Page {
    type Item = Entity;
    type IntoIter = std::vec::IntoIter<Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

impl<'a> IntoIterator for &'a Page {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
