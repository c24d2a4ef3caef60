//! Paging and sort requests

use std::fmt;

use serde_json::{json, Value as JsonValue};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub field: String,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.field, self.direction.as_str())
    }
}

/// A zero-based page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
    pub sort: Vec<SortOrder>,
}

impl PageRequest {
    pub fn of(page: usize, size: usize) -> Self {
        Self {
            page,
            size,
            sort: Vec::new(),
        }
    }

    pub fn sorted_by(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    /// Number of rows skipped before this page
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page={}, size={}", self.page, self.size)?;
        for order in &self.sort {
            write!(f, ", sort={}", order)?;
        }
        Ok(())
    }
}

/// One page of results plus the total across all pages
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    content: Vec<T>,
    request: PageRequest,
    total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            request,
            total_elements,
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn request(&self) -> &PageRequest {
        &self.request
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    /// A zero-size page never comes out of the query service; it counts as
    /// a single page here.
    pub fn total_pages(&self) -> u64 {
        if self.request.size == 0 {
            return 1;
        }
        let size = self.request.size as u64;
        (self.total_elements + size - 1) / size
    }

    pub fn is_last(&self) -> bool {
        (self.request.page as u64) + 1 >= self.total_pages()
    }

    /// Splits off the content, keeping the page metadata
    pub fn into_parts(self) -> (Vec<T>, PageRequest, u64) {
        (self.content, self.request, self.total_elements)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            request: self.request,
            total_elements: self.total_elements,
        }
    }

    /// JSON envelope with paging metadata
    pub fn to_json(&self, item: impl Fn(&T) -> JsonValue) -> JsonValue {
        json!({
            "content": self.content.iter().map(item).collect::<Vec<_>>(),
            "page": self.request.page,
            "size": self.request.size,
            "totalElements": self.total_elements,
            "totalPages": self.total_pages(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::of(0, 20).offset(), 0);
        assert_eq!(PageRequest::of(3, 20).offset(), 60);
    }

    #[test]
    fn test_total_pages() {
        let page = Page::new(vec![1, 2], PageRequest::of(0, 2), 5);
        assert_eq!(page.total_pages(), 3);
        assert!(!page.is_last());

        let last = Page::new(vec![5], PageRequest::of(2, 2), 5);
        assert!(last.is_last());

        let empty: Page<i32> = Page::new(vec![], PageRequest::of(0, 10), 0);
        assert_eq!(empty.total_pages(), 0);
        assert!(empty.is_last());
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Page::new(vec![1, 2], PageRequest::of(1, 2), 4).map(|v| v * 10);
        assert_eq!(page.content(), &[10, 20]);
        assert_eq!(page.request().page, 1);
        assert_eq!(page.total_elements(), 4);
    }

    #[test]
    fn test_display() {
        let request = PageRequest::of(1, 5).sorted_by(SortOrder::desc("views"));
        assert_eq!(request.to_string(), "page=1, size=5, sort=views,desc");
    }
}
