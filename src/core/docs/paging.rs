// Pagination over document paragraphs.
// A "page" is a fixed number of paragraphs, not a printed page.

use super::docs_source::DocsError;

/// Hard ceiling on paragraphs per page.
pub const MAX_PAGE_SIZE: usize = 500;

/// The paragraphs selected for a page range, plus where the range sits.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<'a> {
    pub paragraphs: &'a [String],
    pub page: usize,
    pub end_page: usize,
    pub total_pages: usize,
}

impl PageSlice<'_> {
    pub fn has_more(&self) -> bool {
        self.end_page < self.total_pages
    }
}

/// Selects pages `page..=end_page` (1-based) of `page_size` paragraphs each.
///
/// An empty document still has one (empty) page. `end_page` past the end is
/// clamped; a start page past the end is an error.
pub fn paginate(
    paragraphs: &[String],
    page: usize,
    page_size: usize,
    end_page: Option<usize>,
) -> Result<PageSlice<'_>, DocsError> {
    if page == 0 {
        return Err(DocsError::InvalidInput("page must be at least 1".to_string()));
    }
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(DocsError::InvalidInput(format!(
            "page_size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }

    let end_page = end_page.unwrap_or(page);
    if end_page < page {
        return Err(DocsError::InvalidInput(
            "end_page must not be before page".to_string(),
        ));
    }

    let total_pages = paragraphs.len().div_ceil(page_size).max(1);
    if page > total_pages {
        return Err(DocsError::InvalidInput(format!(
            "page {} is out of range (document has {} page(s))",
            page, total_pages
        )));
    }

    let end_page = end_page.min(total_pages);
    let start = (page - 1) * page_size;
    let end = (end_page * page_size).min(paragraphs.len());

    Ok(PageSlice {
        paragraphs: &paragraphs[start.min(end)..end],
        page,
        end_page,
        total_pages,
    })
}
