//! Best-effort page counting for compiled PDFs.

use bytes::Bytes;
use lopdf::Document;
use tracing::warn;

/// Counts pages in a PDF. Returns `None` if the bytes cannot be parsed or hold no pages.
pub fn count_pages(pdf: &[u8]) -> Option<usize> {
    match Document::load_mem(pdf) {
        Ok(doc) => Some(doc.get_pages().len()).filter(|&pages| pages > 0),
        Err(e) => {
            warn!("Could not count PDF pages: {e}");
            None
        }
    }
}

/// Async wrapper: PDF parsing is CPU-bound, so it runs on the blocking pool.
/// A join failure is treated like a parse failure.
pub async fn page_count(pdf: Bytes) -> Option<usize> {
    tokio::task::spawn_blocking(move || count_pages(&pdf))
        .await
        .unwrap_or_else(|e| {
            warn!("Page count task failed: {e}");
            None
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::pdf_with_pages;

    #[test]
    fn test_counts_single_page() {
        assert_eq!(count_pages(&pdf_with_pages(1)), Some(1));
    }

    #[test]
    fn test_counts_multiple_pages() {
        assert_eq!(count_pages(&pdf_with_pages(3)), Some(3));
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(count_pages(b"%PDF-1.4 definitely not a real document"), None);
        assert_eq!(count_pages(b""), None);
    }

    #[tokio::test]
    async fn test_async_page_count() {
        let pdf = Bytes::from(pdf_with_pages(2));
        assert_eq!(page_count(pdf).await, Some(2));
    }
}
