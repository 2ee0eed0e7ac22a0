use super::{ExtractionError, PageContent};

pub fn extract_pdf(bytes: &[u8]) -> Result<Vec<PageContent>, ExtractionError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractionError::PdfError(e.to_string()))?;
    Ok(number_pages(pages))
}

/// One entry per physical page, in document order. Blank pages are dropped
/// but keep their position in the numbering.
fn number_pages<S: AsRef<str>>(pages: impl IntoIterator<Item = S>) -> Vec<PageContent> {
    pages
        .into_iter()
        .enumerate()
        .filter_map(|(i, page_text)| {
            let text = page_text.as_ref().trim();
            (!text.is_empty()).then(|| PageContent {
                page_number: i + 1,
                text: text.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_text_is_trimmed() {
        let pages = number_pages(["\n  Hello world\nsecond line  \n"]);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[0].text, "Hello world\nsecond line");
    }

    #[test]
    fn pages_numbered_in_document_order() {
        let pages = number_pages(["first", "second", "third"]);
        let numbers: Vec<usize> = pages.iter().map(|p| p.page_number).collect();
        let texts: Vec<&str> = pages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn blank_pages_keep_numbering_of_later_pages() {
        let pages = number_pages(["cover", "   \n", "body"]);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[1].page_number, 3);
        assert_eq!(pages[1].text, "body");
    }

    #[test]
    fn blank_document_has_no_pages() {
        assert!(number_pages(Vec::<String>::new()).is_empty());
        assert!(number_pages([" \n", "\n "]).is_empty());
    }
}
