//! Paginated report documents
//!
//! Lays a [`Report`] out on fixed-height pages the way the printable export
//! does: a header block, then one block per feedback item, breaking to a new
//! page once the vertical cursor passes the page limit. Positions are in page
//! units; the rendered output is plain text with a form feed between pages.

use crate::report::Report;

const DOCUMENT_TITLE: &str = "Website Feedback Report";
const SCREENSHOT_MARKER: &str = "[screenshot attached]";
const PAGE_BREAK: &str = "\u{000C}\n";

/// Vertical layout parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    /// Cursor position where the first item starts on the first page
    pub header_end: u32,
    /// Cursor position where content starts on subsequent pages
    pub top_margin: u32,
    /// An item starting past this position goes to a new page
    pub break_after: u32,
    pub title_advance: u32,
    pub meta_advance: u32,
    pub line_advance: u32,
    pub block_gap: u32,
    pub screenshot_advance: u32,
    pub separator_advance: u32,
    /// Columns available for wrapped description text
    pub wrap_width: usize,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            header_end: 70,
            top_margin: 20,
            break_after: 250,
            title_advance: 10,
            meta_advance: 10,
            line_advance: 7,
            block_gap: 10,
            screenshot_advance: 110,
            separator_advance: 15,
            wrap_width: 80,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub lines: Vec<String>,
}

/// A report laid out on pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pages: Vec<Page>,
}

impl ReportDocument {
    pub fn layout(report: &Report, layout: &PageLayout) -> Self {
        let mut pages = Vec::new();
        let mut page = Page {
            lines: vec![
                DOCUMENT_TITLE.to_string(),
                format!("Session ID: {}", report.session_id),
                format!("Generated: {}", report.generated.to_rfc3339()),
                format!("Total Feedback Items: {}", report.feedback_count),
                String::new(),
            ],
        };
        let mut y = layout.header_end;

        for (index, item) in report.items.iter().enumerate() {
            if y > layout.break_after {
                pages.push(std::mem::take(&mut page));
                y = layout.top_margin;
            }

            page.lines.push(format!("{}. {}", index + 1, item.title));
            y += layout.title_advance;

            page.lines.push(format!(
                "Type: {} | Severity: {} | Path: {}",
                item.kind, item.severity, item.path
            ));
            y += layout.meta_advance;

            let description = wrap_text(&item.description, layout.wrap_width);
            y += description.len() as u32 * layout.line_advance + layout.block_gap;
            page.lines.extend(description);

            if item.screenshot.is_some() {
                page.lines.push(SCREENSHOT_MARKER.to_string());
                y += layout.screenshot_advance;
            }

            page.lines.push("-".repeat(layout.wrap_width));
            y += layout.separator_advance;
        }

        pages.push(page);
        Self { pages }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn render(&self) -> String {
        self.pages
            .iter()
            .map(|page| {
                let mut text = page.lines.join("\n");
                text.push('\n');
                text
            })
            .collect::<Vec<_>>()
            .join(PAGE_BREAK)
    }
}

/// Word-wrap text to `width` columns, keeping explicit line breaks and
/// splitting words longer than a full line
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let current_len = current.chars().count();
            if current_len > 0 && current_len + 1 + word.len() > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.extend(word);
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{Feedback, FeedbackKind, Severity};
    use chrono::Utc;

    fn item(n: usize, screenshot: bool) -> Feedback {
        Feedback {
            id: format!("id-{}", n),
            title: format!("Item {}", n),
            description: "Short description".to_string(),
            path: "/about".to_string(),
            kind: FeedbackKind::Improvement,
            severity: Severity::Low,
            screenshot: screenshot.then(|| "data:image/png;base64,AAAA".to_string()),
            session_id: "s1".to_string(),
            user_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_header_and_single_page() {
        let report = Report::new("s1", vec![item(1, false)]);
        let doc = ReportDocument::layout(&report, &PageLayout::default());
        assert_eq!(doc.pages().len(), 1);

        let lines = &doc.pages()[0].lines;
        assert_eq!(lines[0], DOCUMENT_TITLE);
        assert_eq!(lines[1], "Session ID: s1");
        assert_eq!(lines[3], "Total Feedback Items: 1");
        assert!(lines.contains(&"Type: improvement | Severity: low | Path: /about".to_string()));
    }

    #[test]
    fn test_page_break_after_limit() {
        // Each plain item advances 52 units: 70 -> 122 -> 174 -> 226 -> 278,
        // so the fifth item starts past the limit.
        let items: Vec<Feedback> = (1..=5).map(|n| item(n, false)).collect();
        let report = Report::new("s1", items);
        let doc = ReportDocument::layout(&report, &PageLayout::default());

        assert_eq!(doc.pages().len(), 2);
        assert_eq!(doc.pages()[1].lines[0], "5. Item 5");
    }

    #[test]
    fn test_screenshot_consumes_space() {
        let items = vec![item(1, true), item(2, true), item(3, false)];
        let report = Report::new("s1", items);
        let doc = ReportDocument::layout(&report, &PageLayout::default());

        // 70 + 162 = 232, then 232 + 162 = 394 > 250
        assert_eq!(doc.pages().len(), 2);
        assert!(doc.pages()[0].lines.contains(&SCREENSHOT_MARKER.to_string()));
        assert_eq!(doc.pages()[1].lines[0], "3. Item 3");
    }

    #[test]
    fn test_render_separates_pages() {
        let items: Vec<Feedback> = (1..=5).map(|n| item(n, false)).collect();
        let doc = ReportDocument::layout(&Report::new("s1", items), &PageLayout::default());
        let rendered = doc.render();
        assert_eq!(rendered.matches('\u{000C}').count(), 1);
        assert!(rendered.starts_with(DOCUMENT_TITLE));
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("a\nb", 10), vec!["a", "b"]);
        assert_eq!(wrap_text("", 10), vec![""]);
    }
}
