// PDF sink: paginated grid of the same Table the CSV sink receives
//
// Layout happens on the logical PdfDocument (pages of exact cell values);
// `to_bytes` renders it as a self-contained PDF 1.4 file with the standard
// Helvetica fonts, landscape A4.

use serde::Serialize;

use super::table::Table;

const PAGE_WIDTH: f32 = 842.0;
const PAGE_HEIGHT: f32 = 595.0;
const MARGIN: f32 = 36.0;
const TITLE_HEIGHT: f32 = 24.0;
const ROW_HEIGHT: f32 = 15.0;
const FONT_SIZE: f32 = 8.0;
const CELL_PADDING: f32 = 3.0;
/// Long cells shrink toward this size and wrap instead of being cut
const MIN_FONT_SIZE: f32 = 1.0;
const LINE_SPACING: f32 = 1.15;
/// Average Helvetica glyph width as a fraction of the font size
const GLYPH_WIDTH: f32 = 0.55;

/// Rows that fit under the title and header row: (595 - 72 - 24 - 15) / 15
const MAX_ROWS_PER_PAGE: usize = 32;

pub const DEFAULT_ROWS_PER_PAGE: usize = 30;

// ============================================================================
// LOGICAL DOCUMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfPage {
    /// 1-based
    pub number: usize,
    /// Repeated on every page
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfDocument {
    pub title: Option<String>,
    pub pages: Vec<PdfPage>,
}

impl PdfDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn headers(&self) -> &[String] {
        self.pages.first().map(|p| p.headers.as_slice()).unwrap_or_default()
    }

    /// Data rows across all pages, in order
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.pages.iter().flat_map(|p| p.rows.iter().cloned()).collect()
    }

    /// Render the PDF file
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut pdf = PdfBuilder::new();
        let page_count = self.pages.len();

        // 1: catalog, 2: page tree, 3-4: fonts, then (page, content) pairs
        let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", 5 + 2 * i)).collect();
        pdf.object(1, "<< /Type /Catalog /Pages 2 0 R >>".to_string());
        pdf.object(
            2,
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), page_count),
        );
        pdf.object(3, "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());
        pdf.object(4, "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold >>".to_string());

        for (i, page) in self.pages.iter().enumerate() {
            let page_obj = 5 + 2 * i;
            let content_obj = page_obj + 1;
            pdf.object(
                page_obj,
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                     /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                    PAGE_WIDTH, PAGE_HEIGHT, content_obj
                ),
            );
            let content = self.page_content(page, page_count);
            pdf.stream(content_obj, content.as_bytes());
        }

        pdf.finish(1)
    }

    fn page_content(&self, page: &PdfPage, page_count: usize) -> String {
        let mut out = String::new();
        let top = PAGE_HEIGHT - MARGIN;
        let columns = page.headers.len().max(1);
        let col_width = (PAGE_WIDTH - 2.0 * MARGIN) / columns as f32;

        if let Some(title) = &self.title {
            out.push_str(&text("F2", 12.0, MARGIN, top - 14.0, title));
        }

        let table_top = top - TITLE_HEIGHT;
        out.push_str("0.5 w\n");

        let all_rows = std::iter::once((true, &page.headers)).chain(page.rows.iter().map(|r| (false, r)));
        for (r, (is_header, row)) in all_rows.enumerate() {
            let y = table_top - (r as f32 + 1.0) * ROW_HEIGHT;
            let font = if is_header { "F2" } else { "F1" };

            if is_header {
                out.push_str(&format!(
                    "0.9 g {:.2} {:.2} {:.2} {:.2} re f 0 g\n",
                    MARGIN,
                    y,
                    PAGE_WIDTH - 2.0 * MARGIN,
                    ROW_HEIGHT
                ));
            }

            for c in 0..columns {
                let x = MARGIN + c as f32 * col_width;
                out.push_str(&format!("{:.2} {:.2} {:.2} {:.2} re S\n", x, y, col_width, ROW_HEIGHT));
                if let Some(cell) = row.get(c) {
                    let (size, lines) = fit_cell(cell, col_width);
                    let leading = size * LINE_SPACING;
                    let first = y + (ROW_HEIGHT + leading * lines.len() as f32) / 2.0 - size;
                    for (i, line) in lines.iter().enumerate() {
                        out.push_str(&text(font, size, x + CELL_PADDING, first - i as f32 * leading, line));
                    }
                }
            }
        }

        let footer = format!("Page {} of {}", page.number, page_count);
        out.push_str(&text("F1", FONT_SIZE, PAGE_WIDTH - MARGIN - 60.0, MARGIN / 2.0, &footer));
        out
    }
}

/// Largest font size at which the whole cell fits the row, wrapped to the column.
/// Below `MIN_FONT_SIZE` the lines are kept anyway and overflow the row.
fn fit_cell(value: &str, col_width: f32) -> (f32, Vec<String>) {
    let shown: String = value.chars().map(printable).collect();
    let mut size = FONT_SIZE;
    loop {
        let capacity = ((col_width - 2.0 * CELL_PADDING) / (size * GLYPH_WIDTH)).max(1.0) as usize;
        let lines = wrap(&shown, capacity);
        if lines.len() as f32 * size * LINE_SPACING <= ROW_HEIGHT - 2.0 || size <= MIN_FONT_SIZE {
            return (size, lines);
        }
        size = (size - 0.5).max(MIN_FONT_SIZE);
    }
}

/// Greedy word wrap; words longer than a line are split
fn wrap(text: &str, capacity: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        loop {
            let used = current.chars().count();
            let needed = if used == 0 { 0 } else { used + 1 } + word.chars().count();
            if needed <= capacity {
                if used > 0 {
                    current.push(' ');
                }
                current.push_str(word);
                break;
            }
            if used > 0 {
                lines.push(std::mem::take(&mut current));
                continue;
            }
            let split = word.char_indices().nth(capacity).map_or(word.len(), |(i, _)| i);
            lines.push(word[..split].to_string());
            word = &word[split..];
            if word.is_empty() {
                break;
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// One text-show operation
fn text(font: &str, size: f32, x: f32, y: f32, value: &str) -> String {
    let shown: String = value.chars().map(printable).collect();
    format!(
        "BT /{} {} Tf {:.2} {:.2} Td ({}) Tj ET\n",
        font,
        size,
        x,
        y,
        escape(&shown)
    )
}

/// Standard Type1 fonts only cover printable ASCII here
fn printable(c: char) -> char {
    if c.is_ascii() && !c.is_ascii_control() {
        c
    } else if c.is_whitespace() {
        ' '
    } else {
        '?'
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// ============================================================================
// FILE ASSEMBLY
// ============================================================================

struct PdfBuilder {
    buffer: Vec<u8>,
    offsets: Vec<(usize, usize)>,
}

impl PdfBuilder {
    fn new() -> Self {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(b"%PDF-1.4\n");
        PdfBuilder {
            buffer,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, number: usize, body: String) {
        self.offsets.push((number, self.buffer.len()));
        self.buffer
            .extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", number, body).as_bytes());
    }

    fn stream(&mut self, number: usize, data: &[u8]) {
        self.offsets.push((number, self.buffer.len()));
        self.buffer.extend_from_slice(
            format!("{} 0 obj\n<< /Length {} >>\nstream\n", number, data.len()).as_bytes(),
        );
        self.buffer.extend_from_slice(data);
        self.buffer.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self, root: usize) -> Vec<u8> {
        self.offsets.sort_unstable();
        let size = self.offsets.last().map_or(0, |(n, _)| *n) + 1;
        let xref_offset = self.buffer.len();

        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", size);
        let mut next = 1;
        for (number, offset) in &self.offsets {
            // Unused numbers become free entries
            while next < *number {
                xref.push_str("0000000000 65535 f \n");
                next += 1;
            }
            xref.push_str(&format!("{:010} 00000 n \n", offset));
            next += 1;
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            size, root, xref_offset
        ));

        self.buffer.extend_from_slice(xref.as_bytes());
        self.buffer
    }
}

// ============================================================================
// WRITER
// ============================================================================

#[derive(Debug, Clone)]
pub struct PdfWriter {
    rows_per_page: usize,
    title: Option<String>,
}

impl PdfWriter {
    pub fn new() -> Self {
        PdfWriter {
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            title: None,
        }
    }

    /// Builder: rows per page, capped at what fits on a landscape A4 page
    pub fn with_rows_per_page(mut self, rows: usize) -> Self {
        self.rows_per_page = rows.clamp(1, MAX_ROWS_PER_PAGE);
        self
    }

    /// Builder: heading printed on every page
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    /// Split a table into pages. An empty table still yields one header-only page.
    pub fn layout(&self, table: &Table) -> PdfDocument {
        let chunks: Vec<&[Vec<String>]> = if table.rows.is_empty() {
            vec![&[]]
        } else {
            table.rows.chunks(self.rows_per_page).collect()
        };

        let pages = chunks
            .into_iter()
            .enumerate()
            .map(|(i, rows)| PdfPage {
                number: i + 1,
                headers: table.headers.clone(),
                rows: rows.to_vec(),
            })
            .collect();

        PdfDocument {
            title: self.title.clone(),
            pages,
        }
    }

    pub fn to_bytes(&self, table: &Table) -> Vec<u8> {
        self.layout(table).to_bytes()
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}
