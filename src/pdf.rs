//! Minimal single-font PDF writer used by the report renderer.
//!
//! One base font (Helvetica), US-Letter pages, a top-down cursor with
//! automatic page breaks at the bottom margin and an explicit `add_page`
//! for forced breaks. Content streams are left uncompressed.

pub const PAGE_WIDTH: f64 = 612.0;
pub const PAGE_HEIGHT: f64 = 792.0;

// Average glyph advance for Helvetica, as a fraction of the font size.
// Good enough for wrapping and centering plain report text.
const GLYPH_WIDTH: f64 = 0.5;
const LINE_SPACING: f64 = 1.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

pub struct Pdf {
    margin: f64,
    pages: Vec<String>,
    cursor: f64,
    line_height: f64,
    fill_gray: f64,
}

impl Pdf {
    pub fn new(margin: f64) -> Self {
        Self {
            margin,
            pages: vec![String::new()],
            cursor: margin,
            line_height: 12.0 * LINE_SPACING,
            fill_gray: 0.0,
        }
    }

    /// Distance of the cursor from the top of the current page, in points.
    pub fn cursor_y(&self) -> f64 {
        self.cursor
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Forced page break: start a fresh page with the cursor at the top margin.
    pub fn add_page(&mut self) {
        self.pages.push(String::new());
        self.cursor = self.margin;
    }

    /// Nonstroking gray level for subsequent text, 0.0 black to 1.0 white.
    pub fn set_fill_gray(&mut self, gray: f64) {
        self.fill_gray = gray.clamp(0.0, 1.0);
    }

    pub fn text(&mut self, size: f64, content: &str, align: Align) {
        self.text_inner(size, content, align, false);
    }

    pub fn text_underlined(&mut self, size: f64, content: &str) {
        self.text_inner(size, content, Align::Left, true);
    }

    /// Advance the cursor by a number of line heights without emitting text.
    pub fn move_down(&mut self, lines: f64) {
        self.cursor += lines * self.line_height;
    }

    /// Horizontal rule across the content width at the current cursor.
    pub fn hr(&mut self) {
        let y = PAGE_HEIGHT - self.cursor;
        let op = format!(
            "{:.2} {:.2} m {:.2} {:.2} l S\n",
            self.margin,
            y,
            PAGE_WIDTH - self.margin,
            y
        );
        self.current_page().push_str(&op);
    }

    fn text_inner(&mut self, size: f64, content: &str, align: Align, underline: bool) {
        let content_width = PAGE_WIDTH - 2.0 * self.margin;
        let max_chars = ((content_width / (GLYPH_WIDTH * size)).floor() as usize).max(1);
        let line_height = size * LINE_SPACING;
        self.line_height = line_height;

        for line in wrap(content, max_chars) {
            if self.cursor + line_height > PAGE_HEIGHT - self.margin {
                self.add_page();
            }
            let line_width = GLYPH_WIDTH * size * (line.chars().count() as f64);
            let x = match align {
                Align::Left => self.margin,
                Align::Center => (PAGE_WIDTH - line_width) / 2.0,
            };
            let baseline = PAGE_HEIGHT - self.cursor - size;
            let op = format!(
                "{:.2} g BT /F1 {:.2} Tf 1 0 0 1 {:.2} {:.2} Tm ({}) Tj ET\n",
                self.fill_gray,
                size,
                x,
                baseline,
                escape(&line)
            );
            self.current_page().push_str(&op);
            if underline && !line.is_empty() {
                let y = baseline - 2.0;
                let op = format!("{:.2} {:.2} m {:.2} {:.2} l S\n", x, y, x + line_width, y);
                self.current_page().push_str(&op);
            }
            self.cursor += line_height;
        }
    }

    fn current_page(&mut self) -> &mut String {
        // pages starts with one entry and only ever grows.
        self.pages.last_mut().expect("at least one page")
    }

    /// Serializes the whole document. Infallible; writing the bytes out is
    /// the caller's concern.
    pub fn render(&self) -> Vec<u8> {
        let page_count = self.pages.len();
        // Objects: 1 catalog, 2 page tree, 3 font, then (page, content) pairs.
        let mut objects: Vec<String> = Vec::with_capacity(3 + 2 * page_count);
        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());

        let kids: Vec<String> = (0..page_count)
            .map(|i| format!("{} 0 R", 4 + 2 * i))
            .collect();
        objects.push(format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_count
        ));
        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );

        for (i, content) in self.pages.iter().enumerate() {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.0} {:.0}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                PAGE_WIDTH,
                PAGE_HEIGHT,
                5 + 2 * i
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}endstream",
                content.len(),
                content
            ));
        }

        let mut out: Vec<u8> = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n");
        let mut offsets: Vec<usize> = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_start = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for off in &offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_start
            )
            .as_bytes(),
        );
        out
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\n' | '\r' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

/// Greedy word wrap; overlong words are broken hard at the width limit.
fn wrap(content: &str, max_chars: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw_line in content.split('\n') {
        let mut line = String::new();
        let mut line_chars = 0usize;
        for word in raw_line.split_whitespace() {
            let word_chars = word.chars().count();
            if line_chars > 0 && line_chars + 1 + word_chars > max_chars {
                lines.push(std::mem::take(&mut line));
                line_chars = 0;
            }
            if line_chars > 0 {
                line.push(' ');
                line_chars += 1;
            }
            if word_chars > max_chars {
                // Hard-break a word that cannot fit on any line.
                for c in word.chars() {
                    if line_chars == max_chars {
                        lines.push(std::mem::take(&mut line));
                        line_chars = 0;
                    }
                    line.push(c);
                    line_chars += 1;
                }
            } else {
                line.push_str(word);
                line_chars += word_chars;
            }
        }
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
