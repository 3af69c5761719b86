//! Encoding buffer and the editor-component seam
//!
//! The viewer never edits text; it only needs to find elements in the MEI
//! source and move the editor's cursor. Lookups are plain text scans so they
//! keep working on encodings that are temporarily not well-formed while the
//! user types.

use once_cell::sync::Lazy;
use regex::Regex;

use super::cursor::{BufferPos, BufferRange};

static TAG_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"xml:id\s*=\s*["']([^"']*)["']"#).expect("valid id pattern"));

/// Operations the viewer needs from the text editor component
pub trait TextEditor {
    /// Current cursor position
    fn cursor(&self) -> BufferPos;

    /// Move the cursor
    fn set_cursor(&mut self, pos: BufferPos);

    /// Full buffer contents
    fn contents(&self) -> String;

    /// Range of the start tag of the element with this `xml:id`
    fn locate_id(&self, id: &str) -> Option<BufferRange>;

    /// `@n` of the nearest `<element>` start tag at or above `row`
    fn element_n_above(&self, row: usize, element: &str) -> Option<String>;

    /// Value of `attribute` on the element with this `xml:id`
    fn attribute_by_id(&self, id: &str, attribute: &str) -> Option<String>;

    /// `xml:id` of the element whose start tag holds (or precedes) the cursor
    fn element_id_at_cursor(&self) -> Option<String>;
}

/// In-memory encoding buffer with a cursor
#[derive(Debug, Clone)]
pub struct EncodingBuffer {
    text: String,
    line_starts: Vec<usize>,
    cursor: BufferPos,
}

impl EncodingBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let mut buffer = Self {
            text: String::new(),
            line_starts: vec![0],
            cursor: BufferPos::default(),
        };
        buffer.set_text(text);
        buffer
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the contents, clamping the cursor into the new text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.line_starts = std::iter::once(0)
            .chain(self.text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        self.cursor = self.pos_of(self.offset_of(self.cursor));
    }

    pub fn row_count(&self) -> usize {
        self.line_starts.len()
    }

    fn row_text(&self, row: usize) -> Option<&str> {
        let start = *self.line_starts.get(row)?;
        let end = self
            .line_starts
            .get(row + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        Some(&self.text[start..end])
    }

    /// Byte offset of a position, clamped to the buffer
    pub fn offset_of(&self, pos: BufferPos) -> usize {
        let row = pos.row.min(self.row_count() - 1);
        let start = self.line_starts[row];
        let line = self.row_text(row).unwrap_or("");
        let within = line
            .char_indices()
            .nth(pos.column)
            .map(|(i, _)| i)
            .unwrap_or(line.len());
        start + within
    }

    /// Position of a byte offset
    pub fn pos_of(&self, offset: usize) -> BufferPos {
        let offset = offset.min(self.text.len());
        let row = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let start = self.line_starts[row];
        BufferPos::new(row, self.text[start..offset].chars().count())
    }

    /// Column of `pos` in UTF-16 code units
    pub fn utf16_column(&self, pos: BufferPos) -> usize {
        let line = self.row_text(pos.row).unwrap_or("");
        line.chars().take(pos.column).map(char::len_utf16).sum()
    }

    /// Position of a row and a UTF-16 column; a column inside a surrogate
    /// pair resolves to the start of that character
    pub fn pos_from_utf16(&self, row: usize, column: usize) -> BufferPos {
        let line = self.row_text(row).unwrap_or("");
        let mut units = 0;
        let chars = line
            .chars()
            .take_while(|c| {
                units += c.len_utf16();
                units <= column
            })
            .count();
        BufferPos::new(row, chars)
    }

    /// Byte span of the start tag carrying `xml:id="id"`
    fn start_tag_span(&self, id: &str) -> Option<(usize, usize)> {
        let pattern = format!(r#"xml:id\s*=\s*["']{}["']"#, regex::escape(id));
        let found = Regex::new(&pattern).ok()?.find(&self.text)?;
        let open = self.text[..found.start()].rfind('<')?;
        let close = self.text[found.end()..].find('>')? + found.end() + 1;
        Some((open, close))
    }

    /// Span of the start tag opening at `open`, if it is a start tag at all
    fn tag_at(&self, open: usize) -> Option<&str> {
        let rest = &self.text[open..];
        if rest.starts_with("</") || rest.starts_with("<!") || rest.starts_with("<?") {
            return None;
        }
        let close = rest.find('>')?;
        Some(&rest[..=close])
    }
}

impl Default for EncodingBuffer {
    fn default() -> Self {
        Self::new("")
    }
}

fn attribute_value(tag: &str, attribute: &str) -> Option<String> {
    let pattern = format!(r#"\s{}\s*=\s*["']([^"']*)["']"#, regex::escape(attribute));
    let caps = Regex::new(&pattern).ok()?.captures(tag)?;
    Some(caps[1].to_string())
}

impl TextEditor for EncodingBuffer {
    fn cursor(&self) -> BufferPos {
        self.cursor
    }

    fn set_cursor(&mut self, pos: BufferPos) {
        self.cursor = self.pos_of(self.offset_of(pos));
    }

    fn contents(&self) -> String {
        self.text.clone()
    }

    fn locate_id(&self, id: &str) -> Option<BufferRange> {
        let (open, close) = self.start_tag_span(id)?;
        Some(BufferRange::new(self.pos_of(open), self.pos_of(close)))
    }

    fn element_n_above(&self, row: usize, element: &str) -> Option<String> {
        let pattern = format!(r"<{}[\s/>]", regex::escape(element));
        let opener = Regex::new(&pattern).ok()?;
        let last_row = row.min(self.row_count() - 1);
        (0..=last_row).rev().find_map(|r| {
            let line = self.row_text(r)?;
            let hit = opener.find_iter(line).last()?;
            let tag = self.tag_at(self.line_starts[r] + hit.start())?;
            attribute_value(tag, "n")
        })
    }

    fn attribute_by_id(&self, id: &str, attribute: &str) -> Option<String> {
        let (open, close) = self.start_tag_span(id)?;
        attribute_value(&self.text[open..close], attribute)
    }

    fn element_id_at_cursor(&self) -> Option<String> {
        let offset = self.offset_of(self.cursor);
        let mut end = if self.text[offset..].starts_with('<') { offset + 1 } else { offset };
        while let Some(open) = self.text[..end].rfind('<') {
            if let Some(caps) = self.tag_at(open).and_then(|tag| TAG_ID.captures(tag)) {
                return Some(caps[1].to_string());
            }
            end = open;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEI: &str = r##"<mei>
  <staff n="1" xml:id="s1">
    <layer n="2" xml:id="l1">
      <note xml:id="n1" pname="c"/>
      <chord xml:id="c1">
        <note xml:id="n2" pname="e"/>
      </chord>
    </layer>
  </staff>
  <slur xml:id="sl1" startid="#n2" endid="#n1"/>
</mei>"##;

    #[test]
    fn test_locate_id_returns_start_tag_range() {
        let buffer = EncodingBuffer::new(MEI);
        let range = buffer.locate_id("n1").unwrap();
        assert_eq!(range.start, BufferPos::new(3, 6));
        assert_eq!(range.end, BufferPos::new(3, 35));
        assert!(buffer.locate_id("missing").is_none());
    }

    #[test]
    fn test_locate_id_does_not_match_prefix() {
        let buffer = EncodingBuffer::new(r#"<note xml:id="n10"/><note xml:id="n1"/>"#);
        assert_eq!(buffer.locate_id("n1").unwrap().start, BufferPos::new(0, 20));
    }

    #[test]
    fn test_element_n_above() {
        let buffer = EncodingBuffer::new(MEI);
        assert_eq!(buffer.element_n_above(5, "staff").as_deref(), Some("1"));
        assert_eq!(buffer.element_n_above(5, "layer").as_deref(), Some("2"));
        assert_eq!(buffer.element_n_above(0, "staff"), None);
    }

    #[test]
    fn test_element_n_above_ignores_longer_names() {
        let buffer = EncodingBuffer::new("<staffDef n=\"9\"/>\n<note/>");
        assert_eq!(buffer.element_n_above(1, "staff"), None);
    }

    #[test]
    fn test_attribute_by_id() {
        let buffer = EncodingBuffer::new(MEI);
        assert_eq!(buffer.attribute_by_id("sl1", "startid").as_deref(), Some("#n2"));
        assert_eq!(buffer.attribute_by_id("n1", "startid"), None);
    }

    #[test]
    fn test_element_id_at_cursor() {
        let mut buffer = EncodingBuffer::new(MEI);
        buffer.set_cursor(BufferPos::new(5, 20));
        assert_eq!(buffer.element_id_at_cursor().as_deref(), Some("n2"));
        // Closing tags are skipped back to the previous start tag
        buffer.set_cursor(BufferPos::new(6, 8));
        assert_eq!(buffer.element_id_at_cursor().as_deref(), Some("n2"));
        buffer.set_cursor(BufferPos::new(0, 0));
        assert_eq!(buffer.element_id_at_cursor(), None);
    }

    #[test]
    fn test_cursor_is_clamped() {
        let mut buffer = EncodingBuffer::new("ab\ncd");
        buffer.set_cursor(BufferPos::new(7, 7));
        assert_eq!(buffer.cursor(), BufferPos::new(1, 2));
        buffer.set_text("x");
        assert_eq!(buffer.cursor(), BufferPos::new(0, 1));
    }

    #[test]
    fn test_columns_count_characters() {
        let buffer = EncodingBuffer::new("<title>Dvořák</title><note xml:id=\"a\"/>");
        assert_eq!(buffer.locate_id("a").unwrap().start, BufferPos::new(0, 21));
    }

    #[test]
    fn test_utf16_columns_around_astral_characters() {
        // the clef glyph takes two UTF-16 units but one char
        let buffer = EncodingBuffer::new("<!-- \u{1D11E} --><note xml:id=\"n1\"/>");
        let range = buffer.locate_id("n1").unwrap();
        assert_eq!(range.start, BufferPos::new(0, 10));
        assert_eq!(buffer.utf16_column(range.start), 11);
        assert_eq!(buffer.pos_from_utf16(0, 11), range.start);
        // inside the surrogate pair
        assert_eq!(buffer.pos_from_utf16(0, 6), BufferPos::new(0, 5));
        assert_eq!(buffer.pos_from_utf16(0, 99), BufferPos::new(0, 29));
    }
}
