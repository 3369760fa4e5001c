//! Minimal paginated PDF writer.
//!
//! Blocks are pushed one at a time and laid out top to bottom in Courier. A new
//! page starts whenever the next line would cross the bottom margin. Nothing is
//! serialized until [`PdfWriter::finish`], so callers only ever see a complete
//! document.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
// Courier advance width is 600/1000 em for every glyph.
const GLYPH_WIDTH_PER_MILLE: i64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Text {
        text: String,
        size: i64,
        align: Align,
    },
    Gap(i64),
}

impl Block {
    pub fn line(text: impl Into<String>) -> Self {
        Block::Text {
            text: text.into(),
            size: 11,
            align: Align::Left,
        }
    }

    pub fn centered(text: impl Into<String>, size: i64) -> Self {
        Block::Text {
            text: text.into(),
            size,
            align: Align::Center,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("failed to encode page content: {0}")]
    Encode(String),
    #[error("failed to serialize document: {0}")]
    Serialize(String),
}

pub struct PdfWriter {
    finished_pages: Vec<Vec<Operation>>,
    current_page: Vec<Operation>,
    cursor_y: i64,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self {
            finished_pages: Vec::new(),
            current_page: Vec::new(),
            cursor_y: PAGE_HEIGHT - MARGIN,
        }
    }

    pub fn page_count(&self) -> usize {
        self.finished_pages.len() + 1
    }

    pub fn push(&mut self, block: Block) {
        match block {
            Block::Gap(points) => {
                self.cursor_y -= points;
            }
            Block::Text { text, size, align } => {
                for line in wrap(&text, max_chars(size)) {
                    self.write_line(&line, size, align);
                }
            }
        }
    }

    fn write_line(&mut self, text: &str, size: i64, align: Align) {
        let leading = size + size / 3;
        if self.cursor_y - leading < MARGIN {
            let full = std::mem::take(&mut self.current_page);
            self.finished_pages.push(full);
            self.cursor_y = PAGE_HEIGHT - MARGIN;
        }
        self.cursor_y -= leading;

        let x = match align {
            Align::Left => MARGIN,
            Align::Center => {
                let width = text_width(text, size);
                ((PAGE_WIDTH - width) / 2).max(MARGIN)
            }
        };

        let page = &mut self.current_page;
        page.push(Operation::new("BT", vec![]));
        page.push(Operation::new("Tf", vec!["F1".into(), Object::Integer(size)]));
        page.push(Operation::new(
            "Td",
            vec![Object::Integer(x), Object::Integer(self.cursor_y)],
        ));
        page.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(text))],
        ));
        page.push(Operation::new("ET", vec![]));
    }

    /// Assembles the page tree and serializes the whole document.
    pub fn finish(mut self) -> Result<Vec<u8>, PdfError> {
        self.finished_pages.push(self.current_page);
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.finished_pages.len());
        for operations in self.finished_pages {
            let content = Content { operations };
            let encoded = content
                .encode()
                .map_err(|e| PdfError::Encode(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| PdfError::Serialize(e.to_string()))?;
        Ok(buffer)
    }
}

fn text_width(text: &str, size: i64) -> i64 {
    text.chars().count() as i64 * GLYPH_WIDTH_PER_MILLE * size / 1000
}

fn max_chars(size: i64) -> usize {
    let usable = PAGE_WIDTH - 2 * MARGIN;
    (usable * 1000 / (GLYPH_WIDTH_PER_MILLE * size)).max(1) as usize
}

/// Breaks on whitespace where possible, hard-splits words longer than a line.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..width).collect());
        }
        let word: String = word.into_iter().collect();

        let needed =
            current.chars().count() + usize::from(!current.is_empty()) + word.chars().count();
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Maps text onto WinAnsi bytes for the standard Type1 font. Turkish letters
/// outside the code page fall back to their unaccented form.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            'ı' => b'i',
            'İ' => b'I',
            'ş' => b's',
            'Ş' => b'S',
            'ğ' => b'g',
            'Ğ' => b'G',
            '€' => 0x80,
            c if (c as u32) < 0x80 => c as u8,
            c if (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}
