//! Page layout engine.
//!
//! A small flow layout over fixed-size pages: a vertical cursor, word
//! wrapping with Helvetica metrics, an exclusion zone for a placed image,
//! and automatic page breaks. Coordinates are PDF points measured from the
//! top-left corner; conversion to PDF space happens at render time.

/// A4 portrait in points.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const PAGE_MARGIN: f32 = 50.0;

const LINE_HEIGHT_FACTOR: f32 = 1.15;
/// Space kept between wrapped text and a placed image.
const IMAGE_GUTTER: f32 = 10.0;

/// Helvetica advance widths (1/1000 em) for WinAnsi 0x20..=0x7E.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];
/// Helvetica advance widths for WinAnsi 0xA0..=0xFF (the Latin-1 range).
const HELVETICA_LATIN1_WIDTHS: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 0xF0
];
/// Width of '?', which replaces characters WinAnsi cannot show.
const DEFAULT_WIDTH: u16 = 556;

/// Width of `text` set in Helvetica at `size` points.
pub fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| match c as u32 {
            code @ 0x20..=0x7E => HELVETICA_WIDTHS[(code - 0x20) as usize] as u32,
            code @ 0xA0..=0xFF => HELVETICA_LATIN1_WIDTHS[(code - 0xA0) as usize] as u32,
            _ => DEFAULT_WIDTH as u32,
        })
        .sum();
    units as f32 * size / 1000.0
}

pub fn line_height(size: f32) -> f32 {
    size * LINE_HEIGHT_FACTOR
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    fn overlaps_band(&self, top: f32, bottom: f32) -> bool {
        top < self.y + self.height && bottom > self.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Something drawn on a page.
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    /// A line of text whose top edge sits at `y`.
    Text {
        x: f32,
        y: f32,
        size: f32,
        text: String,
    },
    /// A horizontal stroke.
    Rule { x1: f32, x2: f32, y: f32, width: f32 },
    /// The placed image.
    Image(Rect),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub marks: Vec<Mark>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.marks.iter().filter_map(|mark| match mark {
            Mark::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug)]
pub struct PageLayout {
    pages: Vec<Page>,
    cursor_y: f32,
    font_size: f32,
    /// Image exclusion zone, tied to the page it was placed on.
    exclusion: Option<(usize, Rect)>,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl PageLayout {
    pub fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            cursor_y: PAGE_MARGIN,
            font_size: 12.0,
            exclusion: None,
        }
    }

    pub fn font_size(&mut self, size: f32) -> &mut Self {
        self.font_size = size;
        self
    }

    pub fn cursor_y(&self) -> f32 {
        self.cursor_y
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Advance the cursor by `lines` at the current font size.
    pub fn move_down(&mut self, lines: f32) -> &mut Self {
        self.cursor_y += line_height(self.font_size) * lines;
        self
    }

    /// Place an image at a fixed position on the current page. Text flowing
    /// past it is narrowed so it does not run underneath.
    pub fn place_image(&mut self, rect: Rect) -> &mut Self {
        let page = self.pages.len() - 1;
        self.pages[page].marks.push(Mark::Image(rect));
        self.exclusion = Some((page, rect));
        self
    }

    pub fn text(&mut self, text: &str, align: Align) -> &mut Self {
        self.write(text, align, false)
    }

    pub fn underlined(&mut self, text: &str) -> &mut Self {
        self.write(text, Align::Left, true)
    }

    pub fn finish(self) -> Vec<Page> {
        self.pages
    }

    fn write(&mut self, text: &str, align: Align, underline: bool) -> &mut Self {
        let size = self.font_size;
        let height = line_height(size);
        let mut words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            self.cursor_y += height;
            return self;
        }

        while !words.is_empty() {
            if self.cursor_y + height > PAGE_HEIGHT - PAGE_MARGIN {
                self.pages.push(Page::default());
                self.cursor_y = PAGE_MARGIN;
            }

            let (left, right) = self.band(self.cursor_y, self.cursor_y + height);
            let line = take_line(&mut words, right - left, size);
            let width = text_width(&line, size);
            let x = match align {
                Align::Left => left,
                Align::Center => left + ((right - left) - width).max(0.0) / 2.0,
            };

            let last = self.pages.len() - 1;
            let page = &mut self.pages[last];
            if underline {
                page.marks.push(Mark::Rule {
                    x1: x,
                    x2: x + width,
                    y: self.cursor_y + size,
                    width: (size / 16.0).max(0.5),
                });
            }
            page.marks.push(Mark::Text {
                x,
                y: self.cursor_y,
                size,
                text: line,
            });
            self.cursor_y += height;
        }
        self
    }

    /// Horizontal extent available to a line spanning `top..bottom`.
    fn band(&self, top: f32, bottom: f32) -> (f32, f32) {
        let left = PAGE_MARGIN;
        let mut right = PAGE_WIDTH - PAGE_MARGIN;
        if let Some((page, rect)) = self.exclusion {
            if page == self.pages.len() - 1 && rect.overlaps_band(top, bottom) && rect.x > left {
                right = right.min(rect.x - IMAGE_GUTTER);
            }
        }
        (left, right)
    }
}

/// Pop as many words as fit in `max_width`. A single word wider than the
/// line is split by characters.
fn take_line<'a>(words: &mut Vec<&'a str>, max_width: f32, size: f32) -> String {
    let mut line = String::new();
    let mut taken = 0;

    while taken < words.len() {
        let word: &'a str = words[taken];
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", line, word)
        };
        if text_width(&candidate, size) > max_width {
            if line.is_empty() {
                // lone overlong word: keep what fits, requeue the rest
                let (head, tail) = split_word(word, max_width, size);
                words[0] = tail;
                return head.to_string();
            }
            break;
        }
        line = candidate;
        taken += 1;
    }

    words.drain(..taken);
    line
}

fn split_word(word: &str, max_width: f32, size: f32) -> (&str, &str) {
    let mut end = 0;
    for (idx, ch) in word.char_indices() {
        let next = idx + ch.len_utf8();
        if text_width(&word[..next], size) > max_width && end > 0 {
            break;
        }
        end = next;
    }
    word.split_at(end)
}
