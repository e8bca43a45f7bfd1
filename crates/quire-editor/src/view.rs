//! View — the bridge from layout to framebuffer.
//!
//! A `View` paints a window of a [`Layout`] onto a rectangular area of a
//! quire-term [`FrameBuffer`]. It handles:
//!
//! - **Scrolling** — keeps the cursor row on screen with `scrolloff` rows
//!   of context where the document allows
//! - **Style margin** — an optional gutter naming each paragraph's style
//! - **Attributes** — run attributes plus the style's display emphasis
//! - **Selection** — selected glyphs are drawn inverse
//! - **Status line** — style, position, and page at the bottom
//!
//! The View holds only scroll state and display configuration. The
//! document, styles and layout are passed to [`render`](View::render).
//!
//! ```text
//! Document ─▶ Layout ─▶ View ─▶ FrameBuffer ─▶ Redrawer ─▶ Terminal
//! ```

use quire_term::buffer::FrameBuffer;
use quire_term::cell::{Attr, Cell};

use crate::document::Document;
use crate::layout::Layout;
use crate::options::Options;
use crate::paragraph::RunAttrs;
use crate::position::Position;
use crate::style::StyleRegistry;

/// Terminal attributes for a set of run attributes.
#[must_use]
pub fn cell_attrs(attrs: RunAttrs) -> Attr {
    let mut out = Attr::empty();
    if attrs.contains(RunAttrs::BOLD) {
        out |= Attr::BOLD;
    }
    if attrs.contains(RunAttrs::ITALIC) {
        out |= Attr::ITALIC;
    }
    if attrs.contains(RunAttrs::UNDERLINE) {
        out |= Attr::UNDERLINE;
    }
    out
}

/// A view of a laid-out document onto a framebuffer region.
///
/// ```text
/// ┌──────┬────────────────────────┐
/// │margin│      text area         │ ← text_height rows
/// │      │                        │
/// ├──────┴────────────────────────┤
/// │         status line           │ ← 1 row, optional
/// └───────────────────────────────┘
/// ```
#[derive(Debug, Clone)]
pub struct View {
    /// First visible layout row.
    top_row: usize,
    scroll_off: usize,
    style_margin: bool,
    margin_width: u16,
    status_line: bool,
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl View {
    /// A view at the top with default display settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            top_row: 0,
            scroll_off: 2,
            style_margin: false,
            margin_width: 8,
            status_line: true,
        }
    }

    /// A view configured from editor options.
    #[must_use]
    pub const fn from_options(options: &Options) -> Self {
        Self {
            top_row: 0,
            scroll_off: options.scroll_off,
            style_margin: options.style_margin,
            margin_width: options.margin_width,
            status_line: true,
        }
    }

    #[must_use]
    pub const fn top_row(&self) -> usize {
        self.top_row
    }

    pub const fn set_top_row(&mut self, row: usize) {
        self.top_row = row;
    }

    pub const fn set_status_line(&mut self, show: bool) {
        self.status_line = show;
    }

    pub const fn set_style_margin(&mut self, show: bool) {
        self.style_margin = show;
    }

    /// Columns taken by the style margin.
    #[must_use]
    pub const fn gutter_width(&self) -> u16 {
        if self.style_margin { self.margin_width } else { 0 }
    }

    /// Columns left for text in an area `area_width` wide. This is the
    /// width to lay the document out at.
    #[must_use]
    pub const fn text_width(&self, area_width: u16) -> u16 {
        let w = area_width.saturating_sub(self.gutter_width());
        if w == 0 { 1 } else { w }
    }

    /// Rows left for text in an area `area_height` tall.
    #[must_use]
    pub const fn text_height(&self, area_height: u16) -> u16 {
        if self.status_line && area_height > 1 {
            area_height - 1
        } else {
            area_height
        }
    }

    // -- Scrolling ----------------------------------------------------------

    /// Adjust the scroll position so `row` is visible with `scrolloff` rows
    /// of context, without scrolling past the last layout row.
    pub fn ensure_row_visible(&mut self, row: usize, height: usize, total_rows: usize) {
        if height == 0 {
            return;
        }
        let margin = self.scroll_off.min(height.saturating_sub(1) / 2);

        if row < self.top_row + margin {
            self.top_row = row.saturating_sub(margin);
        }
        if row + margin >= self.top_row + height {
            self.top_row = (row + margin + 1).saturating_sub(height);
        }
        let max_top = total_rows.saturating_sub(height);
        if self.top_row > max_top && row >= max_top {
            self.top_row = max_top;
        }
    }

    // -- Rendering ----------------------------------------------------------

    /// Render the visible part of `layout` into `frame`.
    ///
    /// Returns the screen position of the cursor as `Some((x, y))` if it is
    /// visible, or `None` if the area is empty.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        doc: &Document,
        styles: &StyleRegistry,
        layout: &Layout,
        frame: &mut FrameBuffer,
        area_x: u16,
        area_y: u16,
        area_width: u16,
        area_height: u16,
    ) -> Option<(u16, u16)> {
        if area_width == 0 || area_height == 0 {
            return None;
        }

        let gutter = self.gutter_width().min(area_width);
        let text_x = area_x + gutter;
        let text_width = area_width - gutter;
        let text_height = self.text_height(area_height);

        let (cursor_row, cursor_col) = layout.position_to_screen(doc, styles, doc.cursor());
        self.ensure_row_visible(cursor_row, usize::from(text_height), layout.line_count());

        let selection = doc.selection();
        let mut cursor_screen = None;

        for r in 0..text_height {
            let y = area_y + r;
            fill_empty(frame, area_x, y, area_width);

            let row = self.top_row + usize::from(r);
            let Some(line) = layout.lines().get(row) else {
                continue;
            };
            let Some(para) = doc.paragraph(line.paragraph) else {
                continue;
            };
            let style = styles.style(para.style);

            if gutter > 0 && line.first {
                let name: String = style.name.chars().take(usize::from(gutter - 1)).collect();
                frame.paint_text(area_x, y, &name, Attr::DIM);
            }

            let placed = layout.place(doc, styles, row);
            if let Some((col, label)) = &placed.label {
                if *col < text_width {
                    frame.paint_text(text_x + col, y, label, Attr::empty());
                }
            }

            for glyph in &placed.glyphs {
                if glyph.col + glyph.width > text_width {
                    break;
                }
                let mut attrs = cell_attrs(glyph.attrs | style.emphasis);
                let pos = Position::new(line.paragraph, glyph.offset);
                if selection.is_some_and(|s| s.contains(pos)) {
                    attrs |= Attr::INVERSE;
                }
                frame.paint_char(text_x + glyph.col, y, glyph.ch, attrs);
            }

            if row == cursor_row {
                cursor_screen = Some((text_x + cursor_col.min(text_width.saturating_sub(1)), y));
            }
        }

        if self.status_line && area_height > 1 {
            let y = area_y + text_height;
            render_status_line(frame, doc, styles, layout, cursor_row, area_x, y, area_width);
        }

        cursor_screen
    }
}

/// Render the status line: style on the left, position and page on the
/// right, all inverse.
#[allow(clippy::too_many_arguments)]
fn render_status_line(
    frame: &mut FrameBuffer,
    doc: &Document,
    styles: &StyleRegistry,
    layout: &Layout,
    cursor_row: usize,
    x: u16,
    y: u16,
    width: u16,
) {
    let cursor = doc.cursor();
    let style = doc
        .paragraph(cursor.paragraph)
        .map_or("P", |p| styles.style(p.style).name.as_str());
    let left = format!(" {style}");
    let right = format!(
        " {cursor}  page {}/{} ",
        layout.page_of_line(cursor_row) + 1,
        layout.page_count()
    );

    for col in 0..width {
        frame.set(x + col, y, Cell::styled(' ', Attr::INVERSE));
    }
    let right_len = u16::try_from(right.chars().count()).unwrap_or(width);
    let right_start = width.saturating_sub(right_len);
    let left: String = left.chars().take(usize::from(right_start)).collect();
    frame.paint_text(x, y, &left, Attr::INVERSE);
    frame.paint_text(x + right_start, y, &right, Attr::INVERSE);
}

/// Fill a span with empty cells.
fn fill_empty(frame: &mut FrameBuffer, x: u16, y: u16, width: u16) {
    for col in 0..width {
        frame.set(x + col, y, Cell::EMPTY);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
