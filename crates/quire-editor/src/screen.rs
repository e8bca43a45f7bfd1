//! Screen — the redraw engine.
//!
//! Owns everything between the document and the terminal: the layout, the
//! view's scroll state, the frame being painted and the redrawer holding
//! the previous frame. Feed it editor events with [`Screen::apply`] so the
//! layout tracks the document, then [`Screen::draw`] to paint and push
//! only the changed cells.

use std::io;
use std::ops::Range;

use quire_term::buffer::FrameBuffer;
use quire_term::diff::{RenderStats, Redrawer};
use quire_term::terminal::Terminal;

use crate::document::Document;
use crate::event::Event;
use crate::layout::Layout;
use crate::options::Options;
use crate::style::StyleRegistry;
use crate::view::View;

/// A terminal-sized window onto a document.
#[derive(Debug)]
pub struct Screen {
    view: View,
    layout: Layout,
    frame: FrameBuffer,
    redrawer: Redrawer,
    width: u16,
    height: u16,
    /// Fixed wrap width from `width=`; `0` follows the screen.
    wrap: u16,
}

impl Screen {
    /// A `width` x `height` screen showing `doc`.
    #[must_use]
    pub fn new(doc: &Document, styles: &StyleRegistry, options: &Options, width: u16, height: u16) -> Self {
        let view = View::from_options(options);
        let wrap = options.width;
        let layout = Layout::new(doc, styles, wrap_width(&view, wrap, width), options.page_height);
        Self {
            view,
            layout,
            frame: FrameBuffer::new(width, height),
            redrawer: Redrawer::new(),
            width,
            height,
            wrap,
        }
    }

    /// Change the screen size. The next draw repaints everything.
    pub fn resize(&mut self, doc: &Document, styles: &StyleRegistry, width: u16, height: u16) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        log::debug!("screen resized to {width}x{height}");
        self.width = width;
        self.height = height;
        self.frame.resize(width, height);
        self.layout
            .set_width(doc, styles, wrap_width(&self.view, self.wrap, width));
    }

    /// Bring the layout up to date with an editor event.
    pub fn apply(&mut self, event: &Event, doc: &Document, styles: &StyleRegistry) {
        match event {
            Event::DocumentChanged { paragraphs } => self.update(doc, styles, paragraphs.clone()),
            Event::DocumentOpened { .. } => {
                self.view.set_top_row(0);
                self.layout.relayout(doc, styles);
            }
            Event::CursorMoved { .. } | Event::SelectionChanged { .. } | Event::DocumentSaved { .. } => {}
        }
    }

    fn update(&mut self, doc: &Document, styles: &StyleRegistry, changed: Range<usize>) {
        self.layout.update(doc, styles, changed);
    }

    /// Paint the document and send the difference from the last frame to
    /// `term`.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal fails to flush.
    pub fn draw(
        &mut self,
        doc: &Document,
        styles: &StyleRegistry,
        term: &mut impl Terminal,
    ) -> io::Result<RenderStats> {
        self.frame.clear();
        let cursor = self.view.render(
            doc,
            styles,
            &self.layout,
            &mut self.frame,
            0,
            0,
            self.width,
            self.height,
        );
        let stats = self.redrawer.render(&self.frame, cursor.map(|(x, y)| (y, x)), term)?;
        log::trace!(
            "draw: {} written, {} skipped, full={}",
            stats.cells_written,
            stats.cells_skipped,
            stats.full_redraw
        );
        Ok(stats)
    }

    /// Repaint everything on the next draw.
    pub fn invalidate(&mut self) {
        self.redrawer.force_redraw();
    }

    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    #[must_use]
    pub const fn view(&self) -> &View {
        &self.view
    }

    pub const fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    /// The last painted frame.
    #[must_use]
    pub const fn frame(&self) -> &FrameBuffer {
        &self.frame
    }
}

fn wrap_width(view: &View, wrap: u16, screen_width: u16) -> u16 {
    let text = view.text_width(screen_width);
    if wrap == 0 { text } else { wrap.min(text) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Editor;
    use crate::position::Position;
    use pretty_assertions::assert_eq;
    use quire_term::terminal::{MemoryTerminal, TermOp};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// An editor whose events are queued for a screen to consume.
    fn wired(text: &str) -> (Editor, Rc<RefCell<Vec<Event>>>) {
        let mut ed = Editor::with_document(Document::from_text(text), StyleRegistry::builtin());
        let queue = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&queue);
        ed.events().subscribe(move |e, _| sink.borrow_mut().push(e.clone()));
        (ed, queue)
    }

    fn pump(screen: &mut Screen, ed: &Editor, queue: &Rc<RefCell<Vec<Event>>>) {
        for event in queue.borrow_mut().drain(..) {
            screen.apply(&event, ed.document(), ed.styles());
        }
    }

    #[test]
    fn first_draw_paints_text_and_status() {
        let (ed, _) = wired("hello world");
        let mut screen = Screen::new(ed.document(), ed.styles(), &Options::default(), 20, 3);
        let mut term = MemoryTerminal::new();

        let stats = screen.draw(ed.document(), ed.styles(), &mut term).unwrap();
        assert!(stats.full_redraw);
        assert_eq!(screen.frame().row_text(0), "hello world");
        assert!(screen.frame().row_text(2).starts_with(" P"));
        assert!(term.ops().contains(&TermOp::Cursor { row: 0, col: 0 }));
    }

    #[test]
    fn unchanged_redraw_writes_nothing() {
        let (ed, _) = wired("hello");
        let mut screen = Screen::new(ed.document(), ed.styles(), &Options::default(), 20, 3);
        let mut term = MemoryTerminal::new();
        screen.draw(ed.document(), ed.styles(), &mut term).unwrap();
        term.take();

        let stats = screen.draw(ed.document(), ed.styles(), &mut term).unwrap();
        assert_eq!(stats.cells_written, 0);
        assert_eq!(term.cells_written(), 0);
    }

    #[test]
    fn typing_redraws_only_changed_cells() {
        let (mut ed, queue) = wired("hello");
        let mut screen = Screen::new(ed.document(), ed.styles(), &Options::default(), 20, 4);
        let mut term = MemoryTerminal::new();
        screen.draw(ed.document(), ed.styles(), &mut term).unwrap();
        term.take();

        ed.type_text("x");
        pump(&mut screen, &ed, &queue);
        let stats = screen.draw(ed.document(), ed.styles(), &mut term).unwrap();

        assert_eq!(screen.frame().row_text(0), "xhello");
        assert!(!stats.full_redraw);
        assert!(stats.cells_written > 0);
        assert!(stats.cells_written < 20);
        assert!(term.ops().contains(&TermOp::Cursor { row: 0, col: 1 }));
    }

    #[test]
    fn layout_follows_paragraph_splits() {
        let (mut ed, queue) = wired("one two");
        let mut screen = Screen::new(ed.document(), ed.styles(), &Options::default(), 20, 4);
        ed.split_paragraph(Position::new(0, 4)).unwrap();
        pump(&mut screen, &ed, &queue);

        let mut term = MemoryTerminal::new();
        screen.draw(ed.document(), ed.styles(), &mut term).unwrap();
        assert_eq!(screen.layout().line_count(), 2);
        assert_eq!(screen.frame().row_text(0), "one");
        assert_eq!(screen.frame().row_text(1), "two");

        ed.undo();
        pump(&mut screen, &ed, &queue);
        screen.draw(ed.document(), ed.styles(), &mut term).unwrap();
        assert_eq!(screen.frame().row_text(0), "one two");
        assert_eq!(screen.frame().row_text(1), "");
    }

    #[test]
    fn fixed_wrap_width_is_capped_by_screen() {
        let doc = Document::from_text("x");
        let styles = StyleRegistry::builtin();
        let mut options = Options::default();
        options.width = 12;
        let mut screen = Screen::new(&doc, &styles, &options, 40, 5);
        assert_eq!(screen.layout().width(), 12);

        screen.resize(&doc, &styles, 8, 5);
        assert_eq!(screen.layout().width(), 8);
        assert_eq!(screen.frame().width(), 8);
    }

    #[test]
    fn resize_forces_full_redraw() {
        let doc = Document::from_text("abc");
        let styles = StyleRegistry::builtin();
        let mut screen = Screen::new(&doc, &styles, &Options::default(), 10, 2);
        let mut term = MemoryTerminal::new();
        screen.draw(&doc, &styles, &mut term).unwrap();

        screen.resize(&doc, &styles, 12, 2);
        let stats = screen.draw(&doc, &styles, &mut term).unwrap();
        assert!(stats.full_redraw);
    }
}
