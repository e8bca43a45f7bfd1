// SPDX-License-Identifier: MIT
//
// quire-term — cell grid and differential redraw for quire.
//
// The layout engine paints a document into a FrameBuffer; the Redrawer
// diffs each new frame against the last one and hands only the changed
// cells to a Terminal. The terminal itself is a collaborator behind a
// three-method trait: AnsiTerminal encodes cells as escape sequences with
// redundant cursor moves and attribute changes skipped, MemoryTerminal
// records the calls.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod diff;
pub mod output;
pub mod terminal;
