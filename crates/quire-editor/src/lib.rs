//! # quire-editor — Editor core for quire
//!
//! The model and everything that keeps the screen in step with it:
//!
//! - **[`style`]** — `StyleId`, `Style` and the `StyleRegistry` of built-in
//!   and add-on paragraph styles
//! - **[`paragraph`]** — styled paragraphs made of attributed runs
//! - **[`document`]** — the paragraph list, cursor, selection and the edit
//!   primitives, each returning a reversible `Delta`
//! - **[`history`]** — transaction-grouped undo and redo
//! - **[`event`]** — the synchronous event bus
//! - **[`editor`]** — the facade tying edits, history and events together
//! - **[`layout`]** — word wrap, justification, list labels and pages
//! - **[`view`]** / **[`screen`]** — painting into a quire-term frame and
//!   pushing only what changed
//! - **[`options`]** — `:set`-style configuration

pub mod document;
pub mod editor;
pub mod error;
pub mod event;
pub mod history;
pub mod layout;
pub mod options;
pub mod paragraph;
pub mod position;
pub mod screen;
pub mod style;
pub mod view;
