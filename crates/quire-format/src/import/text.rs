//! Plain text: one body paragraph per line.

use quire_editor::document::Document;

pub fn import(bytes: &[u8]) -> Document {
    let text = super::decode(bytes);
    let body = text.strip_suffix('\n').unwrap_or(&text);
    Document::from_text(body)
}
