//! Plain text export: one line per paragraph, attributes and styles
//! dropped.

use quire_editor::document::Document;

pub fn export(doc: &Document) -> String {
    let mut out = String::new();
    for p in doc.paragraphs() {
        for run in p.runs() {
            out.push_str(&run.text);
        }
        out.push('\n');
    }
    out
}
