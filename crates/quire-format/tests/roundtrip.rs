//! Import/export laws across every format: what an exporter writes reads
//! back as the same document for the styling the format can carry, and a
//! second trip through any format changes nothing.

use pretty_assertions::assert_eq;
use quire_editor::document::Document;
use quire_editor::paragraph::{Paragraph, RunAttrs};
use quire_editor::style::{StyleId, StyleRegistry};
use quire_format::Format;

const B: RunAttrs = RunAttrs::BOLD;
const I: RunAttrs = RunAttrs::ITALIC;
const U: RunAttrs = RunAttrs::UNDERLINE;
const NONE: RunAttrs = RunAttrs::empty();

fn styled(style: StyleId, spans: &[(&str, RunAttrs)]) -> Paragraph {
    let mut p = Paragraph::new(style);
    for (text, attrs) in spans {
        p.push(text, *attrs);
    }
    p
}

fn plain(style: StyleId, text: &str) -> Paragraph {
    Paragraph::with_text(style, text)
}

fn trip(format: Format, doc: &Document) -> Document {
    let styles = StyleRegistry::builtin();
    let bytes = format.export(doc, &styles);
    format
        .import(&bytes)
        .unwrap_or_else(|e| panic!("{format}: {e}\n{}", String::from_utf8_lossy(&bytes)))
}

/// Round trip, then check the second export matches the first.
fn assert_lossless(format: Format, paragraphs: Vec<Paragraph>) {
    let styles = StyleRegistry::builtin();
    let doc = Document::from_paragraphs(paragraphs);
    let back = trip(format, &doc);
    assert_eq!(back.paragraphs(), doc.paragraphs(), "{format} round trip");
    assert_eq!(
        String::from_utf8(format.export(&back, &styles)).unwrap(),
        String::from_utf8(format.export(&doc, &styles)).unwrap(),
        "{format} second export"
    );
}

/// A document using every style, attribute and awkward character.
fn everything() -> Document {
    Document::from_paragraphs(vec![
        plain(StyleId::H1, "Title"),
        styled(StyleId::P, &[("Some ", NONE), ("bold", B), (" text.", NONE)]),
        styled(StyleId::P, &[("mixed ", NONE), ("bi", B | I), (" and ", NONE), ("under", U), (" ", U)]),
        plain(StyleId::P, "a  b\tc"),
        plain(StyleId::P, ""),
        plain(StyleId::P, " lead and trail "),
        plain(StyleId::P, "50% & $1 #2 a_b {} \\ ^ ~ <tag> *x* _y_ `z` /w/"),
        plain(StyleId::P, "- dash, 1. one, > gt, # hash, .dot, 'tick, +plus"),
        plain(StyleId::LB, "bullet"),
        plain(StyleId::LN, "number"),
        plain(StyleId::L, "unmarked"),
        plain(StyleId::Q, "quote"),
        plain(StyleId::V, "verse"),
        plain(StyleId::PRE, "  pre  formatted"),
        plain(StyleId::PRE, ""),
        plain(StyleId::CENTER, "middle"),
        plain(StyleId::RIGHT, "right"),
        plain(StyleId::H5, "five"),
        plain(StyleId::H6, "six"),
    ])
}

#[test]
fn second_trip_is_stable_for_every_format() {
    let styles = StyleRegistry::builtin();
    for format in Format::ALL {
        let once = trip(format, &everything());
        let first = format.export(&once, &styles);
        let twice = format.import(&first).unwrap();
        let second = format.export(&twice, &styles);
        assert_eq!(
            String::from_utf8(second).unwrap(),
            String::from_utf8(first).unwrap(),
            "{format}"
        );
    }
}

#[test]
fn text_keeps_lines_exactly() {
    assert_lossless(
        Format::Text,
        vec![
            plain(StyleId::P, "first"),
            plain(StyleId::P, ""),
            plain(StyleId::P, "  spaced  out "),
        ],
    );
}

#[test]
fn html_keeps_styles_and_attributes() {
    assert_lossless(
        Format::Html,
        vec![
            plain(StyleId::H1, "Title"),
            styled(StyleId::P, &[("Some ", NONE), ("bold", B), (" text.", NONE)]),
            styled(StyleId::P, &[("mixed ", NONE), ("bi", B | I), (" and ", NONE), ("under", U)]),
            plain(StyleId::P, ""),
            plain(StyleId::P, "<tag> & \"quoted\""),
            plain(StyleId::LB, "a"),
            plain(StyleId::LB, "b"),
            plain(StyleId::LN, "one"),
            plain(StyleId::Q, "q1"),
            plain(StyleId::Q, "q2"),
            plain(StyleId::V, "verse"),
            plain(StyleId::PRE, "  code  <x> & y"),
            plain(StyleId::PRE, ""),
            plain(StyleId::CENTER, "middle"),
            plain(StyleId::RIGHT, "right"),
            plain(StyleId::L, "item"),
            plain(StyleId::H6, "deep"),
        ],
    );
}

#[test]
fn opendocument_keeps_whitespace_too() {
    let mut paragraphs = everything().paragraphs().to_vec();
    paragraphs.push(styled(StyleId::PRE, &[("  x", B), ("  ", NONE)]));
    assert_lossless(Format::OpenDocument, paragraphs);
}

#[test]
fn latex_keeps_environments_and_specials() {
    assert_lossless(
        Format::Latex,
        vec![
            plain(StyleId::H1, "Title"),
            plain(StyleId::H4, "Small"),
            styled(StyleId::P, &[("Some ", NONE), ("bold", B), (" text.", NONE)]),
            styled(StyleId::P, &[("mixed ", NONE), ("bi", B | I), (" and ", NONE), ("under", U)]),
            plain(StyleId::P, "50% & $1 #2 a_b {} \\ ^ ~ <tag>"),
            plain(StyleId::LB, "a"),
            plain(StyleId::LB, "b"),
            plain(StyleId::LN, "one"),
            plain(StyleId::L, "item"),
            plain(StyleId::Q, "q1"),
            plain(StyleId::Q, "q2"),
            plain(StyleId::V, "line one"),
            plain(StyleId::V, "line two"),
            plain(StyleId::PRE, "  raw % {x}"),
            plain(StyleId::PRE, ""),
            plain(StyleId::CENTER, "middle"),
            plain(StyleId::RIGHT, "right"),
        ],
    );
}

#[test]
fn troff_keeps_fonts_and_requests() {
    assert_lossless(
        Format::Troff,
        vec![
            plain(StyleId::H1, "Title"),
            plain(StyleId::H6, "Deep"),
            styled(StyleId::P, &[("Some ", NONE), ("bold", B), (" text.", NONE)]),
            styled(StyleId::P, &[("mixed ", NONE), ("bi", B | I), (" and ", NONE), ("it", I)]),
            plain(StyleId::P, ".dot and 'tick at the start, back\\slash"),
            plain(StyleId::P, "two  spaces"),
            plain(StyleId::LB, "a"),
            plain(StyleId::LN, "one"),
            plain(StyleId::LN, "two"),
            plain(StyleId::L, "item"),
            plain(StyleId::Q, "quote"),
            plain(StyleId::PRE, "  raw"),
            plain(StyleId::PRE, ""),
            plain(StyleId::CENTER, "middle"),
        ],
    );
}

#[test]
fn org_keeps_markers_and_blocks() {
    assert_lossless(
        Format::Org,
        vec![
            plain(StyleId::H1, "Title"),
            plain(StyleId::H3, "Third"),
            styled(StyleId::P, &[("Some ", NONE), ("bold", B), (" text.", NONE)]),
            styled(StyleId::P, &[("mixed ", NONE), ("bi", B | I), (" and ", NONE), ("under", U)]),
            plain(StyleId::P, "+1 *x* and/or 2*3 snake_case"),
            plain(StyleId::LB, "a"),
            plain(StyleId::LB, "b"),
            plain(StyleId::LN, "one"),
            plain(StyleId::Q, "q1"),
            plain(StyleId::Q, "q2"),
            plain(StyleId::V, "roses"),
            plain(StyleId::V, "violets"),
            plain(StyleId::PRE, "* not a heading"),
            plain(StyleId::PRE, ""),
            plain(StyleId::CENTER, "middle"),
        ],
    );
}

#[test]
fn markdown_keeps_emphasis_and_escapes() {
    assert_lossless(
        Format::Markdown,
        vec![
            plain(StyleId::H1, "Title"),
            plain(StyleId::H6, "Deep"),
            styled(StyleId::P, &[("Some ", NONE), ("bold", B), (" text.", NONE)]),
            styled(StyleId::P, &[("mixed ", NONE), ("bi", B | I), (" and ", NONE), ("it", I)]),
            plain(StyleId::P, "2*3 a_b `c` \\ #h"),
            plain(StyleId::P, "- not a list"),
            plain(StyleId::P, "1. not a list"),
            plain(StyleId::P, "> not a quote"),
            plain(StyleId::LB, "a"),
            plain(StyleId::LB, "b"),
            plain(StyleId::LN, "one"),
            plain(StyleId::Q, "q1"),
            plain(StyleId::Q, "q2"),
            plain(StyleId::PRE, "  code ``` x"),
            plain(StyleId::PRE, ""),
        ],
    );
}

#[test]
fn markdown_to_html() {
    let doc = Format::Markdown.import(b"# Title\n\nSome **bold** text.").unwrap();
    let runs: Vec<(StyleId, String, RunAttrs)> = doc
        .paragraphs()
        .iter()
        .flat_map(|p| p.runs().iter().map(move |r| (p.style, r.text.clone(), r.attrs)))
        .collect();
    assert_eq!(
        runs,
        [
            (StyleId::H1, "Title".into(), NONE),
            (StyleId::P, "Some ".into(), NONE),
            (StyleId::P, "bold".into(), B),
            (StyleId::P, " text.".into(), NONE),
        ]
    );

    let html = String::from_utf8(Format::Html.export(&doc, &StyleRegistry::builtin())).unwrap();
    assert!(html.contains("<h1>Title</h1>"), "{html}");
    assert!(html.contains("<p>Some <b>bold</b> text.</p>"), "{html}");
}

#[test]
fn lossy_formats_degrade_quietly() {
    let doc = Document::from_paragraphs(vec![
        styled(StyleId::V, &[("under", U)]),
        plain(StyleId::RIGHT, "right"),
    ]);
    let back = trip(Format::Markdown, &doc);
    assert_eq!(back.paragraphs(), [plain(StyleId::P, "under"), plain(StyleId::P, "right")]);

    let back = trip(Format::Text, &everything());
    assert!(back.paragraphs().iter().all(|p| p.style == StyleId::P));
    assert!(back.paragraphs().iter().flat_map(Paragraph::runs).all(|r| r.attrs.is_empty()));
}

#[test]
fn markdown_text_never_opens_a_fence() {
    assert_lossless(
        Format::Markdown,
        vec![
            plain(StyleId::P, "~~~"),
            plain(StyleId::H1, "Chapter"),
            plain(StyleId::P, "body"),
            plain(StyleId::P, "~~~ x ~~~"),
        ],
    );
}

#[test]
fn org_text_never_reads_as_keywords_or_entities() {
    assert_lossless(
        Format::Org,
        vec![
            plain(StyleId::P, "#+TITLE: x"),
            plain(StyleId::P, "# comment"),
            plain(StyleId::P, "#+BEGIN_EXAMPLE"),
            plain(StyleId::H1, "Chapter"),
            plain(StyleId::P, "#+END_EXAMPLE"),
            plain(StyleId::P, "\\ast{} and \\plus{}"),
            plain(StyleId::PRE, "  #+END_EXAMPLE"),
            plain(StyleId::PRE, ",* quoted"),
        ],
    );
}

#[test]
fn emphasis_hugging_letters_degrades_to_text() {
    let doc = Document::from_paragraphs(vec![styled(StyleId::P, &[("a", NONE), ("(x)", B), ("b", NONE)])]);
    assert_eq!(trip(Format::Markdown, &doc).paragraphs(), [plain(StyleId::P, "a**(x)**b")]);

    let doc = Document::from_paragraphs(vec![styled(StyleId::P, &[("a", NONE), ("x", B), ("b", NONE)])]);
    assert_eq!(trip(Format::Org, &doc).paragraphs(), [plain(StyleId::P, "a*x*b")]);
}

#[test]
fn xml_formats_drop_chars_xml_forbids() {
    let doc = Document::from_paragraphs(vec![plain(StyleId::P, "a\u{1}b\u{1b}c")]);
    for format in [Format::Html, Format::OpenDocument] {
        assert_eq!(trip(format, &doc).paragraphs(), [plain(StyleId::P, "abc")], "{format}");
    }
}
