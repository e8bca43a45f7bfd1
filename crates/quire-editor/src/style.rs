//! The paragraph style registry.
//!
//! A style is pure data: a short name the user sees in the margin ("P",
//! "H1", "LB"), a kind the converters map to their own block constructs,
//! and the rendering hints the layout engine needs (margins, justification,
//! list numbering, display emphasis).
//!
//! Paragraphs refer to styles by [`StyleId`], an index into the registry.
//! The built-in styles occupy fixed indices so the rest of the crate can
//! name them as constants. Add-on styles are appended and are never
//! removed, so a `StyleId` stays valid for the life of the registry.

use std::fmt;

use crate::paragraph::RunAttrs;

// ---------------------------------------------------------------------------
// StyleId
// ---------------------------------------------------------------------------

/// Index of a style in a [`StyleRegistry`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleId(u16);

impl StyleId {
    pub const P: Self = Self(0);
    pub const H1: Self = Self(1);
    pub const H2: Self = Self(2);
    pub const H3: Self = Self(3);
    pub const H4: Self = Self(4);
    pub const H5: Self = Self(5);
    pub const H6: Self = Self(6);
    pub const Q: Self = Self(7);
    pub const V: Self = Self(8);
    pub const PRE: Self = Self(9);
    pub const L: Self = Self(10);
    pub const LB: Self = Self(11);
    pub const LN: Self = Self(12);
    pub const CENTER: Self = Self(13);
    pub const RIGHT: Self = Self(14);

    /// The heading style for `level` (clamped to 1..=6).
    #[must_use]
    pub fn heading(level: u8) -> Self {
        Self(u16::from(level.clamp(1, 6)))
    }

    /// The raw index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for StyleId {
    fn default() -> Self {
        Self::P
    }
}

impl fmt::Debug for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StyleId({})", self.0)
    }
}

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Style data
// ---------------------------------------------------------------------------

/// What kind of block a style represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    Body,
    /// A heading; the level is 1..=6.
    Heading(u8),
    Quote,
    /// Verse: line breaks are significant.
    Verse,
    /// Preformatted: whitespace is significant, no inline markup.
    Preformatted,
    ListItem,
}

/// How a paragraph's lines sit between its margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justification {
    #[default]
    Left,
    Center,
    Right,
    /// Stretch inter-word gaps so every line but the last fills the width.
    Full,
}

/// List numbering for list-item styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Numbering {
    #[default]
    None,
    Bullet,
    /// Consecutive paragraphs of the style count 1, 2, 3, ...
    Number,
}

/// A named paragraph style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    /// Short name shown in the style margin and used on the command line.
    pub name: String,
    /// Human description.
    pub description: String,
    pub kind: StyleKind,
    pub left_margin: u16,
    pub right_margin: u16,
    pub justification: Justification,
    pub numbering: Numbering,
    /// Attributes added to every cell at render time (headings are bold).
    pub emphasis: RunAttrs,
}

impl Style {
    /// A left-justified body-kind style with no margins.
    #[must_use]
    pub fn new(name: &str, description: &str, kind: StyleKind) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind,
            left_margin: 0,
            right_margin: 0,
            justification: Justification::Left,
            numbering: Numbering::None,
            emphasis: RunAttrs::empty(),
        }
    }

    #[must_use]
    pub fn margins(mut self, left: u16, right: u16) -> Self {
        self.left_margin = left;
        self.right_margin = right;
        self
    }

    #[must_use]
    pub fn justified(mut self, justification: Justification) -> Self {
        self.justification = justification;
        self
    }

    #[must_use]
    pub fn numbered(mut self, numbering: Numbering) -> Self {
        self.numbering = numbering;
        self
    }

    #[must_use]
    pub fn emphasized(mut self, emphasis: RunAttrs) -> Self {
        self.emphasis = emphasis;
        self
    }

    /// The heading level, if this is a heading style.
    #[must_use]
    pub const fn heading_level(&self) -> Option<u8> {
        match self.kind {
            StyleKind::Heading(level) => Some(level),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// StyleRegistry
// ---------------------------------------------------------------------------

/// The set of paragraph styles a document may use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRegistry {
    styles: Vec<Style>,
}

impl StyleRegistry {
    /// The registry with exactly the built-in styles.
    #[must_use]
    pub fn builtin() -> Self {
        let heading = |level: u8| {
            let emphasis = if level == 1 {
                RunAttrs::BOLD | RunAttrs::UNDERLINE
            } else {
                RunAttrs::BOLD
            };
            Style::new(
                &format!("H{level}"),
                &format!("heading level {level}"),
                StyleKind::Heading(level),
            )
            .emphasized(emphasis)
        };

        let styles = vec![
            Style::new("P", "body text", StyleKind::Body),
            heading(1),
            heading(2),
            heading(3),
            heading(4),
            heading(5),
            heading(6),
            Style::new("Q", "indented quote", StyleKind::Quote).margins(4, 4),
            Style::new("V", "verse", StyleKind::Verse).margins(4, 0),
            Style::new("PRE", "preformatted text", StyleKind::Preformatted),
            Style::new("L", "list item without marker", StyleKind::ListItem).margins(2, 0),
            Style::new("LB", "bulleted list item", StyleKind::ListItem)
                .margins(2, 0)
                .numbered(Numbering::Bullet),
            Style::new("LN", "numbered list item", StyleKind::ListItem)
                .margins(4, 0)
                .numbered(Numbering::Number),
            Style::new("CENTER", "centered text", StyleKind::Body).justified(Justification::Center),
            Style::new("RIGHT", "right-aligned text", StyleKind::Body).justified(Justification::Right),
        ];
        debug_assert_eq!(styles.len(), Self::BUILTIN_COUNT);
        Self { styles }
    }

    /// How many built-in styles there are; add-ons start at this index.
    pub const BUILTIN_COUNT: usize = 15;

    /// Register an add-on style and return its id.
    ///
    /// Names are unique (case-insensitively). Registering a name that
    /// already exists leaves the registry untouched and returns the
    /// existing id.
    pub fn register(&mut self, style: Style) -> StyleId {
        if let Some(existing) = self.find(&style.name) {
            log::debug!("style {:?} already registered as {existing}", style.name);
            return existing;
        }
        let Ok(index) = u16::try_from(self.styles.len()) else {
            log::warn!("style registry full, {:?} maps to body text", style.name);
            return StyleId::P;
        };
        self.styles.push(style);
        StyleId(index)
    }

    /// Look up a style by id.
    #[must_use]
    pub fn get(&self, id: StyleId) -> Option<&Style> {
        self.styles.get(id.index())
    }

    /// Look up a style by id, falling back to body text for unknown ids.
    #[must_use]
    pub fn style(&self, id: StyleId) -> &Style {
        self.get(id).unwrap_or(&self.styles[0])
    }

    /// Find a style by its short name, ignoring case.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<StyleId> {
        self.styles
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
            .and_then(|i| u16::try_from(i).ok())
            .map(StyleId)
    }

    /// Whether `id` names a registered style.
    #[must_use]
    pub fn contains(&self, id: StyleId) -> bool {
        id.index() < self.styles.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Never true: the built-ins cannot be removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Iterate `(id, style)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (StyleId, &Style)> {
        self.styles
            .iter()
            .enumerate()
            .filter_map(|(i, s)| u16::try_from(i).ok().map(|i| (StyleId(i), s)))
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
