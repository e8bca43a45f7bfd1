//! Editor options — the `:set` system.
//!
//! [`Options`] holds the values; [`parse_set`] turns a `:set`-style argument
//! string into [`SetDirective`]s and [`Options::apply`] interprets them. The
//! command line's `--set` flag and the `QUIRE_OPTIONS` environment variable
//! go through the same path.
//!
//! # Supported syntax
//!
//! | Syntax          | Effect                        |
//! |-----------------|-------------------------------|
//! | `option`        | Enable boolean / show numeric |
//! | `nooption`      | Disable boolean               |
//! | `option!`       | Toggle boolean                |
//! | `option?`       | Query current value           |
//! | `option=N`      | Assign numeric value          |
//! | (empty)         | Show changed options          |
//! | `all`           | Show all options              |
//!
//! # Option names
//!
//! | Full name     | Abbrev | Type    | Default | Meaning                          |
//! |---------------|--------|---------|---------|----------------------------------|
//! | `width`       | `w`    | integer | 0       | wrap width; 0 follows the screen |
//! | `pageheight`  | `ph`   | integer | 60      | lines per page; 0 disables pages |
//! | `scrolloff`   | `so`   | integer | 2       | context lines around the cursor  |
//! | `stylemargin` | `sm`   | bool    | false   | show the style-name gutter       |
//! | `marginwidth` | `mw`   | integer | 8       | gutter width in columns          |
//! | `undolevels`  | `ul`   | integer | 1000    | undo depth                       |

use thiserror::Error;

/// A parsed `:set` directive.
///
/// Produced by [`parse_set`]. [`Options::apply`] interprets these to read
/// or modify option values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `option` — enable a boolean option.
    On(String),

    /// `nooption` — disable a boolean option.
    Off(String),

    /// `option!` — toggle a boolean option.
    Toggle(String),

    /// `option?` — query the current value.
    Query(String),

    /// `option=value` — assign a value.
    Assign(String, String),

    /// No arguments — show changed options.
    ShowChanged,

    /// `all` — show all options.
    ShowAll,
}

/// Why a directive could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("unknown option: {0}")]
    Unknown(String),
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: String, value: String },
    #[error("{0} is not a boolean option")]
    NotBoolean(String),
    #[error("{0} is a boolean option and takes no value")]
    NotNumeric(String),
}

/// Returns `true` if `name` is a known boolean option (full name or abbreviation).
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    matches!(name, "stylemargin" | "sm")
}

/// Returns `true` if `name` is a known numeric option (full name or abbreviation).
#[must_use]
pub fn is_numeric_option(name: &str) -> bool {
    matches!(
        name,
        "width" | "w" | "pageheight" | "ph" | "scrolloff" | "so" | "marginwidth" | "mw"
            | "undolevels" | "ul"
    )
}

/// Returns `true` if `name` is any known option (boolean or numeric).
#[must_use]
pub fn is_known_option(name: &str) -> bool {
    is_bool_option(name) || is_numeric_option(name)
}

/// Parse the full `:set` arguments string into directives.
///
/// Multiple space-separated arguments are supported
/// (`width=72 nostylemargin`). An empty string produces
/// [`SetDirective::ShowChanged`].
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return vec![SetDirective::ShowChanged];
    }
    trimmed.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single `:set` argument into a directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if arg == "all" {
        return SetDirective::ShowAll;
    }

    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }

    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }

    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }

    // Only a known boolean after "no" counts as negation.
    if let Some(name) = arg.strip_prefix("no") {
        if is_bool_option(name) {
            return SetDirective::Off(name.to_string());
        }
    }

    // Bare numeric option name = query its value.
    if is_numeric_option(arg) {
        return SetDirective::Query(arg.to_string());
    }

    SetDirective::On(arg.to_string())
}

/// Format a boolean option for display.
///
/// Returns `"name"` when true, `"noname"` when false.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_string()
    } else {
        format!("no{name}")
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Option values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Wrap width; `0` means the viewport width.
    pub width: u16,
    /// Layout lines per page; `0` means one endless page.
    pub page_height: usize,
    pub scroll_off: usize,
    pub style_margin: bool,
    pub margin_width: u16,
    pub undo_levels: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: 0,
            page_height: 60,
            scroll_off: 2,
            style_margin: false,
            margin_width: 8,
            undo_levels: crate::history::DEFAULT_DEPTH,
        }
    }
}

/// Canonical names, in display order.
const NAMES: [&str; 6] = [
    "width",
    "pageheight",
    "scrolloff",
    "stylemargin",
    "marginwidth",
    "undolevels",
];

fn canonical(name: &str) -> Option<&'static str> {
    Some(match name {
        "width" | "w" => "width",
        "pageheight" | "ph" => "pageheight",
        "scrolloff" | "so" => "scrolloff",
        "stylemargin" | "sm" => "stylemargin",
        "marginwidth" | "mw" => "marginwidth",
        "undolevels" | "ul" => "undolevels",
        _ => return None,
    })
}

impl Options {
    /// Defaults with `args` applied.
    ///
    /// # Errors
    ///
    /// The first directive that fails to apply.
    pub fn parse(args: &str) -> Result<Self, OptionError> {
        let mut options = Self::default();
        options.apply_all(args)?;
        Ok(options)
    }

    /// Apply every directive in `args`, collecting query output.
    ///
    /// # Errors
    ///
    /// The first directive that fails to apply; earlier ones stay applied.
    pub fn apply_all(&mut self, args: &str) -> Result<Vec<String>, OptionError> {
        let mut shown = Vec::new();
        for directive in parse_set(args) {
            if let Some(text) = self.apply(&directive)? {
                shown.push(text);
            }
        }
        Ok(shown)
    }

    /// Apply one directive. Queries and listings return their text.
    ///
    /// # Errors
    ///
    /// Unknown names, boolean operations on numeric options and the
    /// reverse, and values that do not parse.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<Option<String>, OptionError> {
        match directive {
            SetDirective::ShowChanged => {
                let defaults = Self::default();
                let changed: Vec<String> = NAMES
                    .iter()
                    .filter(|n| self.show(n) != defaults.show(n))
                    .map(|n| self.show(n))
                    .collect();
                Ok(Some(changed.join(" ")))
            }
            SetDirective::ShowAll => {
                let all: Vec<String> = NAMES.iter().map(|n| self.show(n)).collect();
                Ok(Some(all.join(" ")))
            }
            SetDirective::Query(name) => {
                let name = canonical(name).ok_or_else(|| OptionError::Unknown(name.clone()))?;
                Ok(Some(self.show(name)))
            }
            SetDirective::On(name) => self.set_bool(name, |_| true),
            SetDirective::Off(name) => self.set_bool(name, |_| false),
            SetDirective::Toggle(name) => self.set_bool(name, |v| !v),
            SetDirective::Assign(name, value) => {
                let key = canonical(name).ok_or_else(|| OptionError::Unknown(name.clone()))?;
                if is_bool_option(key) {
                    return Err(OptionError::NotNumeric(name.clone()));
                }
                let invalid = || OptionError::InvalidValue {
                    name: name.clone(),
                    value: value.clone(),
                };
                match key {
                    "width" => self.width = value.parse().map_err(|_| invalid())?,
                    "pageheight" => self.page_height = value.parse().map_err(|_| invalid())?,
                    "scrolloff" => self.scroll_off = value.parse().map_err(|_| invalid())?,
                    "marginwidth" => self.margin_width = value.parse().map_err(|_| invalid())?,
                    _ => self.undo_levels = value.parse().map_err(|_| invalid())?,
                }
                log::debug!("option {key} = {value}");
                Ok(None)
            }
        }
    }

    fn set_bool(
        &mut self,
        name: &str,
        f: impl FnOnce(bool) -> bool,
    ) -> Result<Option<String>, OptionError> {
        match canonical(name) {
            Some("stylemargin") => {
                self.style_margin = f(self.style_margin);
                Ok(None)
            }
            Some(_) => Err(OptionError::NotBoolean(name.to_string())),
            None => Err(OptionError::Unknown(name.to_string())),
        }
    }

    fn show(&self, name: &str) -> String {
        match name {
            "width" => format!("width={}", self.width),
            "pageheight" => format!("pageheight={}", self.page_height),
            "scrolloff" => format!("scrolloff={}", self.scroll_off),
            "stylemargin" => format_bool("stylemargin", self.style_margin),
            "marginwidth" => format!("marginwidth={}", self.margin_width),
            _ => format!("undolevels={}", self.undo_levels),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse_set_arg ─────────────────────────────────────────────────────

    #[test]
    fn parse_boolean_on_off() {
        assert_eq!(parse_set_arg("stylemargin"), SetDirective::On("stylemargin".into()));
        assert_eq!(parse_set_arg("nostylemargin"), SetDirective::Off("stylemargin".into()));
        assert_eq!(parse_set_arg("nosm"), SetDirective::Off("sm".into()));
    }

    #[test]
    fn parse_toggle_and_query() {
        assert_eq!(parse_set_arg("sm!"), SetDirective::Toggle("sm".into()));
        assert_eq!(parse_set_arg("width?"), SetDirective::Query("width".into()));
    }

    #[test]
    fn parse_assign() {
        assert_eq!(
            parse_set_arg("width=72"),
            SetDirective::Assign("width".into(), "72".into())
        );
        assert_eq!(
            parse_set_arg("ph=0"),
            SetDirective::Assign("ph".into(), "0".into())
        );
    }

    #[test]
    fn parse_numeric_bare_is_query() {
        assert_eq!(parse_set_arg("scrolloff"), SetDirective::Query("scrolloff".into()));
        assert_eq!(parse_set_arg("mw"), SetDirective::Query("mw".into()));
    }

    #[test]
    fn parse_unknown_no_prefix_is_not_negation() {
        assert_eq!(parse_set_arg("nowidth"), SetDirective::On("nowidth".into()));
        assert_eq!(parse_set_arg("notes"), SetDirective::On("notes".into()));
    }

    #[test]
    fn parse_empty_and_all() {
        assert_eq!(parse_set("  "), vec![SetDirective::ShowChanged]);
        assert_eq!(parse_set("all"), vec![SetDirective::ShowAll]);
    }

    #[test]
    fn known_options() {
        assert!(is_known_option("ul"));
        assert!(is_known_option("stylemargin"));
        assert!(!is_known_option("number"));
    }

    #[test]
    fn format_bool_on_off() {
        assert_eq!(format_bool("stylemargin", true), "stylemargin");
        assert_eq!(format_bool("stylemargin", false), "nostylemargin");
    }

    // ── Options::apply ───────────────────────────────────────────────────

    #[test]
    fn parse_applies_in_order() {
        let o = Options::parse("width=72 pageheight=40 sm so=5 ul=10").unwrap();
        assert_eq!(o.width, 72);
        assert_eq!(o.page_height, 40);
        assert!(o.style_margin);
        assert_eq!(o.scroll_off, 5);
        assert_eq!(o.undo_levels, 10);
    }

    #[test]
    fn toggle_flips() {
        let mut o = Options::default();
        o.apply(&SetDirective::Toggle("sm".into())).unwrap();
        assert!(o.style_margin);
        o.apply(&SetDirective::Toggle("stylemargin".into())).unwrap();
        assert!(!o.style_margin);
    }

    #[test]
    fn queries_and_listings() {
        let mut o = Options::default();
        assert_eq!(o.apply_all("width?").unwrap(), ["width=0"]);
        assert_eq!(o.apply_all("").unwrap(), [""]);

        o.apply_all("mw=4 sm").unwrap();
        assert_eq!(o.apply_all("").unwrap(), ["stylemargin marginwidth=4"]);
        assert_eq!(
            o.apply_all("all").unwrap(),
            ["width=0 pageheight=60 scrolloff=2 stylemargin marginwidth=4 undolevels=1000"]
        );
    }

    #[test]
    fn errors() {
        let mut o = Options::default();
        assert_eq!(
            o.apply_all("bogus=1"),
            Err(OptionError::Unknown("bogus".into()))
        );
        assert_eq!(
            o.apply_all("width=wide"),
            Err(OptionError::InvalidValue { name: "width".into(), value: "wide".into() })
        );
        assert_eq!(o.apply_all("width!"), Err(OptionError::NotBoolean("width".into())));
        assert_eq!(o.apply_all("sm=1"), Err(OptionError::NotNumeric("sm".into())));
        assert_eq!(o.apply_all("frobnicate"), Err(OptionError::Unknown("frobnicate".into())));
        assert_eq!(o, Options::default());
    }

    #[test]
    fn negative_width_is_invalid() {
        assert!(Options::parse("width=-3").is_err());
    }
}
