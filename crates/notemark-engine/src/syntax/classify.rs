use regex::Regex;
use std::sync::OnceLock;

/// Classification of a single line of buffer text.
///
/// Exactly one variant applies to any input string; [`classify_line`] is
/// total. Precedence is task > bullet > numbered, because the task syntax is
/// a superset shape of the bullet syntax.
///
/// `indent` is the text to reproduce verbatim when continuing the line with
/// Enter. For a nested bullet like `"-   - Child"` the parent marker and its
/// spacing fold into the indent (`"-   "`), preserving total alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    Task {
        indent: String,
        /// Status glyph between the brackets: `' '`, `'x'`, `'>'` or `'-'`
        glyph: char,
        empty: bool,
    },
    Bullet {
        indent: String,
        marker: char,
        empty: bool,
    },
    Numbered {
        indent: String,
        number: u64,
        empty: bool,
    },
    Plain,
}

impl LineClass {
    /// Whether this is a list line of any shape
    pub fn is_list(&self) -> bool {
        !matches!(self, LineClass::Plain)
    }

    /// Whether the line carries a marker but no content
    pub fn is_empty_item(&self) -> bool {
        matches!(
            self,
            LineClass::Task { empty: true, .. }
                | LineClass::Bullet { empty: true, .. }
                | LineClass::Numbered { empty: true, .. }
        )
    }
}

fn task_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Leading whitespace, one or more bullet markers separated by whitespace,
    // then a status box. Trailing content is optional (empty item).
    RE.get_or_init(|| {
        Regex::new(r"^(\s*(?:[-*+]\s+)+)\[([ x>-])\](?:\s+(.*))?$").expect("Invalid task regex")
    })
}

fn bullet_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The repeated group folds any parent markers into the effective indent,
    // so `-   - Child` classifies with indent `-   ` and marker `-`.
    RE.get_or_init(|| {
        Regex::new(r"^(\s*(?:[-*+]\s+)*)([-*+])(?:\s+(.*))?$").expect("Invalid bullet regex")
    })
}

fn numbered_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)(\d+)\.(?:\s+(.*))?$").expect("Invalid numbered regex"))
}

/// Classify one line of text. Total: every string maps to exactly one
/// [`LineClass`].
pub fn classify_line(line: &str) -> LineClass {
    // Task first: its syntax is a superset shape of a bullet line
    if let Some(caps) = task_regex().captures(line) {
        let prefix = caps.get(1).map_or("", |m| m.as_str());
        let glyph = caps
            .get(2)
            .and_then(|m| m.as_str().chars().next())
            .unwrap_or(' ');
        let empty = caps.get(3).is_none_or(|m| m.as_str().trim().is_empty());

        // Indent is everything before the last marker, so continuation
        // reproduces parent markers and spacing exactly
        let indent = prefix
            .rfind(['-', '*', '+'])
            .map_or(String::new(), |idx| prefix[..idx].to_string());

        return LineClass::Task {
            indent,
            glyph,
            empty,
        };
    }

    if let Some(caps) = bullet_regex().captures(line) {
        let indent = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let marker = caps
            .get(2)
            .and_then(|m| m.as_str().chars().next())
            .unwrap_or('-');
        let empty = caps.get(3).is_none_or(|m| m.as_str().trim().is_empty());

        return LineClass::Bullet {
            indent,
            marker,
            empty,
        };
    }

    if let Some(caps) = numbered_regex().captures(line) {
        // A number too large to parse is not a list line
        if let Some(number) = caps.get(2).and_then(|m| m.as_str().parse::<u64>().ok()) {
            let indent = caps.get(1).map_or("", |m| m.as_str()).to_string();
            let empty = caps.get(3).is_none_or(|m| m.as_str().trim().is_empty());

            return LineClass::Numbered {
                indent,
                number,
                empty,
            };
        }
    }

    LineClass::Plain
}
