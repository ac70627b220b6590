use regex::Regex;
use std::sync::OnceLock;

fn fence_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*```").expect("Invalid fence regex"))
}

fn heading_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#{1,3}\s+").expect("Invalid heading prefix regex"))
}

fn list_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Bullet/numbered markers (possibly nested) and an optional task box
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:(?:[-*+]|\d+\.)\s+)*(?:\[[ x>-]\]\s*)?").expect("Invalid list regex")
    })
}

fn bold_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").expect("Invalid bold regex"))
}

fn italic_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*([^*]+)\*").expect("Invalid italic regex"))
}

fn code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("Invalid inline code regex"))
}

fn link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").expect("Invalid link regex"))
}

/// Strip markdown syntax from text, producing a plain-text snippet for
/// previews.
///
/// Removes heading markers, emphasis and code delimiters, link targets
/// (keeping the label), list/task markers and fence lines, then collapses
/// all whitespace runs to single spaces. Idempotent: stripping already-plain
/// text returns it unchanged (modulo whitespace collapsing).
pub fn strip_markdown(text: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    for line in text.lines() {
        // Fence lines disappear entirely; interior code lines survive as text
        if fence_line_regex().is_match(line) {
            continue;
        }

        let line = heading_prefix_regex().replace(line, "");
        let line = list_prefix_regex().replace(&line, "").into_owned();
        let line = bold_regex().replace_all(&line, "$1").into_owned();
        let line = italic_regex().replace_all(&line, "$1").into_owned();
        let line = code_regex().replace_all(&line, "$1").into_owned();
        let line = link_regex().replace_all(&line, "$1").into_owned();

        parts.push(line);
    }

    parts
        .iter()
        .flat_map(|l| l.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}
