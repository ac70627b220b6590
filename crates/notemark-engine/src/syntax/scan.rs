use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// Kinds of markdown constructs recognized by the scanner.
///
/// Deliberately a small, fixed grammar subset: no full CommonMark/GFM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Bold,
    Italic,
    Code,
    Heading,
    Link,
    CodeBlock,
}

/// A markdown construct found in the buffer.
///
/// Spans are half-open byte ranges into the scanned text. For symmetric
/// kinds (bold/italic/code) `marker_spans` and `content_span` partition
/// `span` with no gaps. For links the two marker spans are
/// `[span.start, content.start)` (the `[`) and `[content.end, span.end)`
/// (the `](url)` tail). For code blocks the marker spans are the opening
/// and closing fence lines and the content is the interior.
///
/// Elements are derived purely from the current buffer text and carry no
/// identity across edits; the scan is rerun on every relevant change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownElement {
    pub kind: ElementKind,
    pub span: Range<usize>,
    pub marker_spans: Vec<Range<usize>>,
    pub content_span: Range<usize>,
    /// Heading level 1-3; `None` for other kinds
    pub level: Option<u8>,
    /// 1-based line number of `span.start`
    pub line: usize,
}

fn heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,3})(\s+)(.+)$").expect("Invalid heading regex"))
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
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("Invalid code regex"))
}

fn link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").expect("Invalid link regex"))
}

/// Scan the whole buffer for markdown elements, ordered by ascending start
/// offset.
///
/// Fenced code blocks are found first in a single line pass tracking fence
/// state; an unterminated opening fence yields no element. Inline constructs
/// and headings are then scanned per line, skipping lines inside a fenced
/// block so code is never double-decorated. Bold is matched before italic
/// and wins any overlap, which stands in for the negative look-around the
/// regex engine does not support.
pub fn scan(text: &str) -> Vec<MarkdownElement> {
    let lines = line_spans(text);
    let mut elements = Vec::new();

    // Pass 1: fenced code blocks
    let mut in_fence: Option<usize> = None;
    let mut fenced_lines = vec![false; lines.len()];
    for (idx, &(start, end)) in lines.iter().enumerate() {
        if !text[start..end].trim_start().starts_with("```") {
            continue;
        }
        match in_fence.take() {
            None => in_fence = Some(idx),
            Some(open_idx) => {
                let (open_start, open_end) = lines[open_idx];
                let (close_start, close_end) = (start, end);

                // Content is the interior between the two fence lines
                let content_start = (open_end + 1).min(close_start);
                elements.push(MarkdownElement {
                    kind: ElementKind::CodeBlock,
                    span: open_start..close_end,
                    marker_spans: vec![open_start..open_end, close_start..close_end],
                    content_span: content_start..close_start,
                    level: None,
                    line: open_idx + 1,
                });
                for flag in fenced_lines.iter_mut().take(idx + 1).skip(open_idx) {
                    *flag = true;
                }
            }
        }
    }
    // A dangling `in_fence` is an unterminated block: no element, and its
    // interior lines stay eligible for inline scanning

    // Pass 2: per-line inline constructs and headings
    for (idx, &(start, end)) in lines.iter().enumerate() {
        if fenced_lines[idx] {
            continue;
        }
        scan_line(&text[start..end], start, idx + 1, &mut elements);
    }

    elements.sort_by_key(|e| (e.span.start, e.span.end));
    elements
}

fn scan_line(line: &str, base: usize, line_number: usize, out: &mut Vec<MarkdownElement>) {
    if let Some(caps) = heading_regex().captures(line) {
        let hashes = caps.get(1).expect("heading group");
        let ws = caps.get(2).expect("heading whitespace group");
        let content = caps.get(3).expect("heading content group");
        out.push(MarkdownElement {
            kind: ElementKind::Heading,
            span: base..base + line.len(),
            marker_spans: vec![base + hashes.start()..base + ws.end()],
            content_span: base + content.start()..base + content.end(),
            level: Some(hashes.as_str().len() as u8),
            line: line_number,
        });
    }

    for caps in code_regex().captures_iter(line) {
        let full = caps.get(0).expect("code match");
        let inner = caps.get(1).expect("code content group");
        out.push(MarkdownElement {
            kind: ElementKind::Code,
            span: base + full.start()..base + full.end(),
            marker_spans: vec![
                base + full.start()..base + inner.start(),
                base + inner.end()..base + full.end(),
            ],
            content_span: base + inner.start()..base + inner.end(),
            level: None,
            line: line_number,
        });
    }

    // Bold before italic; bold wins any overlap
    let mut bold_spans: Vec<Range<usize>> = Vec::new();
    for caps in bold_regex().captures_iter(line) {
        let full = caps.get(0).expect("bold match");
        let inner = caps.get(1).expect("bold content group");
        bold_spans.push(full.range());
        out.push(MarkdownElement {
            kind: ElementKind::Bold,
            span: base + full.start()..base + full.end(),
            marker_spans: vec![
                base + full.start()..base + inner.start(),
                base + inner.end()..base + full.end(),
            ],
            content_span: base + inner.start()..base + inner.end(),
            level: None,
            line: line_number,
        });
    }

    // Blank out bold spans before the italic pass so their asterisks are
    // invisible to it (the engine has no negative look-around); offsets are
    // preserved because the mask is length-identical
    let mut masked = String::with_capacity(line.len());
    let mut pos = 0;
    for b in &bold_spans {
        masked.push_str(&line[pos..b.start]);
        masked.extend(std::iter::repeat(' ').take(b.end - b.start));
        pos = b.end;
    }
    masked.push_str(&line[pos..]);

    for caps in italic_regex().captures_iter(&masked) {
        let full = caps.get(0).expect("italic match");
        let inner = caps.get(1).expect("italic content group");
        out.push(MarkdownElement {
            kind: ElementKind::Italic,
            span: base + full.start()..base + full.end(),
            marker_spans: vec![
                base + full.start()..base + inner.start(),
                base + inner.end()..base + full.end(),
            ],
            content_span: base + inner.start()..base + inner.end(),
            level: None,
            line: line_number,
        });
    }

    for caps in link_regex().captures_iter(line) {
        let full = caps.get(0).expect("link match");
        let label = caps.get(1).expect("link label group");
        out.push(MarkdownElement {
            kind: ElementKind::Link,
            span: base + full.start()..base + full.end(),
            marker_spans: vec![
                base + full.start()..base + label.start(),
                base + label.end()..base + full.end(),
            ],
            content_span: base + label.start()..base + label.end(),
            level: None,
            line: line_number,
        });
    }
}

/// Byte spans of each line, excluding the trailing newline
pub(crate) fn line_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        if ch == '\n' {
            spans.push((start, i));
            start = i + 1;
        }
    }
    spans.push((start, text.len()));
    spans
}

/// 1-based line number containing the given byte offset
pub(crate) fn line_number_at(text: &str, offset: usize) -> usize {
    let offset = offset.min(text.len());
    text.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(elements: &[MarkdownElement]) -> Vec<ElementKind> {
        elements.iter().map(|e| e.kind).collect()
    }

    // ============ Inline construct tests ============

    #[test]
    fn test_scan_bold() {
        let text = "This is **bold** text";
        let elements = scan(text);

        assert_eq!(kinds(&elements), vec![ElementKind::Bold]);
        let bold = &elements[0];
        assert_eq!(&text[bold.span.clone()], "**bold**");
        assert_eq!(&text[bold.content_span.clone()], "bold");
        assert_eq!(bold.marker_spans.len(), 2);
        assert_eq!(&text[bold.marker_spans[0].clone()], "**");
        assert_eq!(&text[bold.marker_spans[1].clone()], "**");
    }

    #[test]
    fn test_scan_italic_not_inside_bold() {
        let text = "**bold** and *italic*";
        let elements = scan(text);

        assert_eq!(kinds(&elements), vec![ElementKind::Bold, ElementKind::Italic]);
        assert_eq!(&text[elements[1].content_span.clone()], "italic");
    }

    #[test]
    fn test_scan_bold_wins_overlap() {
        // The italic regex would happily match inside `**x**`; bold wins
        let text = "**emphasized**";
        let elements = scan(text);

        assert_eq!(kinds(&elements), vec![ElementKind::Bold]);
    }

    #[test]
    fn test_scan_inline_code() {
        let text = "run `cargo test` now";
        let elements = scan(text);

        assert_eq!(kinds(&elements), vec![ElementKind::Code]);
        assert_eq!(&text[elements[0].content_span.clone()], "cargo test");
    }

    #[test]
    fn test_scan_markers_and_content_partition_span() {
        let text = "a **b** `c` *d*";
        for el in scan(text) {
            // Symmetric kinds: opening marker + content + closing marker
            // cover the span exactly
            assert_eq!(el.marker_spans[0].start, el.span.start);
            assert_eq!(el.marker_spans[0].end, el.content_span.start);
            assert_eq!(el.content_span.end, el.marker_spans[1].start);
            assert_eq!(el.marker_spans[1].end, el.span.end);
        }
    }

    // ============ Link tests ============

    #[test]
    fn test_scan_link_spans() {
        let text = "see [docs](https://example.com) here";
        let elements = scan(text);

        assert_eq!(kinds(&elements), vec![ElementKind::Link]);
        let link = &elements[0];
        assert_eq!(&text[link.span.clone()], "[docs](https://example.com)");
        assert_eq!(&text[link.content_span.clone()], "docs");
        // Hidden regions: the `[` before the label and the `](url)` after it
        assert_eq!(&text[link.marker_spans[0].clone()], "[");
        assert_eq!(&text[link.marker_spans[1].clone()], "](https://example.com)");
    }

    // ============ Heading tests ============

    #[test]
    fn test_scan_heading_levels() {
        let text = "# One\n## Two\n### Three";
        let elements = scan(text);

        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].level, Some(1));
        assert_eq!(elements[1].level, Some(2));
        assert_eq!(elements[2].level, Some(3));
        assert_eq!(&text[elements[2].content_span.clone()], "Three");
    }

    #[test]
    fn test_scan_heading_level_four_not_matched() {
        assert!(scan("#### Too deep").is_empty());
    }

    #[test]
    fn test_scan_heading_marker_includes_whitespace() {
        let text = "##  Spaced";
        let elements = scan(text);

        assert_eq!(&text[elements[0].marker_spans[0].clone()], "##  ");
        assert_eq!(&text[elements[0].content_span.clone()], "Spaced");
    }

    // ============ Code block tests ============

    #[test]
    fn test_scan_code_block() {
        let text = "before\n```\nlet x = 1;\n```\nafter";
        let elements = scan(text);

        assert_eq!(kinds(&elements), vec![ElementKind::CodeBlock]);
        let block = &elements[0];
        assert_eq!(&text[block.span.clone()], "```\nlet x = 1;\n```");
        assert_eq!(&text[block.content_span.clone()], "let x = 1;\n");
        assert_eq!(&text[block.marker_spans[0].clone()], "```");
        assert_eq!(&text[block.marker_spans[1].clone()], "```");
    }

    #[test]
    fn test_scan_unterminated_fence_yields_nothing() {
        let text = "```\nno closing fence here";
        let elements = scan(text);

        assert!(
            elements.iter().all(|e| e.kind != ElementKind::CodeBlock),
            "Incomplete blocks are not decorated"
        );
    }

    #[test]
    fn test_scan_suppresses_inline_inside_fence() {
        let text = "```\n**not bold** and `not code`\n```";
        let elements = scan(text);

        assert_eq!(kinds(&elements), vec![ElementKind::CodeBlock]);
    }

    #[test]
    fn test_scan_fence_with_language_tag() {
        let text = "```rust\nfn main() {}\n```";
        let elements = scan(text);

        assert_eq!(kinds(&elements), vec![ElementKind::CodeBlock]);
        assert_eq!(&text[elements[0].content_span.clone()], "fn main() {}\n");
    }

    // ============ Ordering and purity tests ============

    #[test]
    fn test_scan_orders_by_start_offset() {
        let text = "# Head\nsome *i* and **b** and [l](u)\n`c`";
        let elements = scan(text);

        let starts: Vec<usize> = elements.iter().map(|e| e.span.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
    }

    #[test]
    fn test_scan_is_pure() {
        let text = "# T\n**b** *i* `c` [l](u)\n```\nx\n```";
        assert_eq!(scan(text), scan(text));
    }

    #[test]
    fn test_scan_records_line_numbers() {
        let text = "plain\n**bold**\n# head";
        let elements = scan(text);

        let bold = elements.iter().find(|e| e.kind == ElementKind::Bold).unwrap();
        let head = elements.iter().find(|e| e.kind == ElementKind::Heading).unwrap();
        assert_eq!(bold.line, 2);
        assert_eq!(head.line, 3);
    }

    // ============ Line helper tests ============

    #[test]
    fn test_line_spans() {
        assert_eq!(line_spans("ab\ncd"), vec![(0, 2), (3, 5)]);
        assert_eq!(line_spans("ab\n"), vec![(0, 2), (3, 3)]);
        assert_eq!(line_spans(""), vec![(0, 0)]);
    }

    #[test]
    fn test_line_number_at() {
        let text = "ab\ncd\nef";
        assert_eq!(line_number_at(text, 0), 1);
        assert_eq!(line_number_at(text, 2), 1);
        assert_eq!(line_number_at(text, 3), 2);
        assert_eq!(line_number_at(text, 7), 3);
        assert_eq!(line_number_at(text, 100), 3);
    }
}
