//! Content segmentation — article markup → ordered speakable units.
//!
//! # Pipeline
//!
//! ```text
//! raw markup
//!   └─▶ canonicalise <p ...> openers to <p>
//!         └─▶ split on <p>  (no boundary → whole input is one segment)
//!               └─▶ per segment: unescape apostrophes → strip tags → decode entities
//!                     → dashes to spaces → collapse whitespace
//! ```
//!
//! [`segment`] is pure and never fails.  Malformed markup is handled
//! best-effort: a tag cut off inside an attribute at the end of its segment
//! is stripped, while a stray `<` in prose (`x<y`) is kept as text.
//!
//! Inline tags (`<a>`, `<em>`, ...) vanish so words stay joined to their
//! punctuation; every other tag separates words.

use std::fmt;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Canonical paragraph boundary after normalisation.
const PARAGRAPH_BOUNDARY: &str = "<p>";

// ---------------------------------------------------------------------------
// SpeakableUnit
// ---------------------------------------------------------------------------

/// One paragraph of markup-free text, ready to hand to a speech engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakableUnit(String);

impl SpeakableUnit {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The text to be spoken.
    pub fn text(&self) -> &str {
        &self.0
    }

    pub fn into_text(self) -> String {
        self.0
    }
}

impl fmt::Display for SpeakableUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// `<p>` / `<P class="x">` — but not `<pre>` or `<param>`.
fn paragraph_open_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?i)<p(?:\s[^>]*)?>").expect("valid paragraph regex"))
}

/// `&#39;`, `&#039;`, `&#x27;`, `&apos;`, and the typographic `&rsquo;` /
/// `&#8217;` / `&#x2019;` most CMSes emit.
fn apostrophe_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?i)&(?:#0*39|#x0*27|apos|rsquo|#0*8217|#x0*2019);")
            .expect("valid apostrophe regex")
    })
}

/// A complete tag, or one cut off inside an attribute at end of input
/// (`<img src="x`).  A `<` that does not open a tag is left alone.
fn tag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(concat!(
            r"<[A-Za-z/!?][^<>]*>",
            r#"|<[A-Za-z/!?][\w:-]*(?:\s+[A-Za-z_:][\w:.-]*(?:=(?:"[^"]*"|'[^']*'|[^\s>"']+))?)*"#,
            r#"\s+[A-Za-z_:][\w:.-]*=(?:"[^"]*|'[^']*|[^\s>"']*)$"#,
        ))
        .expect("valid tag regex")
    })
}

/// `&amp;`, `&#8220;`, `&#x201C;` and friends.
fn entity_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9A-Fa-f]{1,6})|([A-Za-z]{2,8}));")
            .expect("valid entity regex")
    })
}

/// Tags that sit inside a word's flow and must not split it.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "font", "i", "kbd",
    "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var", "wbr",
];

fn is_inline_tag(tag: &str) -> bool {
    let name: String = tag
        .trim_start_matches(&['<', '/'][..])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    INLINE_TAGS.contains(&name.to_ascii_lowercase().as_str())
}

fn decode_named(name: &str) -> Option<&'static str> {
    Some(match name {
        "amp" => "&",
        "quot" => "\"",
        "lt" => "<",
        "gt" => ">",
        "nbsp" => " ",
        "lsquo" | "rsquo" => "'",
        "ldquo" | "rdquo" => "\"",
        "hellip" => "…",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        _ => return None,
    })
}

fn decode_entities(text: &str) -> String {
    entity_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            let numeric = caps
                .get(1)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .or_else(|| caps.get(2).and_then(|m| u32::from_str_radix(m.as_str(), 16).ok()));
            let decoded = match numeric {
                Some(0x2018 | 0x2019) => Some("'".to_string()),
                Some(0xA0) => Some(" ".to_string()),
                Some(code) => char::from_u32(code).map(String::from),
                None => caps
                    .get(3)
                    .and_then(|m| decode_named(m.as_str()))
                    .map(str::to_string),
            };
            decoded.unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn is_dash(c: char) -> bool {
    matches!(c, '-' | '\u{2010}'..='\u{2015}' | '\u{2212}')
}

// ---------------------------------------------------------------------------
// segment
// ---------------------------------------------------------------------------

/// Split marked-up article content into ordered speakable units.
///
/// ```
/// use listen_later::segment::segment;
///
/// let units = segment("<p>Hello</p><p class=\"lead\">World</p>");
/// let texts: Vec<&str> = units.iter().map(|u| u.text()).collect();
/// assert_eq!(texts, ["Hello", "World"]);
/// ```
pub fn segment(raw: &str) -> Vec<SpeakableUnit> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    let normalized = paragraph_open_regex().replace_all(raw, PARAGRAPH_BOUNDARY);

    let pieces: Vec<&str> = if normalized.contains(PARAGRAPH_BOUNDARY) {
        normalized
            .split(PARAGRAPH_BOUNDARY)
            .filter(|piece| !piece.is_empty())
            .collect()
    } else {
        vec![normalized.as_ref()]
    };

    pieces
        .into_iter()
        .map(clean_segment)
        .filter(|text| !text.is_empty())
        .map(SpeakableUnit)
        .collect()
}

/// Reduce one paragraph of markup to plain, speakable text.
fn clean_segment(piece: &str) -> String {
    let unescaped = apostrophe_regex().replace_all(piece, "'");
    let stripped = tag_regex().replace_all(&unescaped, |caps: &Captures<'_>| {
        if is_inline_tag(&caps[0]) {
            ""
        } else {
            " "
        }
    });
    // Entities are decoded after stripping so `&lt;b&gt;` stays text.
    let decoded = decode_entities(&stripped);
    let spaced: String = decoded
        .chars()
        .map(|c| if is_dash(c) { ' ' } else { c })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(raw: &str) -> Vec<String> {
        segment(raw).into_iter().map(SpeakableUnit::into_text).collect()
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(segment("").is_empty());
        assert!(segment("   \n\t").is_empty());
    }

    #[test]
    fn plain_text_is_single_trimmed_unit() {
        assert_eq!(texts("  plain text, no tags \n"), ["plain text, no tags"]);
    }

    #[test]
    fn splits_on_paragraphs() {
        assert_eq!(texts("<p>Hello</p><p>World</p>"), ["Hello", "World"]);
    }

    #[test]
    fn paragraph_attributes_do_not_affect_boundaries() {
        assert_eq!(
            texts(r#"<p class="intro">One</p><P id='x'>Two</P><p>Three</p>"#),
            ["One", "Two", "Three"]
        );
    }

    #[test]
    fn pre_and_param_are_not_paragraph_boundaries() {
        assert_eq!(
            texts("<p>Intro</p><pre>code here</pre><param name=\"a\">"),
            ["Intro code here"]
        );
    }

    #[test]
    fn block_tags_separate_words() {
        assert_eq!(
            texts("<p>Items:<ul><li>Apples</li><li>Pears</li></ul>Line one<br>Line two</p>"),
            ["Items: Apples Pears Line one Line two"]
        );
    }

    #[test]
    fn less_than_in_prose_keeps_the_sentence() {
        assert_eq!(
            texts("<p>For all integers x<y implies x+1<=y, which matters a lot.</p>"),
            ["For all integers x<y implies x+1<=y, which matters a lot."]
        );
        assert_eq!(texts("x<y implies z"), ["x<y implies z"]);
    }

    #[test]
    fn common_entities_are_decoded() {
        assert_eq!(
            texts("<p>Tom &amp; Jerry&#8217;s &quot;show&quot;&nbsp;at&#160;noon</p>"),
            ["Tom & Jerry's \"show\" at noon"]
        );
        assert_eq!(texts("It&rsquo;s &#x2019;fine&#x2019;"), ["It's 'fine'"]);
    }

    #[test]
    fn escaped_markup_stays_text() {
        assert_eq!(texts("<p>Use &lt;b&gt; for bold</p>"), ["Use <b> for bold"]);
    }

    #[test]
    fn unknown_entities_are_left_alone() {
        assert_eq!(texts("a &bogus; b"), ["a &bogus; b"]);
    }

    #[test]
    fn text_before_first_paragraph_is_kept() {
        assert_eq!(
            texts("<h1>Heading</h1><p>Body</p>"),
            ["Heading", "Body"]
        );
    }

    #[test]
    fn dashes_become_spaces() {
        let units = texts("state-of-the-art");
        assert_eq!(units.len(), 1);
        assert!(units[0].contains("state of the art"));
    }

    #[test]
    fn unicode_dashes_become_spaces() {
        assert_eq!(texts("a\u{2014}b\u{2013}c"), ["a b c"]);
    }

    #[test]
    fn encoded_apostrophes_are_unescaped() {
        assert_eq!(
            texts("<p>It&#39;s Bob&#039;s &apos;car&#x27;</p>"),
            ["It's Bob's 'car'"]
        );
    }

    #[test]
    fn inline_markup_is_stripped() {
        assert_eq!(
            texts(r#"<p>Read <a href="https://x.test/a-b">this <em>now</em></a>.</p>"#),
            ["Read this now."]
        );
    }

    #[test]
    fn unterminated_tag_is_stripped_not_fatal() {
        assert_eq!(
            texts("<p>Visible</p><p>Also visible <img src=\"x"),
            ["Visible", "Also visible"]
        );
        assert_eq!(texts("Trailing <a href='y"), ["Trailing"]);
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(texts("<p>one\n  two\t\tthree</p>"), ["one two three"]);
    }

    #[test]
    fn bare_less_than_is_kept() {
        assert_eq!(texts("1 < 2 and 3 > 2"), ["1 < 2 and 3 > 2"]);
    }

    #[test]
    fn markup_only_paragraphs_are_dropped() {
        assert_eq!(
            texts("<p><img src=\"a.png\"></p><p>Text</p><p>  </p>"),
            ["Text"]
        );
    }

    #[test]
    fn order_follows_source() {
        let raw: String = (1..=5).map(|i| format!("<p>Paragraph {i}</p>")).collect();
        let expected: Vec<String> = (1..=5).map(|i| format!("Paragraph {i}")).collect();
        assert_eq!(texts(&raw), expected);
    }

    #[test]
    fn is_deterministic() {
        let raw = r#"<p class="a">It&#39;s a well-known <b>fact</b></p><p>Second</p>"#;
        assert_eq!(segment(raw), segment(raw));
    }
}
