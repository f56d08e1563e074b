//! Whitelist-driven cleaning of HTML fragments.

use std::collections::{HashMap, HashSet};

use cow_utils::CowUtils;
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, QualName};
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::defaults::{self, URI_ATTRIBUTES, VOID_ELEMENTS};
use crate::dom::serializer::render_tokens;
use crate::dom::sink::parse_fragment_str;
use crate::dom::walker::{Token, TreeWalker};

lazy_static! {
    // Whole-value gate for style attributes: names, numbers, quoted words
    // and numeric parens only. Anything else drops the attribute.
    static ref CSS_GATE_RE: Regex = Regex::new(
        r#"^(?:[:,;#%.\sa-zA-Z0-9!]|\w-\w|'[\s\w]+'|"[\s\w]+"|\([\d,\s]+\))*$"#
    )
    .expect("static pattern");
    static ref CSS_DECL_RE: Regex = Regex::new(r"([-\w]+)\s*:\s*([^:;]*)").expect("static pattern");
}

/// Post-sanitization hook over the token stream.
///
/// Filters run in registration order after the whitelist pass; whatever
/// they return is serialized as-is, so a filter can undo the sanitizing
/// guarantees if it is careless with what it emits.
pub trait TokenFilter: Send + Sync {
    fn process(&self, tokens: Vec<Token>) -> Vec<Token>;
}

/// Reusable whitelist sanitizer.
///
/// ```
/// use lye::Cleaner;
///
/// let cleaner = Cleaner::new().strip(true);
/// assert_eq!(cleaner.clean("<script>x()</script>ok"), "x()ok");
/// ```
pub struct Cleaner {
    tags: HashSet<String>,
    attributes: HashMap<String, HashSet<String>>,
    styles: HashSet<String>,
    protocols: HashSet<String>,
    strip: bool,
    strip_comments: bool,
    filters: Vec<Box<dyn TokenFilter>>,
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}

fn owned_set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

impl Cleaner {
    pub fn new() -> Self {
        Self {
            tags: owned_set(defaults::ALLOWED_TAGS),
            attributes: defaults::ALLOWED_ATTRIBUTES
                .iter()
                .map(|(tag, names)| ((*tag).to_owned(), owned_set(names)))
                .collect(),
            styles: owned_set(defaults::ALLOWED_STYLES),
            protocols: owned_set(defaults::ALLOWED_PROTOCOLS),
            strip: false,
            strip_comments: true,
            filters: Vec::new(),
        }
    }

    /// Replaces the allowed tag set.
    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags
            .iter()
            .map(|t| t.cow_to_ascii_lowercase().into_owned())
            .collect();
        self
    }

    /// Replaces the per-tag attribute whitelist. The `"*"` key allows its
    /// attributes on every tag.
    pub fn attributes(mut self, map: &[(&str, &[&str])]) -> Self {
        self.attributes = map
            .iter()
            .map(|(tag, names)| {
                let names = names
                    .iter()
                    .map(|n| n.cow_to_ascii_lowercase().into_owned())
                    .collect();
                (tag.cow_to_ascii_lowercase().into_owned(), names)
            })
            .collect();
        self
    }

    /// Replaces the allowed CSS property set for `style` attributes.
    pub fn styles(mut self, styles: &[&str]) -> Self {
        self.styles = styles
            .iter()
            .map(|s| s.cow_to_ascii_lowercase().into_owned())
            .collect();
        self
    }

    /// Replaces the allowed URL scheme set.
    pub fn protocols(mut self, protocols: &[&str]) -> Self {
        self.protocols = protocols
            .iter()
            .map(|p| p.cow_to_ascii_lowercase().into_owned())
            .collect();
        self
    }

    /// Strip disallowed markup instead of escaping it.
    pub fn strip(mut self, strip: bool) -> Self {
        self.strip = strip;
        self
    }

    /// Drop HTML comments. On by default.
    pub fn strip_comments(mut self, strip_comments: bool) -> Self {
        self.strip_comments = strip_comments;
        self
    }

    /// Appends a filter to run over the token stream after sanitizing.
    pub fn filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sanitizes `text` against the configured whitelists.
    pub fn clean(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let fragment = parse_fragment_str(text);
        let walker = TreeWalker::new(&fragment, fragment.root());
        let mut tokens = self.sanitize(walker);
        for filter in &self.filters {
            tokens = filter.process(tokens);
        }
        render_tokens(&tokens)
    }

    fn sanitize(&self, tokens: impl Iterator<Item = Token>) -> Vec<Token> {
        let mut out = Vec::new();
        for token in tokens {
            match token {
                Token::Open { name, attrs } => {
                    let tag = name.local.cow_to_ascii_lowercase().into_owned();
                    if self.tags.contains(&tag) {
                        let kept = self.filter_attributes(&tag, attrs);
                        out.push(Token::Open { name, attrs: kept });
                    } else if self.strip {
                        log::debug!("stripping disallowed tag <{tag}>");
                    } else {
                        out.push(Token::Text(open_tag_literal(&name, &attrs)));
                    }
                }
                Token::Close { name } => {
                    let tag = name.local.cow_to_ascii_lowercase().into_owned();
                    if self.tags.contains(&tag) {
                        out.push(Token::Close { name });
                    } else if !self.strip && !VOID_ELEMENTS.contains(tag.as_str()) {
                        out.push(Token::Text(format!("</{}>", name.local)));
                    }
                }
                Token::Comment(text) => {
                    if !self.strip_comments {
                        out.push(Token::Comment(text));
                    }
                }
                Token::Text(text) => out.push(Token::Text(text)),
            }
        }
        out
    }

    fn filter_attributes(&self, tag: &str, attrs: Vec<Attribute>) -> Vec<Attribute> {
        let mut kept = Vec::new();
        for mut attr in attrs {
            let attr_name = attr.name.local.cow_to_ascii_lowercase().into_owned();
            if !self.attribute_allowed(tag, &attr_name) {
                log::debug!("dropping attribute {attr_name} on <{tag}>");
                continue;
            }
            if URI_ATTRIBUTES.contains(attr_name.as_str()) && !self.protocol_allowed(&attr.value)
            {
                log::debug!("dropping {attr_name} with a disallowed scheme on <{tag}>");
                continue;
            }
            if attr_name == "style" {
                let cleaned = self.sanitize_css(&attr.value);
                if cleaned.is_empty() {
                    log::debug!("dropping style attribute on <{tag}>");
                    continue;
                }
                attr.value = StrTendril::from_slice(&cleaned);
            }
            kept.push(attr);
        }
        kept.sort_by(|a, b| a.name.local[..].cmp(&b.name.local[..]));
        kept
    }

    fn attribute_allowed(&self, tag: &str, attr_name: &str) -> bool {
        let listed = |key: &str| {
            self.attributes
                .get(key)
                .is_some_and(|names| names.contains(attr_name))
        };
        listed(tag) || listed("*")
    }

    /// Absolute URLs must carry a whitelisted scheme; relative ones pass.
    fn protocol_allowed(&self, value: &str) -> bool {
        match Url::parse(value) {
            Ok(url) => self.protocols.contains(url.scheme()),
            Err(url::ParseError::RelativeUrlWithoutBase) => true,
            Err(err) => {
                log::debug!("dropping unparsable URL value: {err}");
                false
            }
        }
    }

    /// Reduces a style value to its whitelisted declarations, reassembled
    /// as `prop: value;` pairs. Empty result means the attribute goes.
    fn sanitize_css(&self, value: &str) -> String {
        if !CSS_GATE_RE.is_match(value) {
            return String::new();
        }
        let mut kept = Vec::new();
        for cap in CSS_DECL_RE.captures_iter(value) {
            let (Some(prop), Some(val)) = (cap.get(1), cap.get(2)) else {
                continue;
            };
            let val = val.as_str().trim();
            if val.is_empty() {
                continue;
            }
            let prop_key = prop.as_str().cow_to_ascii_lowercase();
            if self.styles.contains(prop_key.as_ref()) {
                kept.push(format!("{}: {};", prop.as_str(), val));
            }
        }
        kept.join(" ")
    }
}

/// Rebuilds a disallowed open tag as literal text; the serializer escapes
/// it on output.
fn open_tag_literal(name: &QualName, attrs: &[Attribute]) -> String {
    let mut out = String::from("<");
    out.push_str(&name.local);
    for attr in attrs {
        out.push(' ');
        out.push_str(&attr.name.local);
        out.push_str("=\"");
        out.push_str(&attr.value);
        out.push('"');
    }
    if VOID_ELEMENTS.contains(&name.local[..]) {
        out.push('/');
    }
    out.push('>');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use markup5ever::{local_name, namespace_url, ns};
    use test_case::test_case;

    #[test_case("http://example.com", true; "plain http")]
    #[test_case("https://example.com/x", true; "plain https")]
    #[test_case("mailto:me@example.com", true; "mailto")]
    #[test_case("/relative/path", true; "rooted relative")]
    #[test_case("page.html#fragment", true; "bare relative")]
    #[test_case("javascript:alert(1)", false; "javascript")]
    #[test_case("JaVaScRiPt:alert(1)", false; "javascript mixed case")]
    #[test_case("data:text/html;base64,AA==", false; "data url")]
    fn protocol_allowed(value: &str, expected: bool) {
        assert_eq!(Cleaner::new().protocol_allowed(value), expected);
    }

    #[test_case("color: red", &["color"], "color: red;"; "kept and reassembled")]
    #[test_case("color:red", &["color"], "color: red;"; "compact input")]
    #[test_case("color: red; margin: 0", &["color"], "color: red;"; "partial keep")]
    #[test_case("color: expression(alert(1))", &["color"], ""; "gate rejects call syntax")]
    #[test_case("color: red", &[], ""; "nothing allowed")]
    #[test_case("color: ; margin: 0", &["color", "margin"], "margin: 0;"; "empty value dropped")]
    fn css_filtering(value: &str, allowed: &[&str], expected: &str) {
        let cleaner = Cleaner::new().styles(allowed);
        assert_eq!(cleaner.sanitize_css(value), expected);
    }

    #[test]
    fn wildcard_attributes_apply_to_all_tags() {
        let cleaner = Cleaner::new()
            .tags(&["a", "em"])
            .attributes(&[("*", &["title"]), ("a", &["href"])]);
        assert!(cleaner.attribute_allowed("em", "title"));
        assert!(cleaner.attribute_allowed("a", "title"));
        assert!(cleaner.attribute_allowed("a", "href"));
        assert!(!cleaner.attribute_allowed("em", "href"));
    }

    #[test]
    fn literal_open_tag_includes_attributes() {
        let name = QualName::new(None, ns!(html), local_name!("span"));
        let attrs = vec![Attribute {
            name: QualName::new(None, ns!(), local_name!("id")),
            value: StrTendril::from_slice("x"),
        }];
        assert_eq!(open_tag_literal(&name, &attrs), "<span id=\"x\">");
    }

    #[test]
    fn literal_void_tag_self_closes() {
        let name = QualName::new(None, ns!(html), local_name!("br"));
        assert_eq!(open_tag_literal(&name, &[]), "<br/>");
    }
}
