//! Candidate detection for the link pass.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

use crate::defaults;

fn tld_alternation() -> String {
    // Longer entries first so .com is not swallowed by .co.
    let mut tlds = defaults::TLDS.to_vec();
    tlds.reverse();
    tlds.join("|")
}

lazy_static! {
    static ref URL_RE: Regex = Regex::new(&format!(
        r#"(?i)\(*\b(?:(?:{schemes}):/{{0,3}}(?:(?:\w+:)?\w+@)?)?(?:[\w-]+\.)+(?:{tlds})(?::[0-9]+)?\b(?:[/?][^\s{{}}|\\^\[\]`<>"]*)?"#,
        schemes = defaults::URL_SCHEMES.join("|"),
        tlds = tld_alternation(),
    ))
    .expect("static pattern");
    static ref PROTO_RE: Regex = Regex::new(r"(?i)^[\w-]+:/{0,3}").expect("static pattern");
    static ref PUNCT_RE: Regex = Regex::new(r"[.,]+$").expect("static pattern");
    // Dot-atom or line-anchored quoted-string local part, then a dotted
    // domain ending in a plausible TLD.
    static ref EMAIL_RE: Regex = Regex::new(
        r#"(?im)(?:[-!#$%&'*+/=?^_`{}|~0-9a-z]+(?:\.[-!#$%&'*+/=?^_`{}|~0-9a-z]+)*|^"(?:[\x01-\x08\x0b\x0c\x0e-\x1f!#-\[\]-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,6}"#
    )
    .expect("static pattern");
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when more domain-ish text follows the match, like the `.foo`
/// in `example.com.foo`.
fn continues_as_domain(text: &str, end: usize) -> bool {
    let mut rest = text[end..].chars();
    rest.next() == Some('.') && rest.next().is_some_and(is_word_char)
}

/// Byte ranges of URL candidates in `text`. A candidate keeps any run
/// of opening parentheses immediately before it.
pub(crate) fn find_links(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    for m in URL_RE.find_iter(text) {
        let leading = m.as_str().bytes().take_while(|b| *b == b'(').count();
        if leading == 0 {
            // The host must not continue an email address or a longer
            // dotted name to its left.
            let before = text[..m.start()].chars().next_back();
            if matches!(before, Some('@') | Some('.')) {
                continue;
            }
        }
        if continues_as_domain(text, m.end()) {
            continue;
        }
        spans.push(m.range());
    }
    spans
}

/// Byte ranges of email address candidates in `text`.
pub(crate) fn find_emails(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    for m in EMAIL_RE.find_iter(text) {
        // A match growing out of // is the userinfo of a URL, not an
        // address.
        if m.as_str().starts_with("//") {
            continue;
        }
        spans.push(m.range());
    }
    spans
}

/// Removes a leading run of `(` and up to as many closing `)` from the
/// end. Returns the remainder and both counts; parentheses inside the
/// fragment stay put.
pub(crate) fn strip_wrapping_parentheses(fragment: &str) -> (&str, usize, usize) {
    let opening = fragment.bytes().take_while(|b| *b == b'(').count();
    if opening == 0 {
        return (fragment, 0, 0);
    }
    let inner = &fragment[opening..];
    let trailing = inner.bytes().rev().take_while(|b| *b == b')').count();
    let closing = trailing.min(opening);
    (&inner[..inner.len() - closing], opening, closing)
}

/// Splits a trailing run of `.` and `,` off a candidate URL.
pub(crate) fn split_trailing_punctuation(url: &str) -> (&str, &str) {
    match PUNCT_RE.find(url) {
        Some(m) => url.split_at(m.start()),
        None => (url, ""),
    }
}

pub(crate) fn has_scheme(url: &str) -> bool {
    PROTO_RE.is_match(url)
}
