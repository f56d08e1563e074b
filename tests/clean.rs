use lye::{clean, Cleaner, Token, TokenFilter};
use test_case::test_case;

#[test]
fn empty_input_returns_empty() {
    assert_eq!(clean(""), "");
}

#[test]
fn plain_text_passes_through() {
    assert_eq!(clean("no html string"), "no html string");
}

#[test_case("an <strong>allowed</strong> tag")]
#[test_case("another <em>good</em> tag")]
fn allowed_markup_is_kept(text: &str) {
    assert_eq!(clean(text), text);
}

#[test]
fn unclosed_allowed_tag_is_balanced() {
    assert_eq!(clean("a <em>fixed tag"), "a <em>fixed tag</em>");
}

#[test_case(
    "a <script>safe()</script> test",
    "a &lt;script&gt;safe()&lt;/script&gt; test";
    "script"
)]
#[test_case(
    "a <style>body{}</style> test",
    "a &lt;style&gt;body{}&lt;/style&gt; test";
    "style"
)]
#[test_case("x<br>y", "x&lt;br/&gt;y"; "void gets no end tag")]
fn disallowed_markup_is_escaped(text: &str, expected: &str) {
    assert_eq!(clean(text), expected);
}

#[test]
fn strip_removes_disallowed_markup() {
    let cleaner = Cleaner::new().strip(true);
    assert_eq!(
        cleaner.clean("a test <em>with</em> <img src=\"http://example.com/\"> <b>html</b> tags"),
        "a test <em>with</em>  <b>html</b> tags",
    );
}

#[test]
fn strip_unwraps_nested_markup() {
    let cleaner = Cleaner::new().tags(&["p"]).strip(true);
    assert_eq!(
        cleaner.clean("<p><span>multiply <span>nested <span>text</span></span></span></p>"),
        "<p>multiply nested text</p>",
    );
}

#[test]
fn strip_keeps_whitelisted_descendants() {
    let cleaner = Cleaner::new()
        .tags(&["p", "img"])
        .attributes(&[("img", &["src"])])
        .strip(true);
    assert_eq!(
        cleaner.clean("<p><a href=\"http://example.com/\"><img src=\"http://example.com/\"></a></p>"),
        "<p><img src=\"http://example.com/\"></p>",
    );
}

#[test_case("<!-- comment -->Just text", "Just text"; "closed comment")]
#[test_case("<!-- open comment", ""; "open comment")]
#[test_case("</3", ""; "bogus end tag becomes a comment")]
fn comments_are_stripped_by_default(text: &str, expected: &str) {
    assert_eq!(clean(text), expected);
}

#[test]
fn comments_kept_when_configured() {
    let cleaner = Cleaner::new().strip_comments(false);
    assert_eq!(cleaner.clean("<!-- open comment"), "<!-- open comment-->");
}

#[test]
fn attributes_not_on_the_whitelist_are_dropped() {
    assert_eq!(clean("<em href=\"fail\">no link</em>"), "<em>no link</em>");
    let cleaner = Cleaner::new().attributes(&[("a", &["href"])]);
    assert_eq!(
        cleaner.clean("<a href=\"http://xx.com\" rel=\"alternate\">xx</a>"),
        "<a href=\"http://xx.com\">xx</a>",
    );
}

#[test]
fn tag_and_attribute_names_fold_but_values_do_not() {
    let cleaner = Cleaner::new()
        .tags(&["em"])
        .attributes(&[("em", &["class"])]);
    assert_eq!(
        cleaner.clean("<EM CLASS=\"FOO\">BAR</EM>"),
        "<em class=\"FOO\">BAR</em>",
    );
}

#[test]
fn wildcard_attributes_apply_everywhere() {
    let cleaner = Cleaner::new()
        .tags(&["img", "em"])
        .attributes(&[("*", &["id"]), ("img", &["src"])]);
    assert_eq!(
        cleaner.clean("<img id=\"a\" src=\"x\"><em id=\"b\">ok</em>"),
        "<img id=\"a\" src=\"x\"><em id=\"b\">ok</em>",
    );
}

#[test]
fn kept_attributes_serialize_sorted() {
    assert_eq!(
        clean("<a title=\"t\" href=\"http://x.com\">x</a>"),
        "<a href=\"http://x.com\" title=\"t\">x</a>",
    );
}

#[test_case("<a href=\"javascript:alert('XSS')\">xss</a>", "<a>xss</a>"; "javascript")]
#[test_case("<a href=\"JAVASCRIPT:alert('XSS')\">xss</a>", "<a>xss</a>"; "javascript uppercase")]
#[test_case("<a href=\"data:text/html;base64,AA==\">x</a>", "<a>x</a>"; "data url")]
#[test_case("<a href=\"/path#frag\">x</a>", "<a href=\"/path#frag\">x</a>"; "relative kept")]
#[test_case(
    "<a href=\"mailto:me@x.com\">x</a>",
    "<a href=\"mailto:me@x.com\">x</a>";
    "mailto kept"
)]
#[test_case(
    "<a href=\"http://xx.com\">x</a>",
    "<a href=\"http://xx.com\">x</a>";
    "http kept"
)]
fn href_schemes_are_whitelisted(text: &str, expected: &str) {
    assert_eq!(clean(text), expected);
}

#[test]
fn allowed_styles_are_kept_and_reassembled() {
    let cleaner = Cleaner::new()
        .tags(&["i"])
        .attributes(&[("i", &["style"])])
        .styles(&["color"]);
    assert_eq!(
        cleaner.clean("<i style=\"color: red; float: left\">"),
        "<i style=\"color: red;\"></i>",
    );
}

#[test_case("color: expression(alert(1))"; "expression call")]
#[test_case("float: left"; "property not allowed")]
fn rejected_styles_drop_the_attribute(style: &str) {
    let cleaner = Cleaner::new()
        .tags(&["i"])
        .attributes(&[("i", &["style"])])
        .styles(&["color"]);
    assert_eq!(cleaner.clean(&format!("<i style=\"{style}\">x</i>")), "<i>x</i>");
}

#[test_case("an & entity", "an &amp; entity"; "ampersand")]
#[test_case("an < entity", "an &lt; entity"; "less than")]
#[test_case("tag < <em>and</em> entity", "tag &lt; <em>and</em> entity"; "mixed")]
fn bare_entities_are_escaped(text: &str, expected: &str) {
    assert_eq!(clean(text), expected);
}

#[test]
fn escaped_entities_stay_escaped() {
    assert_eq!(
        clean("&lt;em&gt;strong&lt;/em&gt;"),
        "&lt;em&gt;strong&lt;/em&gt;",
    );
}

#[test]
fn nonbreaking_space_survives() {
    assert_eq!(clean("&nbsp;"), "&nbsp;");
}

#[test]
fn whitelisted_table_roundtrips() {
    let cleaner = Cleaner::new().tags(&["table"]);
    assert_eq!(cleaner.clean("<table></table>"), "<table></table>");
}

#[test_case("a <script>b()</script> c")]
#[test_case("<em href=\"fail\">no link</em>")]
#[test_case("a test <em>with</em> <b>html</b> tags")]
#[test_case("&lt;em&gt;strong&lt;/em&gt;")]
#[test_case("<!-- comment -->text")]
fn cleaning_is_idempotent(text: &str) {
    let once = clean(text);
    assert_eq!(clean(&once), once);
}

struct Shout;

impl TokenFilter for Shout {
    fn process(&self, tokens: Vec<Token>) -> Vec<Token> {
        tokens
            .into_iter()
            .map(|token| match token {
                Token::Text(text) => Token::Text(text.to_uppercase()),
                other => other,
            })
            .collect()
    }
}

#[test]
fn filters_run_after_sanitizing() {
    let cleaner = Cleaner::new().filter(Box::new(Shout));
    assert_eq!(cleaner.clean("an <em>ok</em> tag"), "AN <em>OK</em> TAG");
}
