//! Whitelist-based HTML sanitizing and autolinking.
//!
//! The two entry points mirror each other: [`clean`] escapes or strips
//! markup that is not explicitly allowed, [`linkify`] wraps plain URLs
//! and email addresses in anchors. Both always return a string; broken
//! input is handled by the HTML parser, never reported as an error.
//!
//! ```
//! assert_eq!(
//!     lye::clean("an <script>evil()</script> example"),
//!     "an &lt;script&gt;evil()&lt;/script&gt; example",
//! );
//! ```
//!
//! ```
//! assert_eq!(
//!     lye::linkify("visit http://example.com now"),
//!     "visit <a href=\"http://example.com\" rel=\"nofollow\">http://example.com</a> now",
//! );
//! ```
//!
//! Reusable configurations live on [`Cleaner`] and [`Linker`].

pub mod callbacks;
pub mod defaults;
mod dom;
pub mod errors;
pub mod linkifier;
pub mod sanitizer;

pub use callbacks::{default_callbacks, nofollow, target_blank, Callback, LinkAttributes};
pub use dom::walker::Token;
pub use errors::Error;
pub use linkifier::Linker;
pub use sanitizer::{Cleaner, TokenFilter};

/// Sanitizes `text` with the default whitelists.
pub fn clean(text: &str) -> String {
    Cleaner::new().clean(text)
}

/// Links URLs in `text` with the default callback chain.
pub fn linkify(text: &str) -> String {
    Linker::new().linkify(text)
}
