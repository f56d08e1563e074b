//! Callbacks that adjust or veto links as the linkifier finds them.
//!
//! Each callback receives the candidate's [`LinkAttributes`] and a flag
//! telling it whether the link is being created right now or already
//! existed in the input. Returning `None` vetoes the link; returning a
//! (possibly modified) set lets the chain continue.

/// Attribute map of a candidate link, plus the text it will display.
///
/// Insertion order is preserved so callbacks see attributes the way the
/// anchor carried them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinkAttributes {
    attrs: Vec<(String, String)>,
    /// Text content the anchor will carry.
    pub text: String,
}

impl LinkAttributes {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            attrs: Vec::new(),
            text: text.into(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets `name`, replacing an existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.attrs.iter().position(|(k, _)| k == name)?;
        Some(self.attrs.remove(index).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Decides the fate of one candidate link.
pub type Callback = Box<dyn Fn(LinkAttributes, bool) -> Option<LinkAttributes> + Send + Sync>;

/// The default chain: just [`nofollow`].
pub fn default_callbacks() -> Vec<Callback> {
    vec![Box::new(nofollow)]
}

/// Runs `attrs` through the chain, stopping at the first veto.
pub(crate) fn apply_callbacks(
    callbacks: &[Callback],
    mut attrs: LinkAttributes,
    is_new: bool,
) -> Option<LinkAttributes> {
    for callback in callbacks {
        attrs = callback(attrs, is_new)?;
    }
    Some(attrs)
}

fn is_mailto(attrs: &LinkAttributes) -> bool {
    attrs
        .get("href")
        .is_some_and(|href| href.starts_with("mailto:"))
}

/// Merges a `nofollow` token into `rel` on non-mailto links.
pub fn nofollow(mut attrs: LinkAttributes, _is_new: bool) -> Option<LinkAttributes> {
    if is_mailto(&attrs) {
        return Some(attrs);
    }
    let mut rel: Vec<String> = attrs
        .get("rel")
        .unwrap_or_default()
        .split_ascii_whitespace()
        .map(str::to_owned)
        .collect();
    if !rel.iter().any(|token| token.eq_ignore_ascii_case("nofollow")) {
        rel.push("nofollow".to_owned());
    }
    attrs.set("rel", rel.join(" "));
    Some(attrs)
}

/// Forces `target="_blank"` on non-mailto links.
pub fn target_blank(mut attrs: LinkAttributes, _is_new: bool) -> Option<LinkAttributes> {
    if is_mailto(&attrs) {
        return Some(attrs);
    }
    attrs.set("target", "_blank");
    Some(attrs)
}
