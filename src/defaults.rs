//! Default whitelists and static tables used by [`Cleaner`](crate::Cleaner)
//! and [`Linker`](crate::Linker).

use phf::{phf_set, Set};

/// Tags kept by the default cleaner configuration.
pub const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "b", "blockquote", "code", "em", "i", "li", "ol", "strong", "ul",
];

/// Attributes kept per tag by the default cleaner configuration.
///
/// A `"*"` key in a user-supplied map whitelists the listed attributes on
/// every allowed tag.
pub const ALLOWED_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "title"]),
    ("abbr", &["title"]),
    ("acronym", &["title"]),
];

/// CSS properties kept in `style` attributes by default: none.
pub const ALLOWED_STYLES: &[&str] = &[];

/// URL schemes allowed in URL-valued attributes by default.
pub const ALLOWED_PROTOCOLS: &[&str] = &["http", "https", "mailto"];

/// Schemes the link matcher recognizes at the front of a URL.
pub const URL_SCHEMES: &[&str] = &[
    "ed2k", "ftp", "http", "https", "irc", "mailto", "news", "gopher", "nntp", "telnet",
    "webcal", "xmpp", "callto", "feed", "urn", "aim", "rsync", "tag", "ssh", "sftp", "rtsp",
    "afs", "data",
];

/// Top-level domains the link matcher accepts for scheme-less URLs.
///
/// Alphabetical here; the matcher feeds them to the pattern in reverse so
/// that `.com` does not get matched by `.co` first.
pub const TLDS: &[&str] = &[
    "ac", "ad", "ae", "aero", "af", "ag", "ai", "al", "am", "an", "ao", "aq", "ar", "arpa",
    "as", "asia", "at", "au", "aw", "ax", "az", "ba", "bb", "bd", "be", "bf", "bg", "bh", "bi",
    "biz", "bj", "bm", "bn", "bo", "br", "bs", "bt", "bv", "bw", "by", "bz", "ca", "cat", "cc",
    "cd", "cf", "cg", "ch", "ci", "ck", "cl", "cm", "cn", "co", "com", "coop", "cr", "cu",
    "cv", "cx", "cy", "cz", "de", "dj", "dk", "dm", "do", "dz", "ec", "edu", "ee", "eg", "er",
    "es", "et", "eu", "fi", "fj", "fk", "fm", "fo", "fr", "ga", "gb", "gd", "ge", "gf", "gg",
    "gh", "gi", "gl", "gm", "gn", "gov", "gp", "gq", "gr", "gs", "gt", "gu", "gw", "gy", "hk",
    "hm", "hn", "hr", "ht", "hu", "id", "ie", "il", "im", "in", "info", "int", "io", "iq",
    "ir", "is", "it", "je", "jm", "jo", "jobs", "jp", "ke", "kg", "kh", "ki", "km", "kn",
    "kp", "kr", "kw", "ky", "kz", "la", "lb", "lc", "li", "lk", "lr", "ls", "lt", "lu", "lv",
    "ly", "ma", "mc", "md", "me", "mg", "mh", "mil", "mk", "ml", "mm", "mn", "mo", "mobi",
    "mp", "mq", "mr", "ms", "mt", "mu", "museum", "mv", "mw", "mx", "my", "mz", "na", "name",
    "nc", "ne", "net", "nf", "ng", "ni", "nl", "no", "np", "nr", "nu", "nz", "om", "org",
    "pa", "pe", "pf", "pg", "ph", "pk", "pl", "pm", "pn", "post", "pr", "pro", "ps", "pt",
    "pw", "py", "qa", "re", "ro", "rs", "ru", "rw", "sa", "sb", "sc", "sd", "se", "sg", "sh",
    "si", "sj", "sk", "sl", "sm", "sn", "so", "sr", "ss", "st", "su", "sv", "sx", "sy", "sz",
    "tc", "td", "tel", "tf", "tg", "th", "tj", "tk", "tl", "tm", "tn", "to", "tp", "tr",
    "travel", "tt", "tv", "tw", "tz", "ua", "ug", "uk", "us", "uy", "uz", "va", "vc", "ve",
    "vg", "vi", "vn", "vu", "wf", "ws", "xn", "xxx", "ye", "yt", "yu", "za", "zm", "zw",
];

/// Attribute names whose values are URLs and get the scheme check.
pub(crate) static URI_ATTRIBUTES: Set<&'static str> = phf_set! {
    "action", "background", "cite", "datasrc", "dynsrc", "href", "longdesc", "lowsrc",
    "poster", "src",
};

/// Elements with no end tag.
pub(crate) static VOID_ELEMENTS: Set<&'static str> = phf_set! {
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img",
    "input", "keygen", "link", "menuitem", "meta", "param", "source", "track", "wbr",
};
