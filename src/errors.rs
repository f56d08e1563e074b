use thiserror::Error;

/// Failures that can occur while transforming a fragment.
///
/// These never escape the public API; `clean` and `linkify` log them and
/// fall back to best-effort output.
#[derive(Debug, Error)]
pub enum Error {
    /// The markup nests deeper than the walker is willing to follow.
    #[error("markup nests deeper than {0} elements")]
    DepthLimit(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
