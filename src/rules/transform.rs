//! Name transforms - normalization and case changes

use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::path::split_ext;

static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+").expect("invalid separator regex"));

/// Case change applied to the whole candidate name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseTransform {
    Upper,
    Lower,
    /// First character uppercased, the rest lowercased
    Capitalize,
}

impl CaseTransform {
    pub fn apply(self, name: &str) -> String {
        match self {
            CaseTransform::Upper => name.to_uppercase(),
            CaseTransform::Lower => name.to_lowercase(),
            CaseTransform::Capitalize => {
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                    None => String::new(),
                }
            }
        }
    }
}

/// Name normalization strategy
#[derive(Clone, Default)]
pub enum Normalizer {
    #[default]
    None,
    /// Dash-join the stem's word runs, see [`default_normalize`]
    Default,
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl Normalizer {
    /// Wrap a custom name transform
    pub fn custom(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Normalizer::Custom(Arc::new(f))
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Normalizer::None)
    }

    /// Apply the normalizer; `None` returns the name unchanged
    pub fn apply(&self, name: &str) -> String {
        match self {
            Normalizer::None => name.to_string(),
            Normalizer::Default => default_normalize(name),
            Normalizer::Custom(f) => f(name),
        }
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalizer::None => f.write_str("None"),
            Normalizer::Default => f.write_str("Default"),
            Normalizer::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Split the stem on runs of non-word characters and rejoin with `-`,
/// keeping the extension as is.
///
/// Leading or trailing separators leave an empty piece behind, so
/// `" a b"` becomes `"-a-b"`.
pub fn default_normalize(name: &str) -> String {
    let (stem, ext) = split_ext(name);
    let joined = SEPARATOR_RE.split(stem).collect::<Vec<_>>().join("-");
    joined + ext
}
