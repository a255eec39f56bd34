//! Naming rules - how an old file name becomes a new one

mod engine;
mod template;
mod transform;

pub use engine::{Build, BuildSummary, Outcome, RenamePair, Renamer, Skip};
pub use template::{COUNTER_TOKEN, PARENT_TOKEN, Template, replace_token};
pub use transform::{CaseTransform, Normalizer, default_normalize};

use regex::Regex;

use crate::error::Result;

/// Pattern used when the caller passes an empty one
const MATCH_EVERYTHING: &str = ".*";

/// A compiled pattern together with its replacement template
#[derive(Debug, Clone)]
pub struct RegexRule {
    pub pattern: Regex,
    pub template: Template,
}

impl RegexRule {
    /// Compile `pattern` and parse `replacement` against it.
    ///
    /// An empty pattern matches the whole name.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        let pattern = Regex::new(if pattern.is_empty() {
            MATCH_EVERYTHING
        } else {
            pattern
        })?;
        let template = Template::parse(replacement, &pattern)?;
        Ok(Self { pattern, template })
    }
}

/// Naming rule configuration, fixed for the lifetime of a [`Renamer`]
#[derive(Debug, Clone)]
pub struct RuleConfig {
    /// First counter value
    pub start: i64,

    /// Counter step after each successful rename
    pub increment: i64,

    /// Zero-pad width for the counter; 0 uses the number of arguments passed to `build`
    pub width: usize,

    /// Forced extension, always stored with its leading dot
    pub extension: Option<String>,

    pub case: Option<CaseTransform>,

    pub regex: Option<RegexRule>,

    pub normalize: Normalizer,

    /// Name every file after its parent directory plus the counter
    pub special: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            start: 1,
            increment: 1,
            width: 2,
            extension: None,
            case: None,
            regex: None,
            normalize: Normalizer::None,
            special: false,
        }
    }
}

impl RuleConfig {
    /// Create a configuration with default counter settings and no rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the output extension; the leading dot is optional
    pub fn with_extension(mut self, ext: &str) -> Self {
        self.extension = normalize_extension(ext);
        self
    }

    pub fn with_case(mut self, case: CaseTransform) -> Self {
        self.case = Some(case);
        self
    }

    /// Enable regex substitution
    pub fn with_regex(mut self, pattern: &str, replacement: &str) -> Result<Self> {
        self.regex = Some(RegexRule::new(pattern, replacement)?);
        Ok(self)
    }

    pub fn with_normalizer(mut self, normalize: Normalizer) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_special(mut self, special: bool) -> Self {
        self.special = special;
        self
    }

    /// Set counter start, step and pad width
    pub fn with_counter(mut self, start: i64, increment: i64, width: usize) -> Self {
        self.start = start;
        self.increment = increment;
        self.width = width;
        self
    }
}

fn normalize_extension(ext: &str) -> Option<String> {
    match ext {
        "" | "." => None,
        e if e.starts_with('.') => Some(e.to_string()),
        e => Some(format!(".{}", e)),
    }
}
