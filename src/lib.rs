//! Namely - batch file renamer
//!
//! Computes new names for a list of files (and the files inside any listed
//! directories) using regex substitution, normalization, case changes,
//! extension replacement or a directory-based "special" mode, then renames
//! them.
//!
//! ```no_run
//! use namely::{CaseTransform, Outcome, Renamer, RuleConfig};
//!
//! let rule = RuleConfig::new()
//!     .with_regex(r"IMG(\d+)", r"photo-\#")?
//!     .with_case(CaseTransform::Lower);
//! let mut renamer = Renamer::new(rule)?;
//!
//! // Dry run: print what would happen
//! for outcome in renamer.build(["/var/photos"]) {
//!     if let Outcome::Renamed(pair) = outcome? {
//!         println!("{}", pair);
//!     }
//! }
//! # Ok::<(), namely::RenameError>(())
//! ```

pub mod config;
pub mod error;
pub mod expander;
pub mod path;
pub mod rules;

pub use config::Config;
pub use error::{RenameError, Result};
pub use expander::ArgQueue;
pub use rules::{
    Build, BuildSummary, CaseTransform, Normalizer, Outcome, RegexRule, RenamePair, Renamer,
    RuleConfig, Skip,
};
