//! Rename engine - turns input paths into rename decisions and commits them

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::template::{COUNTER_TOKEN, PARENT_TOKEN, replace_token};
use super::{RuleConfig, default_normalize};
use crate::error::{RenameError, Result};
use crate::expander::ArgQueue;
use crate::path::{PathParts, entry_exists, same_file, split_ext};

/// A pending or completed rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePair {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl fmt::Display for RenamePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from.display(), self.to.display())
    }
}

/// Why a file was left alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// Special mode needs every file to sit inside a named directory
    NotADirectory { path: PathBuf },

    /// The computed name is the current name
    NoChange { path: PathBuf },

    /// Something else already lives at the new path
    DestinationExists { from: PathBuf, to: PathBuf },

    /// The file name is not UTF-8, or the rules produced an empty name
    InvalidName { path: PathBuf },
}

impl Skip {
    /// The input path that was skipped
    pub fn path(&self) -> &Path {
        match self {
            Skip::NotADirectory { path }
            | Skip::NoChange { path }
            | Skip::InvalidName { path } => path,
            Skip::DestinationExists { from, .. } => from,
        }
    }

    /// Short machine-friendly reason
    pub fn reason(&self) -> &'static str {
        match self {
            Skip::NotADirectory { .. } => "not-a-directory",
            Skip::NoChange { .. } => "no-op",
            Skip::DestinationExists { .. } => "destination-exists",
            Skip::InvalidName { .. } => "invalid-name",
        }
    }
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::NotADirectory { path } => {
                write!(f, "Skipped (not in a directory): {}", path.display())
            }
            Skip::NoChange { path } => write!(f, "Skipped (no change): {}", path.display()),
            Skip::DestinationExists { to, .. } => {
                write!(f, "Skipped (file exists): {}", to.display())
            }
            Skip::InvalidName { path } => write!(f, "Skipped (invalid name): {}", path.display()),
        }
    }
}

/// The decision for one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Renamed(RenamePair),
    Skipped(Skip),
}

/// Counts reported at the end of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildSummary {
    /// Files that produced a rename pair
    pub renamed: usize,

    /// Argument count after directory expansion
    pub total: usize,
}

/// Applies a [`RuleConfig`] to files, one at a time.
///
/// The counter lives on the renamer, so a second `build` carries on from
/// where the first stopped. Not meant to be shared between threads.
#[derive(Debug)]
pub struct Renamer {
    rule: RuleConfig,
    current_number: i64,
    width: usize,
    cwd_name: String,
}

impl Renamer {
    /// Create a renamer, capturing the current directory's name as the
    /// fallback parent name for bare file arguments
    pub fn new(rule: RuleConfig) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(RenameError::CurrentDir)?;
        let cwd_name = cwd
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::with_cwd_name(rule, cwd_name))
    }

    /// Create a renamer with an explicit fallback parent name
    pub fn with_cwd_name(rule: RuleConfig, cwd_name: impl Into<String>) -> Self {
        Self {
            current_number: rule.start,
            width: rule.width,
            rule,
            cwd_name: cwd_name.into(),
        }
    }

    /// Counter value the next successful rename will use
    pub fn current_number(&self) -> i64 {
        self.current_number
    }

    /// Lazily compute rename decisions for `paths`.
    ///
    /// Nothing on disk changes while iterating; feed the pairs to
    /// [`Renamer::rename`] to commit them.
    pub fn build<I, P>(&mut self, paths: I) -> Build<'_>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let queue = ArgQueue::new(paths);
        self.width = if self.rule.width == 0 {
            queue.top_level()
        } else {
            self.rule.width
        };

        Build {
            renamer: self,
            queue,
            renamed: 0,
            done: false,
        }
    }

    /// Perform each rename in order, stopping at the first error.
    ///
    /// Renames already done before a failure stay done.
    pub fn rename<I>(pairs: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<RenamePair>>,
    {
        let mut count = 0;
        for pair in pairs {
            let pair = pair?;
            info!("Renaming {}", pair);
            std::fs::rename(&pair.from, &pair.to).map_err(|source| RenameError::Rename {
                from: pair.from.clone(),
                to: pair.to.clone(),
                source,
            })?;
            count += 1;
        }
        Ok(count)
    }

    /// Build and commit in one go; returns the number of files renamed
    pub fn execute<I, P>(&mut self, paths: I) -> Result<usize>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut build = self.build(paths);
        Self::rename(build.pairs())
    }

    fn decide(&mut self, path: PathBuf) -> Result<Outcome> {
        let Some(parts) = PathParts::new(&path) else {
            return Ok(Outcome::Skipped(Skip::InvalidName { path }));
        };

        let parent = match (&parts.parent_name, self.rule.special) {
            (Some(name), _) => name.as_str(),
            (None, true) => return Ok(Outcome::Skipped(Skip::NotADirectory { path })),
            (None, false) => self.cwd_name.as_str(),
        };

        let counter = format!("{:0width$}", self.current_number, width = self.width);
        let name = if self.rule.special {
            special_name(parent, &parts.file_name, &counter)
        } else {
            self.candidate_name(&parts.file_name, parent, &counter)
        };

        if name.is_empty() {
            return Ok(Outcome::Skipped(Skip::InvalidName { path }));
        }

        let new_path = parts.with_file_name(&name);
        if new_path == path {
            return Ok(Outcome::Skipped(Skip::NoChange { path }));
        }
        if entry_exists(&new_path) && !same_file(&path, &new_path) {
            return Ok(Outcome::Skipped(Skip::DestinationExists {
                from: path,
                to: new_path,
            }));
        }

        self.current_number = self
            .current_number
            .checked_add(self.rule.increment)
            .ok_or(RenameError::CounterOverflow {
                value: self.current_number,
                increment: self.rule.increment,
            })?;
        Ok(Outcome::Renamed(RenamePair {
            from: path,
            to: new_path,
        }))
    }

    /// Run the regex, normalize, case and extension stages in that order
    fn candidate_name(&self, file_name: &str, parent: &str, counter: &str) -> String {
        let mut name = file_name.to_string();

        if let Some(regex) = &self.rule.regex {
            if regex.pattern.is_match(&name) {
                debug!("Regex matched: {}", name);
                let replaced = regex.template.replace_all(&regex.pattern, &name);
                let replaced = replace_token(&replaced, PARENT_TOKEN, parent);
                name = replace_token(&replaced, COUNTER_TOKEN, counter);
            } else {
                debug!("No regex match: {}", name);
            }
        }

        if self.rule.normalize.is_enabled() {
            name = self.rule.normalize.apply(&name);
        }

        if let Some(case) = self.rule.case {
            name = case.apply(&name);
        }

        if let Some(ext) = &self.rule.extension {
            let (stem, _) = split_ext(&name);
            name = format!("{}{}", stem, ext);
        }

        name
    }
}

/// `<normalized-lowercased-parent>-<counter><lowercased-ext>`
fn special_name(parent: &str, file_name: &str, counter: &str) -> String {
    let (_, ext) = split_ext(file_name);
    format!(
        "{}-{}{}",
        default_normalize(parent).to_lowercase(),
        counter,
        ext.to_lowercase()
    )
}

/// Lazy sequence of decisions produced by [`Renamer::build`]
pub struct Build<'a> {
    renamer: &'a mut Renamer,
    queue: ArgQueue,
    renamed: usize,
    done: bool,
}

impl<'a> Build<'a> {
    /// Only the rename pairs, with skips dropped.
    ///
    /// Borrows the build, so [`Build::summary`] is still available after.
    pub fn pairs(&mut self) -> impl Iterator<Item = Result<RenamePair>> {
        self.by_ref().filter_map(|outcome| match outcome {
            Ok(Outcome::Renamed(pair)) => Some(Ok(pair)),
            Ok(Outcome::Skipped(_)) => None,
            Err(e) => Some(Err(e)),
        })
    }

    /// Counts so far; final once the sequence is exhausted
    pub fn summary(&self) -> BuildSummary {
        BuildSummary {
            renamed: self.renamed,
            total: self.queue.total(),
        }
    }
}

impl Iterator for Build<'_> {
    type Item = Result<Outcome>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.queue.next_file() {
            Ok(Some(path)) => match self.renamer.decide(path) {
                Ok(outcome) => {
                    match &outcome {
                        Outcome::Renamed(_) => self.renamed += 1,
                        Outcome::Skipped(skip) => debug!("{}", skip),
                    }
                    Some(Ok(outcome))
                }
                Err(e) => {
                    self.done = true;
                    Some(Err(e))
                }
            },
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{CaseTransform, Normalizer};
    use assert_fs::prelude::*;
    use predicates::prelude::*;

    fn names(outcomes: &[Outcome]) -> Vec<String> {
        outcomes
            .iter()
            .filter_map(|o| match o {
                Outcome::Renamed(pair) => Some(
                    pair.to
                        .file_name()
                        .unwrap()
                        .to_string_lossy()
                        .into_owned(),
                ),
                Outcome::Skipped(_) => None,
            })
            .collect()
    }

    fn run(renamer: &mut Renamer, paths: &[PathBuf]) -> Vec<Outcome> {
        renamer
            .build(paths.iter().cloned())
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    fn photos() -> assert_fs::TempDir {
        let temp = assert_fs::TempDir::new().unwrap();
        for name in [
            "FOO123.JPG",
            "IMG1010.JPG",
            "IMG1011.JPG",
            "IMG1012.JPG",
            "IMG_XYZ.JPG",
        ] {
            temp.child(name).touch().unwrap();
        }
        temp
    }

    #[test]
    fn test_regex_with_counter() {
        let temp = photos();
        let rule = RuleConfig::new()
            .with_regex(r"IMG(\d\d)(\d+).*", r"foo-\2-\#.jpg")
            .unwrap()
            .with_counter(7, 2, 3);
        let mut renamer = Renamer::with_cwd_name(rule, "cwd");

        let paths: Vec<PathBuf> = ["IMG1010.JPG", "IMG1011.JPG", "IMG1012.JPG"]
            .iter()
            .map(|n| temp.path().join(n))
            .collect();
        let outcomes = run(&mut renamer, &paths);

        assert_eq!(
            names(&outcomes),
            vec!["foo-10-007.jpg", "foo-11-009.jpg", "foo-12-011.jpg"]
        );
        assert_eq!(renamer.current_number(), 13);
    }

    #[test]
    fn test_lower_transform() {
        let temp = photos();
        let rule = RuleConfig::new().with_case(CaseTransform::Lower);
        let mut renamer = Renamer::with_cwd_name(rule, "cwd");

        let paths = vec![temp.path().join("FOO123.JPG"), temp.path().join("IMG1010.JPG")];
        let outcomes = run(&mut renamer, &paths);

        assert_eq!(names(&outcomes), vec!["foo123.jpg", "img1010.jpg"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_special_mode_names_after_directory() {
        let temp = assert_fs::TempDir::new().unwrap();
        for name in ["P1000354.JPG", "P1000355.JPG", "P1000357.JPG"] {
            temp.child("Sailing 5:12").child(name).touch().unwrap();
        }

        let rule = RuleConfig::new().with_special(true).with_counter(1, 1, 3);
        let mut renamer = Renamer::with_cwd_name(rule, "cwd");
        let outcomes = run(&mut renamer, &[temp.path().join("Sailing 5:12")]);

        assert_eq!(
            names(&outcomes),
            vec![
                "sailing-5-12-001.jpg",
                "sailing-5-12-002.jpg",
                "sailing-5-12-003.jpg"
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_match_everything_with_parent_token() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("Sailing 5:12/P1000354.JPG").touch().unwrap();
        temp.child("Sailing 5:12/P1000355.JPG").touch().unwrap();

        let rule = RuleConfig::new()
            .with_regex("", r"\@-\#.jpg")
            .unwrap()
            .with_normalizer(Normalizer::Default)
            .with_case(CaseTransform::Lower)
            .with_counter(1, 1, 3);
        let mut renamer = Renamer::with_cwd_name(rule, "cwd");
        let outcomes = run(&mut renamer, &[temp.path().join("Sailing 5:12")]);

        assert_eq!(
            names(&outcomes),
            vec!["sailing-5-12-001.jpg", "sailing-5-12-002.jpg"]
        );
    }

    #[test]
    fn test_special_mode_rejects_bare_names() {
        let rule = RuleConfig::new().with_special(true);
        let mut renamer = Renamer::with_cwd_name(rule, "cwd");
        let outcomes = run(&mut renamer, &[PathBuf::from("loose.jpg")]);

        assert_eq!(
            outcomes,
            vec![Outcome::Skipped(Skip::NotADirectory {
                path: PathBuf::from("loose.jpg")
            })]
        );
        assert_eq!(renamer.current_number(), 1);
    }

    #[test]
    fn test_bare_name_uses_cwd_name() {
        let rule = RuleConfig::new()
            .with_regex("(.*)", r"\@_\1")
            .unwrap();
        let mut renamer = Renamer::with_cwd_name(rule, "holiday");
        let outcomes = run(&mut renamer, &[PathBuf::from("does-not-exist.txt")]);

        assert_eq!(
            outcomes,
            vec![Outcome::Renamed(RenamePair {
                from: PathBuf::from("does-not-exist.txt"),
                to: PathBuf::from("holiday_does-not-exist.txt"),
            })]
        );
    }

    #[test]
    fn test_no_rules_means_no_change() {
        let temp = photos();
        let mut renamer = Renamer::with_cwd_name(RuleConfig::new(), "cwd");
        let paths = vec![temp.path().join("FOO123.JPG"), temp.path().join("IMG_XYZ.JPG")];
        let mut build = renamer.build(paths.clone());
        let outcomes: Vec<Outcome> = build.by_ref().collect::<Result<_>>().unwrap();

        for (outcome, path) in outcomes.iter().zip(&paths) {
            assert_eq!(
                outcome,
                &Outcome::Skipped(Skip::NoChange { path: path.clone() })
            );
        }
        assert_eq!(
            build.summary(),
            BuildSummary {
                renamed: 0,
                total: 2
            }
        );
    }

    #[test]
    fn test_skips_do_not_advance_counter() {
        let temp = assert_fs::TempDir::new().unwrap();
        for name in ["IMG1.jpg", "other.jpg", "IMG2.jpg"] {
            temp.child(name).touch().unwrap();
        }

        let rule = RuleConfig::new()
            .with_regex(r"IMG\d+", r"pic-\#")
            .unwrap()
            .with_counter(1, 5, 2);
        let mut renamer = Renamer::with_cwd_name(rule, "cwd");
        let paths: Vec<PathBuf> = ["IMG1.jpg", "other.jpg", "IMG2.jpg"]
            .iter()
            .map(|n| temp.path().join(n))
            .collect();
        let outcomes = run(&mut renamer, &paths);

        assert_eq!(names(&outcomes), vec!["pic-01.jpg", "pic-06.jpg"]);
        assert_eq!(
            outcomes[1],
            Outcome::Skipped(Skip::NoChange {
                path: paths[1].clone()
            })
        );
        assert_eq!(renamer.current_number(), 11);
    }

    #[test]
    fn test_existing_destination_skipped() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("old.txt").write_str("old").unwrap();
        temp.child("new.txt").write_str("new").unwrap();

        let rule = RuleConfig::new().with_regex("old", "new").unwrap();
        let mut renamer = Renamer::with_cwd_name(rule, "cwd");
        let renamed = renamer.execute([temp.path().join("old.txt")]).unwrap();

        assert_eq!(renamed, 0);
        temp.child("old.txt").assert("old");
        temp.child("new.txt").assert("new");
    }

    #[cfg(unix)]
    #[test]
    fn test_same_file_destination_not_a_collision() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.txt").write_str("a").unwrap();
        std::fs::hard_link(temp.path().join("a.txt"), temp.path().join("b.txt")).unwrap();

        let rule = RuleConfig::new().with_regex("a", "b").unwrap();
        let mut renamer = Renamer::with_cwd_name(rule, "cwd");
        let outcomes = run(&mut renamer, &[temp.path().join("a.txt")]);

        assert_eq!(names(&outcomes), vec!["b.txt"]);
    }

    #[test]
    fn test_auto_width_uses_top_level_count() {
        let temp = assert_fs::TempDir::new().unwrap();
        for i in 0..5 {
            temp.child(format!("dir/f{}.txt", i)).touch().unwrap();
        }
        temp.child("x.txt").touch().unwrap();
        temp.child("y.txt").touch().unwrap();

        let rule = RuleConfig::new()
            .with_regex(r"^\w+", r"n\#")
            .unwrap()
            .with_counter(1, 1, 0);
        let mut renamer = Renamer::with_cwd_name(rule, "cwd");
        let paths = vec![
            temp.path().join("dir"),
            temp.path().join("x.txt"),
            temp.path().join("y.txt"),
        ];
        let mut build = renamer.build(paths);
        let outcomes: Vec<Outcome> = build.by_ref().collect::<Result<_>>().unwrap();

        assert_eq!(
            names(&outcomes),
            vec![
                "n001.txt", "n002.txt", "n003.txt", "n004.txt", "n005.txt", "n006.txt",
                "n007.txt"
            ]
        );
        assert_eq!(
            build.summary(),
            BuildSummary {
                renamed: 7,
                total: 7
            }
        );
    }

    #[test]
    fn test_forced_extension_after_normalize() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("my photo.jpeg").touch().unwrap();

        let rule = RuleConfig::new()
            .with_normalizer(Normalizer::Default)
            .with_case(CaseTransform::Capitalize)
            .with_extension("jpg");
        let mut renamer = Renamer::with_cwd_name(rule, "cwd");
        let outcomes = run(&mut renamer, &[temp.path().join("my photo.jpeg")]);

        assert_eq!(names(&outcomes), vec!["My-photo.jpg"]);
    }

    #[test]
    fn test_custom_normalizer() {
        let rule = RuleConfig::new().with_normalizer(Normalizer::custom(|n| n.replace('-', "_")));
        let mut renamer = Renamer::with_cwd_name(rule, "cwd");
        let outcomes = run(&mut renamer, &[PathBuf::from("some-file-name.txt")]);

        assert_eq!(names(&outcomes), vec!["some_file_name.txt"]);
    }

    #[test]
    fn test_dry_run_leaves_files_alone() {
        let temp = photos();
        let rule = RuleConfig::new().with_case(CaseTransform::Lower);
        let mut renamer = Renamer::with_cwd_name(rule, "cwd");

        let pairs: Vec<RenamePair> = renamer
            .build([temp.path().to_path_buf()])
            .pairs()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(pairs.len(), 5);
        temp.child("IMG1010.JPG").assert(predicate::path::exists());
        temp.child("img1010.jpg").assert(predicate::path::missing());
    }

    #[test]
    fn test_execute_commits_in_order() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("x.txt").write_str("x").unwrap();
        temp.child("y.txt").write_str("y").unwrap();

        // Both map to the same name; the second sees the first on disk
        let rule = RuleConfig::new().with_regex(r"^\w\.", "same.").unwrap();
        let mut renamer = Renamer::with_cwd_name(rule, "cwd");
        let renamed = renamer
            .execute([temp.path().join("x.txt"), temp.path().join("y.txt")])
            .unwrap();

        assert_eq!(renamed, 1);
        temp.child("same.txt").assert("x");
        temp.child("y.txt").assert("y");
        temp.child("x.txt").assert(predicate::path::missing());
    }

    #[test]
    fn test_second_build_continues_counter() {
        let rule = RuleConfig::new()
            .with_regex(r"^(\w+)", r"\1-\#")
            .unwrap();
        let mut renamer = Renamer::with_cwd_name(rule, "cwd");

        let first = run(&mut renamer, &[PathBuf::from("a.txt")]);
        let second = run(&mut renamer, &[PathBuf::from("b.txt")]);

        assert_eq!(names(&first), vec!["a-01.txt"]);
        assert_eq!(names(&second), vec!["b-02.txt"]);
    }

    #[test]
    fn test_escaped_counter_token_stays_literal() {
        let rule = RuleConfig::new()
            .with_regex(r"^(\w+)", r"\1-\\#")
            .unwrap();
        let mut renamer = Renamer::with_cwd_name(rule, "cwd");
        let outcomes = run(&mut renamer, &[PathBuf::from("d/a.txt")]);

        assert_eq!(
            outcomes,
            vec![Outcome::Renamed(RenamePair {
                from: PathBuf::from("d/a.txt"),
                to: PathBuf::from(r"d/a-\#.txt"),
            })]
        );
        assert_eq!(renamer.current_number(), 2);
    }

    #[test]
    fn test_counter_overflow_is_an_error() {
        let rule = RuleConfig::new()
            .with_regex(r"^(\w+)", r"\1-\#")
            .unwrap()
            .with_counter(i64::MAX, 1, 2);
        let mut renamer = Renamer::with_cwd_name(rule, "cwd");
        let mut build = renamer.build([PathBuf::from("a.txt"), PathBuf::from("b.txt")]);

        let err = build.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            RenameError::CounterOverflow {
                value: i64::MAX,
                increment: 1
            }
        ));
        assert!(build.next().is_none());
        assert_eq!(build.summary().renamed, 0);
    }

    #[test]
    fn test_rename_stops_at_first_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("ok.txt").touch().unwrap();

        let pairs = vec![
            Ok(RenamePair {
                from: temp.path().join("missing.txt"),
                to: temp.path().join("never.txt"),
            }),
            Ok(RenamePair {
                from: temp.path().join("ok.txt"),
                to: temp.path().join("done.txt"),
            }),
        ];
        let err = Renamer::rename(pairs).unwrap_err();

        assert!(matches!(err, RenameError::Rename { .. }));
        assert!(!err.is_usage());
        temp.child("ok.txt").assert(predicate::path::exists());
    }

    #[test]
    fn test_skip_reasons() {
        let skip = Skip::DestinationExists {
            from: PathBuf::from("a"),
            to: PathBuf::from("b"),
        };
        assert_eq!(skip.reason(), "destination-exists");
        assert_eq!(skip.path(), Path::new("a"));
        assert_eq!(skip.to_string(), "Skipped (file exists): b");
    }
}
