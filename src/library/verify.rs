// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::config::LibraryFile;

use super::probe_clips;

/// The name issues about the library as a whole are filed under.
pub const LIBRARY: &str = "(library)";

/// Severity level for a verification issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A single verification issue found during checking.
#[derive(Debug, Clone)]
pub struct Issue {
    pub severity: Severity,
    pub category: &'static str,
    pub clip_name: String,
    pub message: String,
}

/// Result of verifying a library file.
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    pub issues: Vec<Issue>,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// The number of issues at the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// Checks that a library file can be loaded and that every clip in it will
/// resolve to the file it names.
pub fn verify(library: &LibraryFile, audio_root: &Path) -> VerificationReport {
    let mut report = VerificationReport::default();

    if !library.is_populated() {
        report.issues.push(Issue {
            severity: Severity::Warning,
            category: "unpopulated",
            clip_name: LIBRARY.to_string(),
            message: "library has not been scanned".to_string(),
        });
    }

    let names = library.clip_names().len();
    let files = library.clip_files().len();
    if names != files {
        report.issues.push(Issue {
            severity: Severity::Error,
            category: "alignment",
            clip_name: LIBRARY.to_string(),
            message: format!("{} clip names but {} clip files", names, files),
        });
        return report;
    }

    report.issues.extend(check_duplicate_names(library));

    // Alignment was checked above, so probing can't fail as a whole.
    if let Ok(probed) = probe_clips(library, audio_root) {
        for clip in probed {
            if let Err(e) = clip.duration {
                report.issues.push(Issue {
                    severity: Severity::Error,
                    category: "probe",
                    clip_name: clip.name,
                    message: format!("unable to load {}: {}", clip.path.display(), e),
                });
            }
        }
    }

    report
}

/// Reports every name that appears more than once. Only the last file with a
/// given name can be played.
pub fn check_duplicate_names(library: &LibraryFile) -> Vec<Issue> {
    let mut seen: HashSet<&str> = HashSet::new();
    library
        .clip_names()
        .iter()
        .zip(library.clip_files())
        .filter(|&(name, _)| !seen.insert(name.as_str()))
        .map(|(name, file)| Issue {
            severity: Severity::Warning,
            category: "duplicate-name",
            clip_name: name.clone(),
            message: format!("\"{}\" shadows an earlier clip with the same name", file),
        })
        .collect()
}

/// Counts the distinct clips in the library that have no issues filed against
/// them. Library-wide issues don't count against any clip.
pub fn passed_clips(report: &VerificationReport, library: &LibraryFile) -> usize {
    let failed: HashSet<&str> = report
        .issues
        .iter()
        .map(|issue| issue.clip_name.as_str())
        .collect();
    library
        .clip_names()
        .iter()
        .map(String::as_str)
        .collect::<HashSet<&str>>()
        .into_iter()
        .filter(|name| !failed.contains(name))
        .count()
}

/// Prints a verification report, library-wide issues first and then grouped
/// by clip name.
pub fn print_report(report: &VerificationReport, library: &LibraryFile) {
    let passed = passed_clips(report, library);
    if report.is_clean() {
        println!("\u{2705} All {} clip(s) passed verification.", passed);
        return;
    }

    let mut by_clip: BTreeMap<&str, Vec<&Issue>> = BTreeMap::new();
    for issue in &report.issues {
        by_clip.entry(&issue.clip_name).or_default().push(issue);
    }

    let library_issues = by_clip.remove(LIBRARY);
    for (clip_name, issues) in library_issues
        .iter()
        .map(|issues| (LIBRARY, issues))
        .chain(by_clip.iter().map(|(name, issues)| (*name, issues)))
    {
        let icon = if issues.iter().any(|i| i.severity == Severity::Error) {
            "\u{274c}"
        } else {
            "\u{26a0}\u{fe0f} "
        };
        println!("{} {}", icon, clip_name);
        for issue in issues {
            let severity_icon = match issue.severity {
                Severity::Warning => "\u{26a0}\u{fe0f} ",
                Severity::Error => "\u{274c}",
            };
            println!("   {} [{}] {}", severity_icon, issue.category, issue.message);
        }
    }

    println!(
        "\nSummary: {} error(s), {} warning(s). {} of {} clip(s) passed, {} need attention.",
        report.count(Severity::Error),
        report.count(Severity::Warning),
        passed,
        passed + by_clip.len(),
        by_clip.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::write_audio_root;

    fn library(names: &[&str], files: &[&str]) -> LibraryFile {
        LibraryFile::new(
            vec!["sfx".to_string()],
            true,
            names.iter().map(|n| n.to_string()).collect(),
            files.iter().map(|f| f.to_string()).collect(),
        )
    }

    #[test]
    fn test_verify_clean_library() {
        let dir = tempfile::tempdir().unwrap();
        write_audio_root(dir.path()).unwrap();

        let report = verify(
            &library(&["Jump", "Coin"], &["sfx/Jump.wav", "sfx/Coin.wav"]),
            dir.path(),
        );
        assert!(report.is_clean());
        assert!(!report.has_errors());
    }

    #[test]
    fn test_verify_unreadable_clip() {
        let dir = tempfile::tempdir().unwrap();
        write_audio_root(dir.path()).unwrap();

        let report = verify(
            &library(
                &["Jump", "Readme", "Gone"],
                &["sfx/Jump.wav", "sfx/readme.txt", "sfx/Gone.wav"],
            ),
            dir.path(),
        );
        assert!(report.has_errors());
        let names: Vec<&str> = report.issues.iter().map(|i| i.clip_name.as_str()).collect();
        assert_eq!(names, vec!["Readme", "Gone"]);
        assert!(report.issues.iter().all(|i| i.category == "probe"));
    }

    #[test]
    fn test_verify_misaligned_library() {
        let report = verify(&library(&["Jump", "Coin"], &["sfx/Jump.wav"]), Path::new("/nowhere"));
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].category, "alignment");
        assert_eq!(report.issues[0].clip_name, LIBRARY);
        assert_eq!(report.issues[0].severity, Severity::Error);
    }

    #[test]
    fn test_verify_unpopulated_library() {
        let report = verify(
            &LibraryFile::new(vec!["sfx".to_string()], false, vec![], vec![]),
            Path::new("/nowhere"),
        );
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].category, "unpopulated");
        assert!(!report.has_errors());
    }

    #[test]
    fn test_duplicate_names() {
        let issues = check_duplicate_names(&library(
            &["Click", "Jump", "Click"],
            &["ui/Click.wav", "sfx/Jump.wav", "menu/Click.wav"],
        ));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].clip_name, "Click");
        assert!(issues[0].message.contains("menu/Click.wav"));
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_passed_clips() {
        let dir = tempfile::tempdir().unwrap();
        write_audio_root(dir.path()).unwrap();

        let shadowed = library(
            &["Jump", "Coin", "Gone", "Coin"],
            &["sfx/Jump.wav", "sfx/Coin.wav", "sfx/Gone.wav", "sfx/Coin.wav"],
        );
        let report = verify(&shadowed, dir.path());
        assert_eq!(report.count(Severity::Error), 1);
        assert_eq!(report.count(Severity::Warning), 1);
        // Coin is shadowed and Gone is missing, leaving only Jump.
        assert_eq!(passed_clips(&report, &shadowed), 1);

        let unscanned = LibraryFile::new(
            vec![],
            false,
            vec!["Jump".to_string()],
            vec!["sfx/Jump.wav".to_string()],
        );
        let report = verify(&unscanned, dir.path());
        assert_eq!(report.issues[0].clip_name, LIBRARY);
        assert_eq!(passed_clips(&report, &unscanned), 1);
    }
}
