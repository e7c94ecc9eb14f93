// src/mutator.rs
use crate::utils::{deduplicate, sanitize};
use std::fmt;

/// Strings used to join mutation parts.
pub const DELIMITERS: [&str; 3] = ["-", ".", ""];

/// One normalized name to probe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Candidate(String);

impl Candidate {
    pub fn new(raw: &str) -> Self {
        Self(sanitize(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host name of the candidate under the storage domain.
    pub fn host(&self, domain: &str) -> String {
        format!("{}.{}", self.0, domain)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Candidate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Inputs of the candidate expansion. Empty lists behave as `[""]`.
#[derive(Debug, Clone, Default)]
pub struct MutationSpec {
    pub keywords: Vec<String>,
    pub words: Vec<String>,
    pub prefixes: Vec<String>,
    pub suffixes: Vec<String>,
}

impl MutationSpec {
    pub fn new(
        keywords: Vec<String>,
        words: Vec<String>,
        prefixes: Vec<String>,
        suffixes: Vec<String>,
    ) -> Self {
        Self {
            keywords,
            words,
            prefixes,
            suffixes,
        }
    }

    /// Number of candidates `NameMutator::expand` will emit, duplicates included.
    pub fn expected_len(&self) -> usize {
        let d = DELIMITERS.len();
        let w = non_empty(&self.words).len();
        let p = non_empty(&self.prefixes).len();
        let s = non_empty(&self.suffixes).len();

        self.keywords.len() * (1 + 2 * d * w + d * p + d * s + 3 * d * p * s)
    }
}

/// Sanitized, non-empty entries of a list.
fn non_empty(list: &[String]) -> Vec<String> {
    list.iter()
        .map(|entry| sanitize(entry))
        .filter(|entry| !entry.is_empty())
        .collect()
}

pub struct NameMutator<'a> {
    spec: &'a MutationSpec,
}

impl<'a> NameMutator<'a> {
    pub fn new(spec: &'a MutationSpec) -> Self {
        Self { spec }
    }

    /// Expand every keyword into its mutations, in generation order.
    pub fn expand(&self) -> Vec<Candidate> {
        let words = non_empty(&self.spec.words);
        let prefixes = non_empty(&self.spec.prefixes);
        let suffixes = non_empty(&self.spec.suffixes);

        let mut names = Vec::with_capacity(self.spec.expected_len());

        for keyword in &self.spec.keywords {
            let k = keyword.as_str();
            names.push(Candidate::new(k));

            for w in &words {
                for d in DELIMITERS {
                    names.push(Candidate::new(&format!("{k}{d}{w}")));
                    names.push(Candidate::new(&format!("{w}{d}{k}")));
                }
            }

            for p in &prefixes {
                for d in DELIMITERS {
                    names.push(Candidate::new(&format!("{p}{d}{k}")));
                }
            }

            for s in &suffixes {
                for d in DELIMITERS {
                    names.push(Candidate::new(&format!("{k}{d}{s}")));
                }
            }

            for p in &prefixes {
                for s in &suffixes {
                    for d in DELIMITERS {
                        names.push(Candidate::new(&format!("{p}{d}{k}{d}{s}")));
                        names.push(Candidate::new(&format!("{k}{d}{p}{d}{s}")));
                        names.push(Candidate::new(&format!("{p}{d}{s}{d}{k}")));
                    }
                }
            }
        }

        names
    }

    /// Expand and collapse to unique candidates. Returns the set and the
    /// number of duplicates removed.
    pub fn candidates(&self) -> (Vec<Candidate>, usize) {
        deduplicate(self.expand())
    }
}
