// Deny-list of payment types left out of every total (cash by default).
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionFilter {
    // Stored case-folded
    excluded: BTreeSet<String>,
}

impl ExclusionFilter {
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let excluded = excluded
            .into_iter()
            .map(|s| s.as_ref().trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { excluded }
    }

    // Exact match after case folding, no partial matching.
    pub fn is_excluded(&self, payment_type: &str) -> bool {
        self.excluded.contains(&payment_type.trim().to_uppercase())
    }

    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::new(["DINHEIRO"])
    }
}
