//! Keyword scoring tables.

/// An ordered table of candidates, each owning a set of keywords.
///
/// Declaration order is the tie-break: among equal scores the earliest entry
/// wins.
#[derive(Debug, Clone)]
pub struct KeywordTable<T> {
    entries: Vec<(T, Vec<String>)>,
}

impl<T> Default for KeywordTable<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> KeywordTable<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a candidate. Keywords are lower-cased, blank and repeated
    /// keywords are dropped.
    pub fn push<I, S>(&mut self, candidate: T, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !normalized.contains(&keyword) {
                normalized.push(keyword);
            }
        }
        self.entries.push((candidate, normalized));
    }

    /// Number of keywords of each candidate found in `text`
    /// (case-insensitive substring match), in declaration order.
    pub fn scores<'a>(&'a self, text: &str) -> impl Iterator<Item = (&'a T, usize)> + 'a {
        let haystack = text.to_lowercase();
        self.entries.iter().map(move |(candidate, keywords)| {
            let hits = keywords
                .iter()
                .filter(|keyword| haystack.contains(keyword.as_str()))
                .count();
            (candidate, hits)
        })
    }

    /// Candidate with the strictly highest non-zero score, if any.
    #[must_use]
    pub fn best_match(&self, text: &str) -> Option<(&T, usize)> {
        let mut best: Option<(&T, usize)> = None;
        for (candidate, hits) in self.scores(text) {
            if hits == 0 {
                continue;
            }
            match best {
                Some((_, top)) if top >= hits => {}
                _ => best = Some((candidate, hits)),
            }
        }
        best
    }
}
