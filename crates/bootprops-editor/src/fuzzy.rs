//! Ranking of completion candidates against the typed query.

use nucleo::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo::{Config, Matcher, Utf32Str};

/// How well a candidate matches, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    /// The candidate starts with the query.
    Prefix,
    /// One of the candidate's dotted segments starts with the query.
    SegmentPrefix,
    /// The query's characters appear in order in the candidate.
    Fuzzy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScore {
    pub tier: MatchTier,
    /// Higher is better. Comparable across tiers.
    pub score: f64,
}

/// Scores candidate names against one query. Matching ignores case.
pub struct QueryMatcher {
    query: String,
    matcher: Matcher,
    pattern: Pattern,
    buf: Vec<char>,
}

impl QueryMatcher {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_lowercase(),
            matcher: Matcher::new(Config::DEFAULT),
            pattern: Pattern::new(
                query,
                CaseMatching::Ignore,
                Normalization::Smart,
                AtomKind::Fuzzy,
            ),
            buf: Vec::new(),
        }
    }

    /// Score `candidate`, or `None` if it does not match at all.
    pub fn score(&mut self, candidate: &str) -> Option<MatchScore> {
        let lower = candidate.to_lowercase();
        if lower.starts_with(&self.query) {
            return Some(MatchScore {
                tier: MatchTier::Prefix,
                score: 3.0,
            });
        }
        if lower
            .split(['.', '-'])
            .any(|segment| segment.starts_with(&self.query))
        {
            return Some(MatchScore {
                tier: MatchTier::SegmentPrefix,
                score: 2.0,
            });
        }
        let haystack = Utf32Str::new(candidate, &mut self.buf);
        let raw = self.pattern.score(haystack, &mut self.matcher)?;
        Some(MatchScore {
            tier: MatchTier::Fuzzy,
            score: (f64::from(raw) / f64::from(u16::MAX)).sqrt().min(0.999),
        })
    }
}
