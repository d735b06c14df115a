//! Near-duplicate detection across listing entries.
//!
//! A candidate is a duplicate of an accepted entry when their non-empty URLs
//! are equal, or when the similarity ratio of their titles is strictly
//! greater than the threshold. The ratio is the matching-block ratio of
//! Ratcliff/Obershelp:
//!
//! ```text
//! ratio = 2 * M / (len(a) + len(b))
//! ```
//!
//! where `M` is the number of characters covered by the recursively found
//! longest common blocks. Lengths count Unicode scalar values.

use crate::models::ListingEntry;
use std::collections::HashMap;
use tracing::debug;

/// Characters in `b` that occur more often than 1% of its length are
/// ignored as block seeds once `b` has at least this many characters.
const AUTOJUNK_MIN_LEN: usize = 200;

struct BlockMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> BlockMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }
        if b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b2j.retain(|_, js| js.len() <= limit);
        }
        Self { a, b, b2j }
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` inside the given ranges,
    /// earliest in `a` (then in `b`) on ties.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(js) = self.b2j.get(&self.a[i]) {
                for &j in js {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                    next.insert(j, k);
                    if k > best_k {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_k = k;
                    }
                }
            }
            j2len = next;
        }

        // Grow across characters dropped as popular seeds.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_k += 1;
        }
        while best_i + best_k < ahi && best_j + best_k < bhi && self.a[best_i + best_k] == self.b[best_j + best_k] {
            best_k += 1;
        }
        (best_i, best_j, best_k)
    }

    /// Total length of all matching blocks.
    fn matched_len(&self) -> usize {
        let mut total = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        total
    }
}

/// Similarity of two strings on a 0–1 scale. Two empty strings score 1.0.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = BlockMatcher::new(&a, &b).matched_len();
    2.0 * matched as f64 / total as f64
}

/// Whether `candidate` duplicates any entry in `accepted`.
///
/// URL equality wins outright. Title similarity is only consulted when both
/// titles are non-empty.
pub fn is_duplicate(candidate: &ListingEntry, accepted: &[ListingEntry], threshold: f64) -> bool {
    accepted.iter().any(|existing| {
        if !candidate.url.is_empty() && candidate.url == existing.url {
            return true;
        }
        !candidate.title.is_empty()
            && !existing.title.is_empty()
            && similarity_ratio(&existing.title, &candidate.title) > threshold
    })
}

/// Append-only list of accepted entries. First seen wins.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    threshold: f64,
    accepted: Vec<ListingEntry>,
}

impl Deduplicator {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            accepted: Vec::new(),
        }
    }

    pub fn is_duplicate(&self, candidate: &ListingEntry) -> bool {
        is_duplicate(candidate, &self.accepted, self.threshold)
    }

    /// Accept `candidate` unless it duplicates an earlier entry.
    /// Returns whether it was accepted.
    pub fn offer(&mut self, candidate: ListingEntry) -> bool {
        if self.is_duplicate(&candidate) {
            debug!(title = %candidate.title, url = %candidate.url, "Dropping near-duplicate");
            return false;
        }
        self.accepted.push(candidate);
        true
    }

    pub fn accepted(&self) -> &[ListingEntry] {
        &self.accepted
    }

    pub fn into_accepted(self) -> Vec<ListingEntry> {
        self.accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, url: &str) -> ListingEntry {
        ListingEntry::new("Economy", title.to_string(), url.to_string(), String::new(), String::new())
    }

    #[test]
    fn test_ratio_identical_and_disjoint() {
        assert_eq!(similarity_ratio("abc", "abc"), 1.0);
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_ratio_uses_recursive_blocks() {
        // "Fed raises " + "rates" = 16 matched of 16 + 25 chars.
        let r = similarity_ratio("Fed raises rates", "Fed raises interest rates");
        assert!((r - 32.0 / 41.0).abs() < 1e-9);
        // 16 matched of 16 + 22 chars.
        let r = similarity_ratio("Fed raises rates", "Fed raises rates again");
        assert!((r - 32.0 / 38.0).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_on_hangul_titles() {
        let r = similarity_ratio("한은, 기준금리 3.5% 동결", "한은, 기준금리 3.5% 동결…");
        assert!(r > 0.9);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // 4 matched of 5 + 5 chars: exactly 0.8.
        let a = entry("abcde", "https://a");
        let b = entry("abcdf", "https://b");
        assert!((similarity_ratio("abcde", "abcdf") - 0.8).abs() < 1e-9);
        assert!(!is_duplicate(&b, std::slice::from_ref(&a), 0.8));

        // 9 matched of 11 + 11 chars: about 0.818.
        let c = entry("abcdefghixy", "https://c");
        let d = entry("abcdefghizw", "https://d");
        assert!(is_duplicate(&d, std::slice::from_ref(&c), 0.8));
        assert!(!is_duplicate(&d, std::slice::from_ref(&c), 0.82));
    }

    #[test]
    fn test_url_equality_short_circuits_titles() {
        let a = entry("Fed raises rates", "https://example.com/u1");
        let b = entry("Completely unrelated story about tulips", "https://example.com/u1");
        assert!(is_duplicate(&b, &[a], 0.8));
    }

    #[test]
    fn test_empty_urls_never_match_each_other() {
        let a = entry("Markets open higher", "");
        let b = entry("Tulip prices collapse", "");
        assert!(!is_duplicate(&b, &[a], 0.8));
    }

    #[test]
    fn test_empty_titles_fall_back_to_url_only() {
        let a = entry("", "https://news.naver.com/article/015/1");
        let b = entry("", "https://news.naver.com/article/011/2");
        assert!(!is_duplicate(&b, std::slice::from_ref(&a), 0.8));
        let c = entry("", "https://news.naver.com/article/015/1");
        assert!(is_duplicate(&c, &[a], 0.8));
    }

    #[test]
    fn test_first_seen_wins() {
        let mut dedup = Deduplicator::new(0.8);
        assert!(dedup.offer(entry("Fed raises rates", "https://a")));
        assert!(!dedup.offer(entry("Fed raises rates again", "https://b")));
        assert_eq!(dedup.accepted().len(), 1);
        assert_eq!(dedup.accepted()[0].url, "https://a");
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let candidates = vec![
            entry("Fed raises rates", "https://a"),
            entry("Oil slides on supply glut", "https://b"),
            entry("Fed raises rates again", "https://c"),
            entry("Chipmakers lead Nasdaq gains", "https://d"),
        ];
        let mut dedup = Deduplicator::new(0.8);
        for c in candidates.clone() {
            dedup.offer(c);
        }
        let first_pass = dedup.accepted().to_vec();
        assert_eq!(first_pass.len(), 3);

        for c in candidates {
            assert!(!dedup.offer(c));
        }
        assert_eq!(dedup.into_accepted(), first_pass);
    }

    #[test]
    fn test_autojunk_long_strings_still_match() {
        let a = "x".repeat(150) + &"abc ".repeat(20);
        let r = similarity_ratio(&a, &a);
        assert!((r - 1.0).abs() < 1e-9);
    }
}
