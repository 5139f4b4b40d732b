//! Phrase selection
//!
//! Hands out puzzles without repeats until the pool runs dry, then starts a
//! fresh session on its own. Selection is uniform, or weighted per category
//! when weights are set.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Bundled puzzle set
const BUILTIN_PHRASES: &str = include_str!("../data/phrases.json");

/// One puzzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseRecord {
    pub phrase: String,
    pub category: String,
}

impl PhraseRecord {
    pub fn new(phrase: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            category: category.into(),
        }
    }
}

/// A selected puzzle and its index in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedPhrase {
    pub record: PhraseRecord,
    pub index: usize,
}

/// Parse a JSON array of `{ "phrase", "category" }` objects
pub fn parse_phrases(json: &str) -> Result<Vec<PhraseRecord>, LoadError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_phrases(path: &Path) -> Result<Vec<PhraseRecord>, LoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_phrases(&json)
}

pub fn builtin_phrases() -> Result<Vec<PhraseRecord>, LoadError> {
    parse_phrases(BUILTIN_PHRASES)
}

/// Cumulative-weight draw. Non-finite or negative weights count as 0; a
/// non-positive total falls back to a uniform draw.
pub fn weighted_pick<R: Rng + ?Sized>(rng: &mut R, weights: &[f64]) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let clean = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
    let total: f64 = weights.iter().map(|&w| clean(w)).sum();
    if total <= 0.0 {
        return Some(rng.random_range(0..weights.len()));
    }

    let mut remainder = rng.random::<f64>() * total;
    for (i, &w) in weights.iter().enumerate() {
        remainder -= clean(w);
        if remainder <= 0.0 {
            return Some(i);
        }
    }
    // Rounding left a sliver past the end
    Some(weights.len() - 1)
}

/// Draw `min(count, items.len())` distinct items, each draw weighted, without
/// replacement
pub fn weighted_random_multiple<T, R, F>(
    rng: &mut R,
    items: &[T],
    count: usize,
    weight: F,
) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
    F: Fn(&T) -> f64,
{
    let mut pool: Vec<&T> = items.iter().collect();
    let take = count.min(pool.len());
    let mut picked = Vec::with_capacity(take);
    for _ in 0..take {
        let weights: Vec<f64> = pool.iter().map(|&item| weight(item)).collect();
        let Some(i) = weighted_pick(rng, &weights) else {
            break;
        };
        picked.push(pool.remove(i).clone());
    }
    picked
}

/// Session-scoped, non-repeating phrase picker
#[derive(Debug, Clone)]
pub struct PhraseSelector<R: Rng> {
    phrases: Vec<PhraseRecord>,
    used: BTreeSet<usize>,
    category_weights: HashMap<String, f64>,
    weighted: bool,
    rng: R,
}

impl<R: Rng> PhraseSelector<R> {
    pub fn new(phrases: Vec<PhraseRecord>, rng: R) -> Self {
        Self {
            phrases,
            used: BTreeSet::new(),
            category_weights: HashMap::new(),
            weighted: false,
            rng,
        }
    }

    pub fn phrases(&self) -> &[PhraseRecord] {
        &self.phrases
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Distinct categories in database order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for p in &self.phrases {
            if !seen.contains(&p.category.as_str()) {
                seen.push(&p.category);
            }
        }
        seen
    }

    fn matches(record: &PhraseRecord, category: Option<&str>) -> bool {
        category.is_none_or(|c| record.category.eq_ignore_ascii_case(c))
    }

    fn available(&self, category: Option<&str>) -> Vec<usize> {
        (0..self.phrases.len())
            .filter(|i| !self.used.contains(i))
            .filter(|&i| Self::matches(&self.phrases[i], category))
            .collect()
    }

    fn weight_of(&self, category: &str) -> f64 {
        self.category_weights
            .get(&category.to_ascii_lowercase())
            .copied()
            .unwrap_or(1.0)
    }

    /// Next unused phrase, optionally from one category
    ///
    /// When nothing is left but phrases have been used, the session resets
    /// once and the draw is retried. `None` means there is nothing to offer.
    pub fn get_random_phrase(&mut self, category: Option<&str>) -> Option<SelectedPhrase> {
        let mut candidates = self.available(category);
        if candidates.is_empty() && !self.used.is_empty() {
            log::info!(
                "phrase pool exhausted ({} used), starting a new session",
                self.used.len()
            );
            self.reset_session();
            candidates = self.available(category);
        }
        if candidates.is_empty() {
            log::warn!("no phrases available for category {:?}", category);
            return None;
        }

        let pick = if self.weighted {
            let weights: Vec<f64> = candidates
                .iter()
                .map(|&i| self.weight_of(&self.phrases[i].category))
                .collect();
            weighted_pick(&mut self.rng, &weights)?
        } else {
            self.rng.random_range(0..candidates.len())
        };

        let index = candidates[pick];
        self.used.insert(index);
        log::debug!(
            "selected phrase #{} [{}]",
            index,
            self.phrases[index].category
        );
        Some(SelectedPhrase {
            record: self.phrases[index].clone(),
            index,
        })
    }

    pub fn reset_session(&mut self) {
        self.used.clear();
    }

    /// Enable weighted-category mode with these weights (missing categories
    /// weigh 1). Category names match case-insensitively.
    pub fn set_category_weights(&mut self, weights: HashMap<String, f64>) {
        self.category_weights = weights
            .into_iter()
            .map(|(category, weight)| (category.to_ascii_lowercase(), weight))
            .collect();
        self.weighted = true;
    }

    /// Back to uniform selection
    pub fn clear_category_weights(&mut self) {
        self.category_weights.clear();
        self.weighted = false;
    }

    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    pub fn get_remaining_count(&self, category: Option<&str>) -> usize {
        self.available(category).len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.used.len() >= self.phrases.len()
    }

    /// Record a phrase as used. Returns false for an out-of-range index.
    pub fn mark_phrase_used(&mut self, index: usize) -> bool {
        if index >= self.phrases.len() {
            return false;
        }
        self.used.insert(index);
        true
    }

    pub fn is_used(&self, index: usize) -> bool {
        self.used.contains(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn db() -> Vec<PhraseRecord> {
        vec![
            PhraseRecord::new("Piece of Cake", "Phrase"),
            PhraseRecord::new("Break a Leg", "Phrase"),
            PhraseRecord::new("Giant Panda", "Animal"),
            PhraseRecord::new("Snow Leopard", "Animal"),
            PhraseRecord::new("Eiffel Tower", "Place"),
        ]
    }

    fn selector(seed: u64) -> PhraseSelector<Pcg32> {
        PhraseSelector::new(db(), Pcg32::seed_from_u64(seed))
    }

    #[test]
    fn test_builtin_phrases_parse() {
        let phrases = builtin_phrases().unwrap();
        assert!(phrases.len() >= 20);
        assert!(phrases.iter().any(|p| p.phrase == "Wrong Hole Buddy"));
    }

    #[test]
    fn test_no_repeats_until_exhausted() {
        let mut s = selector(1);
        let mut seen = BTreeSet::new();
        for _ in 0..5 {
            let pick = s.get_random_phrase(None).unwrap();
            assert!(seen.insert(pick.index), "repeated {}", pick.index);
        }
        assert!(s.is_exhausted());
        assert_eq!(s.get_remaining_count(None), 0);

        // Exhaustion triggers an automatic reset
        assert!(s.get_random_phrase(None).is_some());
        assert_eq!(s.get_remaining_count(None), 4);
    }

    #[test]
    fn test_category_filter() {
        let mut s = selector(2);
        for _ in 0..2 {
            let pick = s.get_random_phrase(Some("animal")).unwrap();
            assert_eq!(pick.record.category, "Animal");
        }
        assert_eq!(s.get_remaining_count(Some("Animal")), 0);
        assert_eq!(s.get_remaining_count(None), 3);
        // Category ran dry: the whole session resets and the draw succeeds
        assert!(s.get_random_phrase(Some("Animal")).is_some());
        assert_eq!(s.get_remaining_count(None), 4);
    }

    #[test]
    fn test_empty_sources_return_none() {
        let mut empty = PhraseSelector::new(Vec::new(), Pcg32::seed_from_u64(3));
        assert_eq!(empty.get_random_phrase(None), None);
        assert!(empty.is_exhausted());

        let mut s = selector(3);
        assert_eq!(s.get_random_phrase(Some("Sport")), None);
    }

    #[test]
    fn test_mark_and_reset() {
        let mut s = selector(4);
        assert!(s.mark_phrase_used(0));
        assert!(!s.mark_phrase_used(99));
        assert!(s.is_used(0));
        assert_eq!(s.get_remaining_count(Some("Phrase")), 1);
        s.reset_session();
        assert_eq!(s.get_remaining_count(None), 5);
    }

    #[test]
    fn test_weighted_mode_prefers_heavy_category() {
        let mut s = selector(5);
        let mut weights = HashMap::new();
        weights.insert("Phrase".to_string(), 0.0);
        weights.insert("Animal".to_string(), 0.0);
        weights.insert("Place".to_string(), 1.0);
        s.set_category_weights(weights);
        assert!(s.is_weighted());

        let pick = s.get_random_phrase(None).unwrap();
        assert_eq!(pick.record.category, "Place");

        // Only zero-weight candidates left: falls back to uniform
        assert!(s.get_random_phrase(None).is_some());

        s.clear_category_weights();
        assert!(!s.is_weighted());
    }

    #[test]
    fn test_category_weights_ignore_case() {
        let mut s = selector(9);
        let mut weights = HashMap::new();
        weights.insert("phrase".to_string(), 0.0);
        weights.insert("ANIMAL".to_string(), 0.0);
        s.set_category_weights(weights);
        for _ in 0..20 {
            s.reset_session();
            let pick = s.get_random_phrase(None).unwrap();
            assert_eq!(pick.record.category, "Place");
        }
    }

    /// Always draws zero
    struct ZeroRng;

    impl rand::RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    #[test]
    fn test_weighted_pick_stops_at_zero_remainder() {
        // A zero draw lands on the first entry, weighted or not
        assert_eq!(weighted_pick(&mut ZeroRng, &[0.0, 1.0]), Some(0));
        assert_eq!(weighted_pick(&mut ZeroRng, &[2.0, 1.0]), Some(0));
    }

    #[test]
    fn test_weighted_pick() {
        let mut rng = Pcg32::seed_from_u64(6);
        assert_eq!(weighted_pick(&mut rng, &[]), None);
        for _ in 0..100 {
            assert_eq!(weighted_pick(&mut rng, &[0.0, 5.0, 0.0]), Some(1));
            let i = weighted_pick(&mut rng, &[0.0, -1.0, f64::NAN]).unwrap();
            assert!(i < 3);
        }
    }

    #[test]
    fn test_weighted_random_multiple() {
        let mut rng = Pcg32::seed_from_u64(7);
        let items = ["a", "b", "c", "d"];
        let picked = weighted_random_multiple(&mut rng, &items, 3, |_| 1.0);
        assert_eq!(picked.len(), 3);
        let unique: BTreeSet<_> = picked.iter().collect();
        assert_eq!(unique.len(), 3);

        let all = weighted_random_multiple(&mut rng, &items, 10, |_| 1.0);
        assert_eq!(all.len(), 4);
        let none = weighted_random_multiple(&mut rng, &items, 0, |_| 1.0);
        assert!(none.is_empty());
    }

    #[test]
    fn test_categories() {
        assert_eq!(selector(8).categories(), vec!["Phrase", "Animal", "Place"]);
    }

    proptest! {
        #[test]
        fn prop_never_returns_used_index(
            seed in any::<u64>(),
            marks in proptest::collection::vec(0usize..5, 0..4)
        ) {
            let mut s = selector(seed);
            for &m in &marks {
                s.mark_phrase_used(m);
            }
            let remaining = s.get_remaining_count(None);
            for _ in 0..remaining {
                let before: Vec<usize> = (0..5).filter(|&i| s.is_used(i)).collect();
                let pick = s.get_random_phrase(None).unwrap();
                prop_assert!(!before.contains(&pick.index));
            }
        }
    }
}
