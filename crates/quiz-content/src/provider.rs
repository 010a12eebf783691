use std::collections::HashSet;
use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::packs::{DictionaryEntry, DictionaryPack, Question, QuestionPack, RankingPack, RankingPrompt};

/// Read-only, concurrently-accessed source of randomised draws over one
/// locale's content packs. No I/O happens here; packs are loaded once at
/// startup by [`crate::ContentDir`].
pub trait ContentProvider: Send + Sync {
    /// Up to `n` category names not present in `exclude`, in random order.
    fn random_categories(&self, n: usize, exclude: &HashSet<String>) -> Vec<String>;

    /// A random question, optionally restricted to `category`, excluding
    /// ids already drawn this game.
    fn random_question(&self, category: Option<&str>, exclude_ids: &HashSet<String>) -> Option<Question>;

    /// A random dictionary entry (by index into the pack) not in `exclude`.
    fn random_dictionary_entry(&self, exclude: &HashSet<usize>) -> Option<(usize, DictionaryEntry)>;

    /// `count` distractor definitions drawn from entries other than `index`.
    fn distractor_definitions(&self, index: usize, count: usize) -> Vec<String>;

    /// A random ranking prompt not in `exclude`.
    fn random_ranking_prompt(&self, exclude: &HashSet<String>) -> Option<RankingPrompt>;
}

/// The production [`ContentProvider`]: one locale's packs held in memory,
/// drawn from with a process-seeded RNG guarded by a mutex (draws are rare
/// and brief, so a mutex is simpler than a lock-free structure here).
pub struct InMemoryContentProvider {
    questions: QuestionPack,
    dictionary: DictionaryPack,
    ranking: RankingPack,
    rng: Mutex<StdRng>,
}

impl InMemoryContentProvider {
    pub fn new(questions: QuestionPack, dictionary: DictionaryPack, ranking: RankingPack) -> Self {
        Self {
            questions,
            dictionary,
            ranking,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// A deterministic variant for tests: every draw is reproducible given
    /// the same seed and the same sequence of calls.
    pub fn with_seed(
        questions: QuestionPack,
        dictionary: DictionaryPack,
        ranking: RankingPack,
        seed: u64,
    ) -> Self {
        Self {
            questions,
            dictionary,
            ranking,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ContentProvider for InMemoryContentProvider {
    fn random_categories(&self, n: usize, exclude: &HashSet<String>) -> Vec<String> {
        let mut candidates: Vec<String> = self
            .questions
            .questions
            .iter()
            .map(|q| q.category.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .filter(|c| !exclude.contains(c))
            .collect();
        let mut rng = self.rng.lock().unwrap();
        candidates.shuffle(&mut *rng);
        candidates.truncate(n);
        candidates
    }

    fn random_question(&self, category: Option<&str>, exclude_ids: &HashSet<String>) -> Option<Question> {
        let candidates: Vec<&Question> = self
            .questions
            .questions
            .iter()
            .filter(|q| category.is_none_or(|c| q.category == c))
            .filter(|q| !exclude_ids.contains(&q.id))
            .collect();
        let mut rng = self.rng.lock().unwrap();
        candidates.choose(&mut *rng).map(|q| (*q).clone())
    }

    fn random_dictionary_entry(&self, exclude: &HashSet<usize>) -> Option<(usize, DictionaryEntry)> {
        let candidates: Vec<usize> = (0..self.dictionary.entries.len())
            .filter(|i| !exclude.contains(i))
            .collect();
        let mut rng = self.rng.lock().unwrap();
        candidates
            .choose(&mut *rng)
            .map(|&i| (i, self.dictionary.entries[i].clone()))
    }

    fn distractor_definitions(&self, index: usize, count: usize) -> Vec<String> {
        let mut others: Vec<String> = self
            .dictionary
            .entries
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, e)| e.definition.clone())
            .collect();
        let mut rng = self.rng.lock().unwrap();
        others.shuffle(&mut *rng);
        others.truncate(count);
        others
    }

    fn random_ranking_prompt(&self, exclude: &HashSet<String>) -> Option<RankingPrompt> {
        let candidates: Vec<&RankingPrompt> = self
            .ranking
            .prompts
            .iter()
            .filter(|p| !exclude.contains(&p.id))
            .collect();
        let mut rng = self.rng.lock().unwrap();
        candidates.choose(&mut *rng).map(|p| (*p).clone())
    }
}
