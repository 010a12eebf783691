use std::collections::HashSet;

use crate::packs::{DictionaryPack, QuestionPack, RankingPack};

/// Minimum number of dictionary entries needed so every word has 3 distinct
/// distractor definitions drawn from the rest of the pack.
pub const MIN_DICTIONARY_ENTRIES: usize = 4;

pub fn validate_question_pack(pack: &QuestionPack) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen_ids = HashSet::new();

    if pack.questions.is_empty() {
        problems.push("pack contains no questions".to_string());
    }

    for (idx, q) in pack.questions.iter().enumerate() {
        let label = format!("questions[{idx}] (id={})", q.id);

        if !seen_ids.insert(q.id.clone()) {
            problems.push(format!("{label}: duplicate question id"));
        }
        if q.text.trim().is_empty() {
            problems.push(format!("{label}: text must not be empty"));
        }
        if !(1..=5).contains(&q.difficulty) {
            problems.push(format!(
                "{label}: difficulty {} out of range [1,5]",
                q.difficulty
            ));
        }
        if q.options.len() != 4 {
            problems.push(format!(
                "{label}: expected exactly 4 options, found {}",
                q.options.len()
            ));
        }
        let mut option_keys = HashSet::new();
        for opt in &q.options {
            if !option_keys.insert(opt.key.clone()) {
                problems.push(format!("{label}: duplicate option key '{}'", opt.key));
            }
        }
        if !option_keys.contains(&q.correct_option_key) {
            problems.push(format!(
                "{label}: correctOptionKey '{}' matches no option",
                q.correct_option_key
            ));
        }
        if q.category.trim().is_empty() {
            problems.push(format!("{label}: category must not be empty"));
        }
    }

    problems
}

pub fn validate_dictionary_pack(pack: &DictionaryPack) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen_words = HashSet::new();

    if pack.entries.len() < MIN_DICTIONARY_ENTRIES {
        problems.push(format!(
            "pack contains {} entries, at least {MIN_DICTIONARY_ENTRIES} required for distractors",
            pack.entries.len()
        ));
    }

    for (idx, entry) in pack.entries.iter().enumerate() {
        let label = format!("entries[{idx}] (word={})", entry.word);
        if entry.word.trim().is_empty() {
            problems.push(format!("{label}: word must not be empty"));
        }
        if entry.definition.trim().is_empty() {
            problems.push(format!("{label}: definition must not be empty"));
        }
        if !seen_words.insert(entry.word.to_ascii_lowercase()) {
            problems.push(format!("{label}: duplicate word"));
        }
    }

    problems
}

pub fn validate_ranking_pack(pack: &RankingPack) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen_ids = HashSet::new();

    if pack.prompts.is_empty() {
        problems.push("pack contains no prompts".to_string());
    }

    for (idx, p) in pack.prompts.iter().enumerate() {
        let label = format!("prompts[{idx}] (id={})", p.id);
        if !seen_ids.insert(p.id.clone()) {
            problems.push(format!("{label}: duplicate prompt id"));
        }
        if p.prompt.trim().is_empty() {
            problems.push(format!("{label}: prompt text must not be empty"));
        }
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packs::{DictionaryEntry, Question, QuestionOption};

    fn valid_question() -> Question {
        Question {
            id: "q1".into(),
            text: "What is 2+2?".into(),
            difficulty: 1,
            options: vec![
                QuestionOption { key: "A".into(), text: "3".into() },
                QuestionOption { key: "B".into(), text: "4".into() },
                QuestionOption { key: "C".into(), text: "5".into() },
                QuestionOption { key: "D".into(), text: "6".into() },
            ],
            correct_option_key: "B".into(),
            explanation: None,
            tags: vec![],
            category: "math".into(),
        }
    }

    #[test]
    fn test_validate_question_pack_accepts_well_formed_pack() {
        let pack = QuestionPack {
            schema_version: 1,
            pack_id: "p".into(),
            title: "t".into(),
            locale: "en".into(),
            tags: vec![],
            questions: vec![valid_question()],
        };
        assert!(validate_question_pack(&pack).is_empty());
    }

    #[test]
    fn test_validate_question_pack_rejects_duplicate_ids() {
        let pack = QuestionPack {
            schema_version: 1,
            pack_id: "p".into(),
            title: "t".into(),
            locale: "en".into(),
            tags: vec![],
            questions: vec![valid_question(), valid_question()],
        };
        let problems = validate_question_pack(&pack);
        assert!(problems.iter().any(|p| p.contains("duplicate question id")));
    }

    #[test]
    fn test_validate_question_pack_rejects_bad_correct_option_key() {
        let mut q = valid_question();
        q.correct_option_key = "Z".into();
        let pack = QuestionPack {
            schema_version: 1,
            pack_id: "p".into(),
            title: "t".into(),
            locale: "en".into(),
            tags: vec![],
            questions: vec![q],
        };
        let problems = validate_question_pack(&pack);
        assert!(problems.iter().any(|p| p.contains("matches no option")));
    }

    #[test]
    fn test_validate_question_pack_rejects_wrong_option_count() {
        let mut q = valid_question();
        q.options.pop();
        let pack = QuestionPack {
            schema_version: 1,
            pack_id: "p".into(),
            title: "t".into(),
            locale: "en".into(),
            tags: vec![],
            questions: vec![q],
        };
        let problems = validate_question_pack(&pack);
        assert!(problems.iter().any(|p| p.contains("expected exactly 4")));
    }

    #[test]
    fn test_validate_dictionary_pack_requires_minimum_entries() {
        let pack = DictionaryPack {
            entries: vec![DictionaryEntry {
                word: "cat".into(),
                definition: "an animal".into(),
            }],
        };
        let problems = validate_dictionary_pack(&pack);
        assert!(problems.iter().any(|p| p.contains("at least")));
    }

    #[test]
    fn test_validate_dictionary_pack_rejects_duplicate_words_case_insensitively() {
        let pack = DictionaryPack {
            entries: vec![
                DictionaryEntry { word: "cat".into(), definition: "an animal".into() },
                DictionaryEntry { word: "CAT".into(), definition: "another one".into() },
                DictionaryEntry { word: "dog".into(), definition: "an animal".into() },
                DictionaryEntry { word: "bird".into(), definition: "an animal".into() },
            ],
        };
        let problems = validate_dictionary_pack(&pack);
        assert!(problems.iter().any(|p| p.contains("duplicate word")));
    }

    #[test]
    fn test_validate_ranking_pack_rejects_empty_prompt_text() {
        use crate::packs::RankingPrompt;
        let pack = RankingPack {
            prompts: vec![RankingPrompt { id: "r1".into(), prompt: "   ".into() }],
        };
        let problems = validate_ranking_pack(&pack);
        assert!(problems.iter().any(|p| p.contains("must not be empty")));
    }
}
