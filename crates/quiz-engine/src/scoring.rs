use std::collections::HashMap;

use chrono::Duration;
use quiz_protocol::PlayerId;

use crate::state::{AnswerState, EnginePlayer};

pub const CATCH_UP_BONUS: u32 = 20;
pub const CATEGORY_OTHER_CORRECT_POINTS: u32 = 80;
pub const DICTIONARY_BASE_CORRECT_POINTS: u32 = 80;
pub const DICTIONARY_SPEED_BONUS: u32 = 20;
pub const RANKING_STAR_POINTS: u32 = 100;
pub const RANKING_CORRECT_VOTE_POINTS: u32 = 50;

/// Points for rank 1/2/3 among correct category-quiz answers, ordered by
/// submission instant; any later rank earns [`CATEGORY_OTHER_CORRECT_POINTS`].
fn category_rank_points(rank: usize) -> u32 {
    match rank {
        1 => 100,
        2 => 90,
        3 => 85,
        _ => CATEGORY_OTHER_CORRECT_POINTS,
    }
}

/// The source's "middle index after ascending sort" median, deliberately
/// not averaging the two middle elements for an even-length input — this
/// reproduces the original's observable (if statistically biased) behaviour.
pub fn pre_reveal_median(players: &[EnginePlayer]) -> u32 {
    if players.is_empty() {
        return 0;
    }
    let mut scores: Vec<u32> = players.iter().map(|p| p.score).collect();
    scores.sort_unstable();
    scores[scores.len() / 2]
}

pub fn catch_up_bonus(pre_reveal_score: u32, median: u32) -> u32 {
    if pre_reveal_score <= median {
        CATCH_UP_BONUS
    } else {
        0
    }
}

/// Ranks correct category-quiz submissions by submission instant, grouping
/// ties within 1ms of the group's first submission; the next rank skips by
/// the tied group's size. Returns `(player, rank, points)` for every
/// correctly-answering player; incorrect/unanswered players are absent.
pub fn rank_category_answers(
    answers: &HashMap<PlayerId, AnswerState>,
    correct_key: &str,
) -> Vec<(PlayerId, usize, u32)> {
    let mut correct: Vec<(PlayerId, chrono::DateTime<chrono::Utc>)> = answers
        .iter()
        .filter_map(|(pid, state)| match state {
            AnswerState::Answered { option, at } if option.eq_ignore_ascii_case(correct_key) => {
                Some((*pid, *at))
            }
            _ => None,
        })
        .collect();
    correct.sort_by_key(|(_, at)| *at);

    let mut result = Vec::with_capacity(correct.len());
    let mut idx = 0usize;
    let mut rank = 1usize;
    let one_ms = Duration::milliseconds(1);
    while idx < correct.len() {
        let group_start = correct[idx].1;
        let mut end = idx;
        while end + 1 < correct.len() && (correct[end + 1].1 - group_start) < one_ms {
            end += 1;
        }
        let group_size = end - idx + 1;
        let points = category_rank_points(rank);
        for item in correct.iter().take(end + 1).skip(idx) {
            result.push((item.0, rank, points));
        }
        rank += group_size;
        idx = end + 1;
    }
    result
}

/// Winners of a ranking-stars vote: the set of targets tied for the most
/// votes (empty if nobody voted).
pub fn ranking_winners(votes: &HashMap<PlayerId, PlayerId>) -> (Vec<PlayerId>, HashMap<PlayerId, u32>) {
    let mut counts: HashMap<PlayerId, u32> = HashMap::new();
    for target in votes.values() {
        *counts.entry(*target).or_insert(0) += 1;
    }
    let top = counts.values().copied().max().unwrap_or(0);
    let winners = if top == 0 {
        Vec::new()
    } else {
        counts
            .iter()
            .filter(|(_, &count)| count == top)
            .map(|(pid, _)| *pid)
            .collect()
    };
    (winners, counts)
}
