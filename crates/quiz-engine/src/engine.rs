use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use quiz_content::ContentProvider;
use quiz_protocol::PlayerId;

use crate::error::EngineError;
use crate::leader::select_round_leader;
use crate::scoring::{
    catch_up_bonus, pre_reveal_median, rank_category_answers, ranking_winners,
    DICTIONARY_BASE_CORRECT_POINTS, DICTIONARY_SPEED_BONUS, RANKING_CORRECT_VOTE_POINTS,
    RANKING_STAR_POINTS,
};
use crate::state::{
    AnswerState, CurrentQuestion, CurrentRound, DictionaryQuestion, EnginePlayer, Phase,
    QuestionOutcome, QuizGameState, RankingBallot, RoundType, CATEGORY_CHOICES,
    DICTIONARY_WORDS_PER_ROUND, QUESTIONS_PER_ROUND, RANKING_PROMPTS_PER_ROUND,
};

/// Phase durations, all configurable so tests and ops can tune pacing
/// without touching the transition logic. Values match the fixed timings
/// stated for dictionary/ranking/reveal/scoreboard; category-selection and
/// answering durations are not numerically fixed upstream so this
/// implementation chooses defaults (documented in the project's design
/// notes) and treats them as configuration like every other duration here.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub category_selection: Duration,
    pub question_intro: Duration,
    pub answering: Duration,
    pub reveal: Duration,
    pub scoreboard: Duration,
    pub dictionary_word: Duration,
    pub dictionary_answering: Duration,
    pub dictionary_reveal: Duration,
    pub ranking_prompt: Duration,
    pub ranking_voting: Duration,
    pub ranking_reveal: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            category_selection: Duration::seconds(10),
            question_intro: Duration::seconds(3),
            answering: Duration::seconds(15),
            reveal: Duration::seconds(5),
            scoreboard: Duration::seconds(5),
            dictionary_word: Duration::seconds(3),
            dictionary_answering: Duration::seconds(12),
            dictionary_reveal: Duration::seconds(6),
            ranking_prompt: Duration::seconds(2),
            ranking_voting: Duration::seconds(15),
            ranking_reveal: Duration::seconds(6),
        }
    }
}

/// Builds the initial authoritative state for a fresh game and enters the
/// first planned round. Fails with [`EngineError::NotEnoughPlayers`] for
/// fewer than 2 players.
pub fn start_game(
    players: Vec<EnginePlayer>,
    locale: String,
    content: &dyn ContentProvider,
    cfg: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<QuizGameState, EngineError> {
    if players.len() < 2 {
        return Err(EngineError::NotEnoughPlayers);
    }
    let mut state = QuizGameState {
        locale,
        phase: Phase::Finished,
        phase_ends_at: None,
        planned_rounds: crate::state::DEFAULT_PLANNED_ROUNDS.to_vec(),
        planned_round_index: 0,
        current_round: None,
        current_question: None,
        current_dictionary_question: None,
        current_ranking_ballot: None,
        used_question_ids: HashSet::new(),
        used_dictionary_indices: HashSet::new(),
        used_ranking_prompt_ids: HashSet::new(),
        used_categories: HashSet::new(),
        available_categories: Vec::new(),
        leader_history: Vec::new(),
        players: players.into_iter().map(|p| (p.player_id, p)).collect(),
        scoreboard: Vec::new(),
    };
    state.recompute_scoreboard();
    start_next_planned_round(&mut state, content, cfg, now);
    Ok(state)
}

/// Advances to the next entry of the planned round sequence, or finishes
/// the game if none remain (I9: the sequence always ends in
/// `DictionaryGame`, so this is the only way a game legitimately ends).
pub fn start_next_planned_round(
    state: &mut QuizGameState,
    content: &dyn ContentProvider,
    cfg: &EngineConfig,
    now: DateTime<Utc>,
) {
    if state.planned_round_index >= state.planned_rounds.len() {
        finish_game(state, now);
        return;
    }
    let round_type = state.planned_rounds[state.planned_round_index];
    let round_number = state.planned_round_index as u32 + 1;
    match round_type {
        RoundType::CategoryQuiz => start_category_quiz_round(state, content, cfg, now, round_number),
        RoundType::RankingStars => start_ranking_round(state, content, cfg, now, round_number),
        RoundType::DictionaryGame => start_dictionary_round(state, content, cfg, now, round_number),
    }
}

fn finish_game(state: &mut QuizGameState, _now: DateTime<Utc>) {
    state.phase = Phase::Finished;
    state.phase_ends_at = None;
    state.current_round = None;
    state.current_question = None;
    state.current_dictionary_question = None;
    state.current_ranking_ballot = None;
    state.recompute_scoreboard();
}

/// Ends the current round and either enters the next planned round or
/// finishes the game, matching I8: Scoreboard is shown exactly once, at
/// round end, never between questions within a round.
fn show_scoreboard(state: &mut QuizGameState, cfg: &EngineConfig, now: DateTime<Utc>) {
    state.phase = Phase::Scoreboard;
    state.phase_ends_at = Some(now + cfg.scoreboard);
    state.current_question = None;
    state.current_dictionary_question = None;
    state.current_ranking_ballot = None;
    state.recompute_scoreboard();
}

/// Host-only: immediately ends the scoreboard phase and moves on.
pub fn advance_past_scoreboard(
    state: &mut QuizGameState,
    content: &dyn ContentProvider,
    cfg: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<(), EngineError> {
    if state.phase != Phase::Scoreboard {
        return Err(EngineError::InvalidState);
    }
    state.planned_round_index += 1;
    start_next_planned_round(state, content, cfg, now);
    Ok(())
}

// ---------------------------------------------------------------------
// Category quiz
// ---------------------------------------------------------------------

fn start_category_quiz_round(
    state: &mut QuizGameState,
    content: &dyn ContentProvider,
    cfg: &EngineConfig,
    now: DateTime<Utc>,
    round_number: u32,
) {
    let leader = select_round_leader(&state.players, &state.leader_history);
    if let Some(leader_id) = leader {
        state.leader_history.push(leader_id);
    }
    state.available_categories = content.random_categories(CATEGORY_CHOICES, &state.used_categories);
    state.current_round = Some(CurrentRound {
        round_number,
        round_type: RoundType::CategoryQuiz,
        leader_player_id: leader,
        category: None,
        item_index: 0,
    });
    state.phase = Phase::CategorySelection;
    state.phase_ends_at = Some(now + cfg.category_selection);
}

pub fn select_category(
    state: &mut QuizGameState,
    caller: PlayerId,
    category: String,
    content: &dyn ContentProvider,
    cfg: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<(), EngineError> {
    if state.phase != Phase::CategorySelection {
        return Err(EngineError::InvalidState);
    }
    let round = state.current_round.as_ref().ok_or(EngineError::InvalidState)?;
    if round.leader_player_id != Some(caller) {
        return Err(EngineError::NotRoundLeader);
    }
    if !state.available_categories.contains(&category) {
        return Err(EngineError::InvalidCategory);
    }
    commit_category(state, category);
    start_category_question(state, content, cfg, now);
    Ok(())
}

/// Called by the orchestrator when the category-selection timer fires
/// without an explicit `SelectCategory`.
pub fn auto_select_category(state: &mut QuizGameState, content: &dyn ContentProvider, cfg: &EngineConfig, now: DateTime<Utc>) {
    if state.phase != Phase::CategorySelection {
        return;
    }
    if let Some(category) = state.available_categories.first().cloned() {
        commit_category(state, category);
    }
    start_category_question(state, content, cfg, now);
}

fn commit_category(state: &mut QuizGameState, category: String) {
    state.used_categories.insert(category.clone());
    if let Some(round) = state.current_round.as_mut() {
        round.category = Some(category);
    }
}

fn start_category_question(state: &mut QuizGameState, content: &dyn ContentProvider, cfg: &EngineConfig, now: DateTime<Utc>) {
    let category = state.current_round.as_ref().and_then(|r| r.category.clone());
    let question = content.random_question(category.as_deref(), &state.used_question_ids);
    let Some(question) = question else {
        show_scoreboard(state, cfg, now);
        return;
    };
    state.used_question_ids.insert(question.id.clone());
    let answers = state.players.keys().map(|id| (*id, AnswerState::Pending)).collect();
    state.current_question = Some(CurrentQuestion {
        id: question.id,
        text: question.text,
        options: question.options.into_iter().map(|o| (o.key, o.text)).collect(),
        correct_option_key: question.correct_option_key,
        explanation: question.explanation,
        answers,
    });
    state.phase = Phase::Question;
    state.phase_ends_at = Some(now + cfg.question_intro);
}

/// Called by the orchestrator when the question-intro timer fires.
pub fn start_answering(state: &mut QuizGameState, cfg: &EngineConfig, now: DateTime<Utc>) -> Result<(), EngineError> {
    if state.phase != Phase::Question {
        return Err(EngineError::InvalidState);
    }
    state.phase = Phase::Answering;
    state.phase_ends_at = Some(now + cfg.answering);
    Ok(())
}

pub fn submit_answer(state: &mut QuizGameState, player_id: PlayerId, option_key: &str, now: DateTime<Utc>) -> Result<(), EngineError> {
    if state.phase != Phase::Answering {
        return Err(EngineError::NotAnswering);
    }
    // TODO: once booster effects are wired into QuizGameState, a player
    // holding an active LateLock should be checked against their own
    // extended deadline here instead of the bare phase deadline.
    if state.phase_ends_at.is_some_and(|deadline| now > deadline) {
        return Err(EngineError::InvalidState);
    }
    let question = state.current_question.as_mut().ok_or(EngineError::InvalidState)?;
    let entry = question.answers.get_mut(&player_id).ok_or(EngineError::PlayerNotInGame)?;
    if entry.is_answered() {
        return Ok(());
    }
    if !question.options.iter().any(|(key, _)| key == option_key) {
        return Err(EngineError::UnknownOption);
    }
    *entry = AnswerState::Answered {
        option: option_key.to_string(),
        at: now,
    };
    Ok(())
}

/// Every eligible (connected, not blocked) player has answered.
pub fn all_players_answered(state: &QuizGameState, eligible: &HashSet<PlayerId>) -> bool {
    let Some(question) = &state.current_question else {
        return false;
    };
    eligible.iter().all(|id| question.answers.get(id).is_some_and(AnswerState::is_answered))
}

pub fn reveal_category_question(state: &mut QuizGameState, content: &dyn ContentProvider, cfg: &EngineConfig, now: DateTime<Utc>) -> Result<(), EngineError> {
    if state.phase != Phase::Answering {
        return Err(EngineError::InvalidState);
    }
    let question = state.current_question.clone().ok_or(EngineError::InvalidState)?;
    let pre_reveal: Vec<EnginePlayer> = state.players.values().cloned().collect();
    let median = pre_reveal_median(&pre_reveal);
    let ranked = rank_category_answers(&question.answers, &question.correct_option_key);

    let mut outcomes: HashMap<PlayerId, QuestionOutcome> = HashMap::new();
    for (player_id, answer) in &question.answers {
        let selected = match answer {
            AnswerState::Answered { option, .. } => Some(option.clone()),
            AnswerState::Pending => None,
        };
        outcomes.insert(
            *player_id,
            QuestionOutcome {
                answered_correctly: Some(selected.as_deref().is_some_and(|o| o.eq_ignore_ascii_case(&question.correct_option_key))),
                selected_option: selected,
                points_this_question: Some(0),
                speed_bonus: false,
                ranking_star: false,
                ranking_votes_received: 0,
            },
        );
    }
    for (player_id, rank, base_points) in ranked {
        let pre_reveal_score = state.players.get(&player_id).map(|p| p.score).unwrap_or(0);
        let points = base_points + catch_up_bonus(pre_reveal_score, median);
        if let Some(p) = state.players.get_mut(&player_id) {
            p.score += points;
        }
        if let Some(outcome) = outcomes.get_mut(&player_id) {
            outcome.points_this_question = Some(points);
            outcome.speed_bonus = rank == 1;
        }
    }

    state.phase = Phase::Reveal;
    state.phase_ends_at = Some(now + cfg.reveal);
    state.recompute_scoreboard_with_outcomes(&outcomes);

    let _ = content; // reserved: future reveal variants may need a content lookup
    Ok(())
}

/// Called by the orchestrator when the reveal timer fires.
pub fn round_advance_after_category_reveal(state: &mut QuizGameState, content: &dyn ContentProvider, cfg: &EngineConfig, now: DateTime<Utc>) -> Result<(), EngineError> {
    if state.phase != Phase::Reveal {
        return Err(EngineError::InvalidState);
    }
    let round = state.current_round.as_mut().ok_or(EngineError::InvalidState)?;
    round.item_index += 1;
    if round.item_index < QUESTIONS_PER_ROUND {
        start_category_question(state, content, cfg, now);
    } else {
        show_scoreboard(state, cfg, now);
    }
    Ok(())
}

// ---------------------------------------------------------------------
// Dictionary game (always the last planned round)
// ---------------------------------------------------------------------

fn start_dictionary_round(state: &mut QuizGameState, content: &dyn ContentProvider, cfg: &EngineConfig, now: DateTime<Utc>, round_number: u32) {
    state.current_round = Some(CurrentRound {
        round_number,
        round_type: RoundType::DictionaryGame,
        leader_player_id: None,
        category: None,
        item_index: 0,
    });
    start_dictionary_word(state, content, cfg, now);
}

fn start_dictionary_word(state: &mut QuizGameState, content: &dyn ContentProvider, cfg: &EngineConfig, now: DateTime<Utc>) {
    let Some((index, entry)) = content.random_dictionary_entry(&state.used_dictionary_indices) else {
        show_scoreboard(state, cfg, now);
        return;
    };
    state.used_dictionary_indices.insert(index);
    let mut options = content
        .distractor_definitions(index, 3)
        .into_iter()
        .enumerate()
        .map(|(i, def)| (i, def))
        .collect::<Vec<_>>();
    let correct_index = options.len();
    options.push((correct_index, entry.definition));

    let answers = state.players.keys().map(|id| (*id, AnswerState::Pending)).collect();
    state.current_dictionary_question = Some(DictionaryQuestion {
        word: entry.word,
        options,
        correct_index,
        answers,
    });
    state.phase = Phase::DictionaryWord;
    state.phase_ends_at = Some(now + cfg.dictionary_word);
}

pub fn start_dictionary_answering(state: &mut QuizGameState, cfg: &EngineConfig, now: DateTime<Utc>) -> Result<(), EngineError> {
    if state.phase != Phase::DictionaryWord {
        return Err(EngineError::InvalidState);
    }
    state.phase = Phase::DictionaryAnswering;
    state.phase_ends_at = Some(now + cfg.dictionary_answering);
    Ok(())
}

pub fn submit_dictionary_answer(state: &mut QuizGameState, player_id: PlayerId, option_index: usize, now: DateTime<Utc>) -> Result<(), EngineError> {
    if state.phase != Phase::DictionaryAnswering {
        return Err(EngineError::NotAnswering);
    }
    if state.phase_ends_at.is_some_and(|deadline| now > deadline) {
        return Err(EngineError::InvalidState);
    }
    let question = state.current_dictionary_question.as_mut().ok_or(EngineError::InvalidState)?;
    let entry = question.answers.get_mut(&player_id).ok_or(EngineError::PlayerNotInGame)?;
    if entry.is_answered() {
        return Ok(());
    }
    if !question.options.iter().any(|(i, _)| *i == option_index) {
        return Err(EngineError::UnknownOption);
    }
    *entry = AnswerState::Answered {
        option: option_index.to_string(),
        at: now,
    };
    Ok(())
}

pub fn all_dictionary_players_answered(state: &QuizGameState, eligible: &HashSet<PlayerId>) -> bool {
    let Some(question) = &state.current_dictionary_question else {
        return false;
    };
    eligible.iter().all(|id| question.answers.get(id).is_some_and(AnswerState::is_answered))
}

pub fn reveal_dictionary_word(state: &mut QuizGameState, cfg: &EngineConfig, now: DateTime<Utc>) -> Result<(), EngineError> {
    if state.phase != Phase::DictionaryAnswering {
        return Err(EngineError::InvalidState);
    }
    let question = state.current_dictionary_question.clone().ok_or(EngineError::InvalidState)?;
    let pre_reveal: Vec<EnginePlayer> = state.players.values().cloned().collect();
    let median = pre_reveal_median(&pre_reveal);

    let correct_key = question.correct_index.to_string();
    let ranked = rank_category_answers(&question.answers, &correct_key);
    let fastest_correct = ranked.iter().min_by_key(|(_, rank, _)| *rank).map(|(pid, ..)| *pid);

    let mut outcomes: HashMap<PlayerId, QuestionOutcome> = HashMap::new();
    for (player_id, answer) in &question.answers {
        let selected = match answer {
            AnswerState::Answered { option, .. } => Some(option.clone()),
            AnswerState::Pending => None,
        };
        let answered_correctly = selected.as_deref() == Some(correct_key.as_str());
        let mut points = 0;
        if answered_correctly {
            let pre_reveal_score = state.players.get(player_id).map(|p| p.score).unwrap_or(0);
            points = DICTIONARY_BASE_CORRECT_POINTS + catch_up_bonus(pre_reveal_score, median);
            if fastest_correct == Some(*player_id) {
                points += DICTIONARY_SPEED_BONUS;
            }
            if let Some(p) = state.players.get_mut(player_id) {
                p.score += points;
            }
        }
        outcomes.insert(
            *player_id,
            QuestionOutcome {
                answered_correctly: Some(answered_correctly),
                selected_option: selected,
                points_this_question: Some(points),
                speed_bonus: fastest_correct == Some(*player_id),
                ranking_star: false,
                ranking_votes_received: 0,
            },
        );
    }

    state.phase = Phase::Reveal;
    state.phase_ends_at = Some(now + cfg.dictionary_reveal);
    state.recompute_scoreboard_with_outcomes(&outcomes);
    Ok(())
}

pub fn round_advance_after_dictionary_reveal(state: &mut QuizGameState, content: &dyn ContentProvider, cfg: &EngineConfig, now: DateTime<Utc>) -> Result<(), EngineError> {
    if state.phase != Phase::Reveal {
        return Err(EngineError::InvalidState);
    }
    let round = state.current_round.as_mut().ok_or(EngineError::InvalidState)?;
    round.item_index += 1;
    if round.item_index < DICTIONARY_WORDS_PER_ROUND {
        start_dictionary_word(state, content, cfg, now);
    } else {
        show_scoreboard(state, cfg, now);
    }
    Ok(())
}

// ---------------------------------------------------------------------
// Ranking stars
// ---------------------------------------------------------------------

fn start_ranking_round(state: &mut QuizGameState, content: &dyn ContentProvider, cfg: &EngineConfig, now: DateTime<Utc>, round_number: u32) {
    state.current_round = Some(CurrentRound {
        round_number,
        round_type: RoundType::RankingStars,
        leader_player_id: None,
        category: None,
        item_index: 0,
    });
    start_ranking_prompt(state, content, cfg, now);
}

fn start_ranking_prompt(state: &mut QuizGameState, content: &dyn ContentProvider, cfg: &EngineConfig, now: DateTime<Utc>) {
    let Some(prompt) = content.random_ranking_prompt(&state.used_ranking_prompt_ids) else {
        show_scoreboard(state, cfg, now);
        return;
    };
    state.used_ranking_prompt_ids.insert(prompt.id.clone());
    state.current_ranking_ballot = Some(RankingBallot {
        prompt_id: prompt.id,
        prompt_text: prompt.prompt,
        votes: HashMap::new(),
    });
    state.phase = Phase::RankingPrompt;
    state.phase_ends_at = Some(now + cfg.ranking_prompt);
}

pub fn start_ranking_voting(state: &mut QuizGameState, cfg: &EngineConfig, now: DateTime<Utc>) -> Result<(), EngineError> {
    if state.phase != Phase::RankingPrompt {
        return Err(EngineError::InvalidState);
    }
    state.phase = Phase::RankingVoting;
    state.phase_ends_at = Some(now + cfg.ranking_voting);
    Ok(())
}

pub fn submit_ranking_vote(state: &mut QuizGameState, voter_id: PlayerId, voted_for_id: PlayerId) -> Result<(), EngineError> {
    if state.phase != Phase::RankingVoting {
        return Err(EngineError::NotAnswering);
    }
    if voter_id == voted_for_id || !state.players.contains_key(&voted_for_id) {
        return Err(EngineError::InvalidVoteTarget);
    }
    if !state.players.contains_key(&voter_id) {
        return Err(EngineError::PlayerNotInGame);
    }
    let ballot = state.current_ranking_ballot.as_mut().ok_or(EngineError::InvalidState)?;
    ballot.votes.entry(voter_id).or_insert(voted_for_id);
    Ok(())
}

pub fn all_players_voted(state: &QuizGameState, eligible: &HashSet<PlayerId>) -> bool {
    let Some(ballot) = &state.current_ranking_ballot else {
        return false;
    };
    eligible.iter().all(|id| ballot.votes.contains_key(id))
}

pub fn reveal_ranking_prompt(state: &mut QuizGameState, cfg: &EngineConfig, now: DateTime<Utc>) -> Result<(), EngineError> {
    if state.phase != Phase::RankingVoting {
        return Err(EngineError::InvalidState);
    }
    let ballot = state.current_ranking_ballot.clone().ok_or(EngineError::InvalidState)?;
    let pre_reveal: Vec<EnginePlayer> = state.players.values().cloned().collect();
    let median = pre_reveal_median(&pre_reveal);
    let (winners, counts) = ranking_winners(&ballot.votes);

    let mut outcomes: HashMap<PlayerId, QuestionOutcome> = HashMap::new();
    for player_id in state.players.keys().copied().collect::<Vec<_>>() {
        let votes_received = counts.get(&player_id).copied().unwrap_or(0);
        let is_winner = winners.contains(&player_id);
        let mut points = 0;
        if is_winner {
            let pre_reveal_score = state.players.get(&player_id).map(|p| p.score).unwrap_or(0);
            points += RANKING_STAR_POINTS + catch_up_bonus(pre_reveal_score, median);
        }
        if let Some(voted_for) = ballot.votes.get(&player_id) {
            if winners.contains(voted_for) {
                let pre_reveal_score = state.players.get(&player_id).map(|p| p.score).unwrap_or(0);
                points += RANKING_CORRECT_VOTE_POINTS + catch_up_bonus(pre_reveal_score, median);
            }
        }
        if points > 0 {
            if let Some(p) = state.players.get_mut(&player_id) {
                p.score += points;
            }
        }
        outcomes.insert(
            player_id,
            QuestionOutcome {
                answered_correctly: None,
                selected_option: ballot.votes.get(&player_id).map(|p| p.to_string()),
                points_this_question: Some(points),
                speed_bonus: false,
                ranking_star: is_winner,
                ranking_votes_received: votes_received,
            },
        );
    }

    state.phase = Phase::RankingReveal;
    state.phase_ends_at = Some(now + cfg.ranking_reveal);
    state.recompute_scoreboard_with_outcomes(&outcomes);
    Ok(())
}

pub fn round_advance_after_ranking_reveal(state: &mut QuizGameState, content: &dyn ContentProvider, cfg: &EngineConfig, now: DateTime<Utc>) -> Result<(), EngineError> {
    if state.phase != Phase::RankingReveal {
        return Err(EngineError::InvalidState);
    }
    let round = state.current_round.as_mut().ok_or(EngineError::InvalidState)?;
    round.item_index += 1;
    if round.item_index < RANKING_PROMPTS_PER_ROUND {
        start_ranking_prompt(state, content, cfg, now);
    } else {
        show_scoreboard(state, cfg, now);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quiz_content::{
        DictionaryEntry, DictionaryPack, InMemoryContentProvider, Question, QuestionOption,
        QuestionPack, RankingPack, RankingPrompt,
    };

    fn question(id: &str, category: &str) -> Question {
        Question {
            id: id.into(),
            text: "2+2?".into(),
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
            category: category.into(),
        }
    }

    fn provider() -> InMemoryContentProvider {
        let questions = QuestionPack {
            schema_version: 1,
            pack_id: "p".into(),
            title: "t".into(),
            locale: "en".into(),
            tags: vec![],
            questions: (0..12).map(|i| question(&format!("q{i}"), "science")).collect(),
        };
        let dictionary = DictionaryPack {
            entries: (0..12)
                .map(|i| DictionaryEntry { word: format!("w{i}"), definition: format!("d{i}") })
                .collect(),
        };
        let ranking = RankingPack {
            prompts: (0..6).map(|i| RankingPrompt { id: format!("r{i}"), prompt: format!("p{i}") }).collect(),
        };
        InMemoryContentProvider::with_seed(questions, dictionary, ranking, 1)
    }

    fn players(n: usize) -> Vec<EnginePlayer> {
        (0..n)
            .map(|i| EnginePlayer {
                player_id: PlayerId::new(),
                display_name: format!("P{i}"),
                connected: true,
                score: 0,
            })
            .collect()
    }

    #[test]
    fn test_start_game_rejects_single_player() {
        let content = provider();
        let cfg = EngineConfig::default();
        let err = start_game(players(1), "en".into(), &content, &cfg, Utc::now()).unwrap_err();
        assert_eq!(err, EngineError::NotEnoughPlayers);
    }

    #[test]
    fn test_start_game_with_two_players_enters_category_selection() {
        let content = provider();
        let cfg = EngineConfig::default();
        let state = start_game(players(2), "en".into(), &content, &cfg, Utc::now()).unwrap();
        assert_eq!(state.phase, Phase::CategorySelection);
        assert!(state.current_round.is_some());
    }

    #[test]
    fn test_submit_answer_rejected_outside_answering_phase() {
        let content = provider();
        let cfg = EngineConfig::default();
        let mut state = start_game(players(2), "en".into(), &content, &cfg, Utc::now()).unwrap();
        let pid = *state.players.keys().next().unwrap();
        let err = submit_answer(&mut state, pid, "A", Utc::now()).unwrap_err();
        assert_eq!(err, EngineError::NotAnswering);
    }

    #[test]
    fn test_submit_answer_idempotent_first_submission_wins() {
        let content = provider();
        let cfg = EngineConfig::default();
        let now = Utc::now();
        let mut state = start_game(players(2), "en".into(), &content, &cfg, now).unwrap();
        let leader = state.current_round.as_ref().unwrap().leader_player_id.unwrap();
        select_category(&mut state, leader, state.available_categories[0].clone(), &content, &cfg, now).unwrap();
        start_answering(&mut state, &cfg, now).unwrap();

        let pid = *state.players.keys().next().unwrap();
        submit_answer(&mut state, pid, "A", now).unwrap();
        submit_answer(&mut state, pid, "B", now).unwrap();
        let recorded = state.current_question.as_ref().unwrap().answers.get(&pid).unwrap();
        match recorded {
            AnswerState::Answered { option, .. } => assert_eq!(option, "A"),
            AnswerState::Pending => panic!("expected answered"),
        }
    }

    #[test]
    fn test_submit_answer_rejects_unknown_option() {
        let content = provider();
        let cfg = EngineConfig::default();
        let now = Utc::now();
        let mut state = start_game(players(2), "en".into(), &content, &cfg, now).unwrap();
        let leader = state.current_round.as_ref().unwrap().leader_player_id.unwrap();
        select_category(&mut state, leader, state.available_categories[0].clone(), &content, &cfg, now).unwrap();
        start_answering(&mut state, &cfg, now).unwrap();
        let pid = *state.players.keys().next().unwrap();
        let err = submit_answer(&mut state, pid, "Z", now).unwrap_err();
        assert_eq!(err, EngineError::UnknownOption);
    }

    #[test]
    fn test_select_category_rejects_non_leader() {
        let content = provider();
        let cfg = EngineConfig::default();
        let now = Utc::now();
        let mut state = start_game(players(2), "en".into(), &content, &cfg, now).unwrap();
        let leader = state.current_round.as_ref().unwrap().leader_player_id.unwrap();
        let other = *state.players.keys().find(|p| **p != leader).unwrap();
        let err = select_category(&mut state, other, state.available_categories[0].clone(), &content, &cfg, now).unwrap_err();
        assert_eq!(err, EngineError::NotRoundLeader);
    }

    #[test]
    fn test_reveal_orders_faster_submission_higher_points() {
        let content = provider();
        let cfg = EngineConfig::default();
        let now = Utc::now();
        let mut state = start_game(players(2), "en".into(), &content, &cfg, now).unwrap();
        let leader = state.current_round.as_ref().unwrap().leader_player_id.unwrap();
        select_category(&mut state, leader, state.available_categories[0].clone(), &content, &cfg, now).unwrap();
        start_answering(&mut state, &cfg, now).unwrap();

        let correct = state.current_question.as_ref().unwrap().correct_option_key.clone();
        let mut ids: Vec<PlayerId> = state.players.keys().copied().collect();
        ids.sort();
        submit_answer(&mut state, ids[0], &correct, now).unwrap();
        submit_answer(&mut state, ids[1], &correct, now + Duration::milliseconds(500)).unwrap();

        reveal_category_question(&mut state, &content, &cfg, now).unwrap();
        let p1 = state.scoreboard.iter().find(|e| e.player_id == ids[0]).unwrap();
        let p2 = state.scoreboard.iter().find(|e| e.player_id == ids[1]).unwrap();
        assert_eq!(p1.points_this_question, Some(100));
        assert_eq!(p2.points_this_question, Some(90));
    }

    #[test]
    fn test_all_players_answered_false_until_every_eligible_player_acts() {
        let content = provider();
        let cfg = EngineConfig::default();
        let now = Utc::now();
        let mut state = start_game(players(2), "en".into(), &content, &cfg, now).unwrap();
        let leader = state.current_round.as_ref().unwrap().leader_player_id.unwrap();
        select_category(&mut state, leader, state.available_categories[0].clone(), &content, &cfg, now).unwrap();
        start_answering(&mut state, &cfg, now).unwrap();

        let eligible: HashSet<PlayerId> = state.players.keys().copied().collect();
        let correct = state.current_question.as_ref().unwrap().correct_option_key.clone();
        let first = *eligible.iter().next().unwrap();
        submit_answer(&mut state, first, &correct, now).unwrap();
        assert!(!all_players_answered(&state, &eligible));
    }

    #[test]
    fn test_planned_round_sequence_ends_with_dictionary_game() {
        let state_rounds = crate::state::DEFAULT_PLANNED_ROUNDS;
        assert_eq!(*state_rounds.last().unwrap(), RoundType::DictionaryGame);
    }

    #[test]
    fn test_submit_ranking_vote_rejects_self_vote() {
        let content = provider();
        let cfg = EngineConfig::default();
        let mut state = start_game(players(2), "en".into(), &content, &cfg, Utc::now()).unwrap();
        state.phase = Phase::RankingVoting;
        state.current_ranking_ballot = Some(RankingBallot {
            prompt_id: "r0".into(),
            prompt_text: "p".into(),
            votes: HashMap::new(),
        });
        let pid = *state.players.keys().next().unwrap();
        let err = submit_ranking_vote(&mut state, pid, pid).unwrap_err();
        assert_eq!(err, EngineError::InvalidVoteTarget);
    }

    #[test]
    fn test_ranking_reveal_awards_catch_up_bonus_to_low_scorers() {
        let content = provider();
        let cfg = EngineConfig::default();
        let now = Utc::now();
        let mut state = start_game(players(4), "en".into(), &content, &cfg, now).unwrap();
        let mut ids: Vec<PlayerId> = state.players.keys().copied().collect();
        ids.sort();
        state.players.get_mut(&ids[0]).unwrap().score = 500;
        state.players.get_mut(&ids[1]).unwrap().score = 400;
        state.players.get_mut(&ids[2]).unwrap().score = 100;
        state.players.get_mut(&ids[3]).unwrap().score = 0;

        state.phase = Phase::RankingVoting;
        let mut votes = HashMap::new();
        votes.insert(ids[0], ids[2]);
        votes.insert(ids[1], ids[2]);
        votes.insert(ids[2], ids[3]);
        votes.insert(ids[3], ids[2]);
        state.current_ranking_ballot = Some(RankingBallot {
            prompt_id: "r0".into(),
            prompt_text: "p".into(),
            votes,
        });

        reveal_ranking_prompt(&mut state, &cfg, now).unwrap();
        let winner_entry = state.scoreboard.iter().find(|e| e.player_id == ids[2]).unwrap();
        assert!(winner_entry.ranking_star);
        assert_eq!(winner_entry.points_this_question, Some(RANKING_STAR_POINTS + 20));
    }
}
