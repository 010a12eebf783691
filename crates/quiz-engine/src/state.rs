use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use quiz_protocol::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundType {
    CategoryQuiz,
    RankingStars,
    DictionaryGame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    CategorySelection,
    Question,
    Answering,
    Reveal,
    Scoreboard,
    DictionaryWord,
    DictionaryAnswering,
    RankingPrompt,
    RankingVoting,
    RankingReveal,
    Finished,
}

impl Phase {
    /// Whether the correct answer / winning vote may be shown on the wire
    /// view for this phase.
    pub fn reveals_answer(self) -> bool {
        matches!(
            self,
            Phase::Reveal | Phase::RankingReveal | Phase::Scoreboard | Phase::Finished
        )
    }
}

/// Distinguishes "this player is in the game and has not yet answered"
/// from "this player is not in the game" (absence from the map).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerState {
    Pending,
    Answered { option: String, at: DateTime<Utc> },
}

impl AnswerState {
    pub fn is_answered(&self) -> bool {
        matches!(self, AnswerState::Answered { .. })
    }
}

#[derive(Debug, Clone)]
pub struct CurrentRound {
    pub round_number: u32,
    pub round_type: RoundType,
    pub leader_player_id: Option<PlayerId>,
    pub category: Option<String>,
    /// 0-based index of the current question/word/prompt within the round.
    pub item_index: u32,
}

#[derive(Debug, Clone)]
pub struct CurrentQuestion {
    pub id: String,
    pub text: String,
    pub options: Vec<(String, String)>,
    pub correct_option_key: String,
    pub explanation: Option<String>,
    pub answers: HashMap<PlayerId, AnswerState>,
}

#[derive(Debug, Clone)]
pub struct DictionaryQuestion {
    pub word: String,
    /// (index into the pack, definition text); one of these is correct.
    pub options: Vec<(usize, String)>,
    pub correct_index: usize,
    pub answers: HashMap<PlayerId, AnswerState>,
}

#[derive(Debug, Clone)]
pub struct RankingBallot {
    pub prompt_id: String,
    pub prompt_text: String,
    /// voter -> chosen target.
    pub votes: HashMap<PlayerId, PlayerId>,
}

#[derive(Debug, Clone)]
pub struct ScoreboardEntry {
    pub player_id: PlayerId,
    pub display_name: String,
    pub score: u32,
    pub position: u32,
    pub answered_correctly: Option<bool>,
    pub selected_option: Option<String>,
    pub points_this_question: Option<u32>,
    pub speed_bonus: bool,
    pub ranking_star: bool,
    pub ranking_votes_received: u32,
}

/// A player as the engine sees it: just enough to score and order, not the
/// full lobby [`quiz_protocol::PlayerSnapshot`].
#[derive(Debug, Clone)]
pub struct EnginePlayer {
    pub player_id: PlayerId,
    pub display_name: String,
    pub connected: bool,
    pub score: u32,
}

/// Authoritative state of one in-progress game, owned exclusively by the
/// orchestrator actor for the room it belongs to.
#[derive(Debug, Clone)]
pub struct QuizGameState {
    pub locale: String,
    pub phase: Phase,
    pub phase_ends_at: Option<DateTime<Utc>>,

    pub planned_rounds: Vec<RoundType>,
    pub planned_round_index: usize,

    pub current_round: Option<CurrentRound>,
    pub current_question: Option<CurrentQuestion>,
    pub current_dictionary_question: Option<DictionaryQuestion>,
    pub current_ranking_ballot: Option<RankingBallot>,

    pub used_question_ids: HashSet<String>,
    pub used_dictionary_indices: HashSet<usize>,
    pub used_ranking_prompt_ids: HashSet<String>,
    pub used_categories: HashSet<String>,
    pub available_categories: Vec<String>,

    pub leader_history: Vec<PlayerId>,

    /// Players present when the game started; fixed for the whole game
    /// (see the rejoin-mid-game policy).
    pub players: HashMap<PlayerId, EnginePlayer>,

    /// Last computed scoreboard, for display between rounds and at finish.
    pub scoreboard: Vec<ScoreboardEntry>,
}

pub const DEFAULT_PLANNED_ROUNDS: [RoundType; 4] = [
    RoundType::CategoryQuiz,
    RoundType::CategoryQuiz,
    RoundType::RankingStars,
    RoundType::DictionaryGame,
];

pub const QUESTIONS_PER_ROUND: u32 = 3;
pub const DICTIONARY_WORDS_PER_ROUND: u32 = 3;
pub const RANKING_PROMPTS_PER_ROUND: u32 = 3;
pub const CATEGORY_CHOICES: usize = 3;

/// Per-player outcome of the question/word/prompt just revealed, merged
/// onto the freshly recomputed scoreboard entries.
#[derive(Debug, Clone, Default)]
pub struct QuestionOutcome {
    pub answered_correctly: Option<bool>,
    pub selected_option: Option<String>,
    pub points_this_question: Option<u32>,
    pub speed_bonus: bool,
    pub ranking_star: bool,
    pub ranking_votes_received: u32,
}

impl QuizGameState {
    /// `positions ordered (score desc, name asc)`, matching the invariant
    /// used at every reveal (I2). Per-question fields are left at their
    /// zero value; use [`QuizGameState::recompute_scoreboard_with_outcomes`]
    /// right after a reveal to populate them.
    pub fn recompute_scoreboard(&mut self) {
        self.recompute_scoreboard_with_outcomes(&HashMap::new());
    }

    pub fn recompute_scoreboard_with_outcomes(&mut self, outcomes: &HashMap<PlayerId, QuestionOutcome>) {
        let mut entries: Vec<ScoreboardEntry> = self
            .players
            .values()
            .map(|p| {
                let outcome = outcomes.get(&p.player_id).cloned().unwrap_or_default();
                ScoreboardEntry {
                    player_id: p.player_id,
                    display_name: p.display_name.clone(),
                    score: p.score,
                    position: 0,
                    answered_correctly: outcome.answered_correctly,
                    selected_option: outcome.selected_option,
                    points_this_question: outcome.points_this_question,
                    speed_bonus: outcome.speed_bonus,
                    ranking_star: outcome.ranking_star,
                    ranking_votes_received: outcome.ranking_votes_received,
                }
            })
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.display_name.cmp(&b.display_name)));
        for (idx, entry) in entries.iter_mut().enumerate() {
            entry.position = idx as u32 + 1;
        }
        self.scoreboard = entries;
    }

    pub fn eligible_player_ids(&self) -> HashSet<PlayerId> {
        self.players
            .values()
            .filter(|p| p.connected)
            .map(|p| p.player_id)
            .collect()
    }
}
