//! Pure state-transition functions over the round/phase state machine that
//! drives one quiz game. No I/O and no timers live here — [`quiz-room`]'s
//! orchestrator actor owns the clock-driven scheduling and calls into this
//! crate on every client command and every fired phase timer.

mod boosters;
mod clock;
mod engine;
mod error;
mod leader;
mod scoring;
mod state;

pub use boosters::{fold_effects, BoosterActivation, BoosterEffect, BoosterType};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{
    advance_past_scoreboard, all_dictionary_players_answered, all_players_answered,
    all_players_voted, auto_select_category, reveal_category_question, reveal_dictionary_word,
    reveal_ranking_prompt, round_advance_after_category_reveal,
    round_advance_after_dictionary_reveal, round_advance_after_ranking_reveal, select_category,
    start_answering, start_dictionary_answering, start_game, start_next_planned_round,
    start_ranking_voting, submit_answer, submit_dictionary_answer, submit_ranking_vote,
    EngineConfig,
};
pub use error::EngineError;
pub use leader::select_round_leader;
pub use scoring::{
    catch_up_bonus, pre_reveal_median, rank_category_answers, ranking_winners, CATCH_UP_BONUS,
};
pub use state::{
    AnswerState, CurrentQuestion, CurrentRound, DictionaryQuestion, EnginePlayer, Phase,
    QuestionOutcome, QuizGameState, RankingBallot, RoundType, ScoreboardEntry,
    DEFAULT_PLANNED_ROUNDS,
};
