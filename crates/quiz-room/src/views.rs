use chrono::{DateTime, Utc};
use quiz_engine::{Phase, QuizGameState, RoundType};
use quiz_protocol::{PlayerId, QuestionView, QuizSnapshot, ScoreboardEntryView};

fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::CategorySelection => "CategorySelection",
        Phase::Question => "Question",
        Phase::Answering => "Answering",
        Phase::Reveal => "Reveal",
        Phase::Scoreboard => "Scoreboard",
        Phase::DictionaryWord => "DictionaryWord",
        Phase::DictionaryAnswering => "DictionaryAnswering",
        Phase::RankingPrompt => "RankingPrompt",
        Phase::RankingVoting => "RankingVoting",
        Phase::RankingReveal => "RankingReveal",
        Phase::Finished => "Finished",
    }
}

fn round_type_name(round_type: RoundType) -> &'static str {
    match round_type {
        RoundType::CategoryQuiz => "CategoryQuiz",
        RoundType::RankingStars => "RankingStars",
        RoundType::DictionaryGame => "DictionaryGame",
    }
}

fn question_view(state: &QuizGameState) -> Option<QuestionView> {
    let show_answer = state.phase.reveals_answer();
    if let Some(q) = &state.current_question {
        return Some(QuestionView {
            id: q.id.clone(),
            text: q.text.clone(),
            options: q.options.clone(),
            correct_option_key: show_answer.then(|| q.correct_option_key.clone()),
            explanation: show_answer.then(|| q.explanation.clone()).flatten(),
            has_answered: q
                .answers
                .iter()
                .filter(|(_, a)| a.is_answered())
                .map(|(id, _)| *id)
                .collect(),
        });
    }
    if let Some(q) = &state.current_dictionary_question {
        return Some(QuestionView {
            id: q.word.clone(),
            text: format!("What does \"{}\" mean?", q.word),
            options: q.options.iter().map(|(i, def)| (i.to_string(), def.clone())).collect(),
            correct_option_key: show_answer.then(|| q.correct_index.to_string()),
            explanation: None,
            has_answered: q
                .answers
                .iter()
                .filter(|(_, a)| a.is_answered())
                .map(|(id, _)| *id)
                .collect(),
        });
    }
    if let Some(ballot) = &state.current_ranking_ballot {
        let candidates: Vec<(String, String)> = state
            .players
            .values()
            .map(|p| (p.player_id.to_string(), p.display_name.clone()))
            .collect();
        return Some(QuestionView {
            id: ballot.prompt_id.clone(),
            text: ballot.prompt_text.clone(),
            options: candidates,
            correct_option_key: None,
            explanation: None,
            has_answered: ballot.votes.keys().copied().collect(),
        });
    }
    None
}

fn scoreboard_view(state: &QuizGameState) -> Option<Vec<ScoreboardEntryView>> {
    if state.scoreboard.is_empty() {
        return None;
    }
    Some(
        state
            .scoreboard
            .iter()
            .map(|e| ScoreboardEntryView {
                player_id: e.player_id,
                display_name: e.display_name.clone(),
                score: e.score,
                position: e.position,
                answered_correctly: e.answered_correctly,
                selected_option: e.selected_option.clone(),
                points_this_question: e.points_this_question,
                speed_bonus: e.speed_bonus,
                ranking_star: e.ranking_star,
                ranking_votes_received: e.ranking_votes_received,
            })
            .collect(),
    )
}

/// Builds the wire view of an in-progress or finished game. `now` is used
/// only to derive `remainingSeconds`; it is never stored.
pub fn build_quiz_snapshot(state: &QuizGameState, now: DateTime<Utc>) -> QuizSnapshot {
    let remaining_seconds = state
        .phase_ends_at
        .map(|ends_at| (ends_at - now).num_seconds().max(0) as u64)
        .unwrap_or(0);
    let round = state.current_round.as_ref();
    let leader_player_id: Option<PlayerId> = round.and_then(|r| r.leader_player_id);
    let available_categories = (state.phase == Phase::CategorySelection).then(|| state.available_categories.clone());

    QuizSnapshot {
        phase: phase_name(state.phase).to_string(),
        remaining_seconds,
        round_number: round.map(|r| r.round_number).unwrap_or(0),
        round_type: round.map(|r| round_type_name(r.round_type).to_string()).unwrap_or_default(),
        leader_player_id,
        category: round.and_then(|r| r.category.clone()),
        available_categories,
        question: question_view(state),
        scoreboard: scoreboard_view(state),
    }
}
