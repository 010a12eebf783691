use std::collections::HashMap;

use quiz_protocol::PlayerId;

use crate::state::EnginePlayer;

/// Picks the next category-quiz round leader: lowest score first, ties
/// broken by the same `(score, name)` order the scoreboard uses, never
/// repeating the immediately previous leader unless doing so would leave
/// nobody to pick.
pub fn select_round_leader(
    players: &HashMap<PlayerId, EnginePlayer>,
    leader_history: &[PlayerId],
) -> Option<PlayerId> {
    let mut candidates: Vec<&EnginePlayer> = players.values().filter(|p| p.connected).collect();
    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by(|a, b| a.score.cmp(&b.score).then_with(|| a.display_name.cmp(&b.display_name)));

    let previous = leader_history.last().copied();
    candidates
        .iter()
        .find(|c| Some(c.player_id) != previous)
        .or_else(|| candidates.first())
        .map(|c| c.player_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: PlayerId, name: &str, score: u32) -> EnginePlayer {
        EnginePlayer {
            player_id: id,
            display_name: name.into(),
            connected: true,
            score,
        }
    }

    #[test]
    fn test_select_round_leader_picks_lowest_score() {
        let p1 = PlayerId::new();
        let p2 = PlayerId::new();
        let players = HashMap::from([(p1, player(p1, "Bob", 200)), (p2, player(p2, "Alice", 50))]);
        assert_eq!(select_round_leader(&players, &[]), Some(p2));
    }

    #[test]
    fn test_select_round_leader_breaks_ties_by_name_asc() {
        let p1 = PlayerId::new();
        let p2 = PlayerId::new();
        let players = HashMap::from([(p1, player(p1, "Zoe", 0)), (p2, player(p2, "Amy", 0))]);
        assert_eq!(select_round_leader(&players, &[]), Some(p2));
    }

    #[test]
    fn test_select_round_leader_never_repeats_previous_unless_forced() {
        let p1 = PlayerId::new();
        let p2 = PlayerId::new();
        let players = HashMap::from([(p1, player(p1, "Amy", 0)), (p2, player(p2, "Bob", 0))]);
        let history = vec![p1];
        assert_eq!(select_round_leader(&players, &history), Some(p2));
    }

    #[test]
    fn test_select_round_leader_repeats_when_only_candidate() {
        let p1 = PlayerId::new();
        let players = HashMap::from([(p1, player(p1, "Amy", 0))]);
        let history = vec![p1];
        assert_eq!(select_round_leader(&players, &history), Some(p1));
    }

    #[test]
    fn test_select_round_leader_none_when_no_connected_players() {
        let p1 = PlayerId::new();
        let mut players = HashMap::from([(p1, player(p1, "Amy", 0))]);
        players.get_mut(&p1).unwrap().connected = false;
        assert_eq!(select_round_leader(&players, &[]), None);
    }
}
