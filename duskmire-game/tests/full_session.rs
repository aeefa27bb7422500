//! End-to-end campaign: session start, the full day/night timeline, the
//! tournament endgame, and snapshot persistence along the way.

use duskmire_game::{
    CatalogData, Duel, EncounterOutcome, EventKind, GameSession, Notification, Roster,
    SessionPhase, SessionState, TickOutcome,
};

fn catalog() -> CatalogData {
    CatalogData::load_default()
}

fn party() -> Roster {
    let catalog = catalog();
    let mut roster = Roster::new();
    roster.add("Ana", "nyra", &catalog).unwrap();
    roster.add("Bea", "bram", &catalog).unwrap();
    roster.add("Cal", "sylva", &catalog).unwrap();
    roster.add("Dee", "orrin", &catalog).unwrap();
    roster
}

/// Run the campaign to its end, winning every encounter.
fn run_campaign(session: &mut GameSession) {
    for _ in 0..64 {
        if session.phase() != SessionPhase::InProgress {
            break;
        }
        let needs_fight = {
            let progress = session.state().progress.as_ref().unwrap();
            progress.time_of_day == EventKind::Day
                && !progress.monster_resolved
                && !progress.dungeon_closed_today(session.catalog())
                && progress.monster_deck.get(progress.monster_cursor).is_some()
        };
        if needs_fight {
            session.resolve_encounter(EncounterOutcome::Victory).unwrap();
        }
        if session.advance_tick().unwrap() == TickOutcome::TournamentSetup {
            break;
        }
    }
    assert_eq!(session.phase(), SessionPhase::Tournament, "campaign ended");
}

#[test]
fn campaign_reaches_the_tournament_and_crowns_a_champion() {
    let mut session = GameSession::start(catalog(), 0xD15C, party()).unwrap();
    run_campaign(&mut session);

    // Winning through the deck clears at least the weakest tier.
    let mut cleared_tiers = 0;
    while let Some(note) = session.acknowledge_notification() {
        if matches!(note, Notification::TierCleared { .. }) {
            cleared_tiers += 1;
        }
    }
    assert!(cleared_tiers >= 1, "no tier cleared over a full campaign");

    session.draw_seeds().unwrap();
    session.start_bracket().unwrap();

    for _ in 0..8 {
        if session.phase() == SessionPhase::Champion {
            break;
        }
        let next = session
            .state()
            .tournament
            .as_ref()
            .unwrap()
            .rounds
            .iter()
            .flat_map(|round| round.matches.iter())
            .find(|m| m.is_ready())
            .map(|m| {
                (
                    m.id,
                    m.slots[0].player().unwrap(),
                    m.slots[1].player().unwrap(),
                )
            });
        let (match_id, home, away) = next.expect("a playable match remains");
        let mut duel = Duel::for_match(home, away, match_id).unwrap();
        duel.set_scores(7, 3);
        session.declare_duel_winner(&mut duel).unwrap();
        if session.state().pending_steal.is_some() {
            session.resolve_steal(None).unwrap();
        }
    }

    assert_eq!(session.phase(), SessionPhase::Champion);
    let champion = session.champion().expect("champion declared");
    assert!(session.state().roster.get(champion).is_some());
}

#[test]
fn day_counter_never_passes_the_cap() {
    let mut session = GameSession::start(catalog(), 7, party()).unwrap();
    run_campaign(&mut session);
    let progress = session.state().progress.as_ref().unwrap();
    assert!(progress.day <= 12);
}

#[test]
fn mid_campaign_snapshot_resumes_identically() {
    let mut session = GameSession::start(catalog(), 0xBEEF, party()).unwrap();
    for _ in 0..5 {
        let needs_fight = {
            let progress = session.state().progress.as_ref().unwrap();
            progress.time_of_day == EventKind::Day
                && !progress.monster_resolved
                && !progress.dungeon_closed_today(session.catalog())
                && progress.monster_deck.get(progress.monster_cursor).is_some()
        };
        if needs_fight {
            session.resolve_encounter(EncounterOutcome::Victory).unwrap();
        }
        session.advance_tick().unwrap();
    }

    let json = serde_json::to_string(session.state()).unwrap();
    let snapshot: SessionState = serde_json::from_str(&json).unwrap();
    let mut resumed = GameSession::from_state(catalog(), snapshot).unwrap();
    assert_eq!(resumed.state(), session.state());

    // Both copies observe the same timeline from here on.
    assert_eq!(
        resumed.advance_tick().unwrap(),
        session.advance_tick().unwrap()
    );
    assert_eq!(resumed.state(), session.state());
}
