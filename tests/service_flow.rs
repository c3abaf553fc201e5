use std::sync::Arc;

use hideseek_deck::catalog::types::{Card, CardId};
use hideseek_deck::catalog::Catalog;
use hideseek_deck::config::GameConfig;
use hideseek_deck::deck::pending_count;
use hideseek_deck::error::{GameError, PositionFault};
use hideseek_deck::game::GameService;
use hideseek_deck::history::types::{HistoryPayload, HistoryQuery, Statistics};
use hideseek_deck::history::HistoryLog;

fn seeded_config() -> GameConfig {
    GameConfig {
        rng_seed: Some(42),
        ..GameConfig::default()
    }
}

fn service() -> GameService {
    GameService::from_config(seeded_config()).expect("service starts")
}

fn card(service: &GameService, id: CardId) -> Card {
    service.catalog().get(id).expect("card in catalog").clone()
}

/// Give `user` a hand of the listed card ids, padded with empty slots.
fn deal(service: &GameService, user: u64, ids: &[CardId]) {
    service.get_or_create_state(user).expect("state");
    let mut hand: Vec<Option<Card>> = ids.iter().map(|id| Some(card(service, *id))).collect();
    hand.resize(service.config().hand_size, None);
    service.update_hand(user, &hand).expect("deal hand");
}

#[test]
fn new_state_uses_configured_sizes() {
    let service = service();
    let state = service.get_or_create_state(1).expect("state");
    assert_eq!(state.hand, vec![None; 5]);
    assert_eq!(state.game_size, 5);
    assert!(state.deck.is_empty());
    assert!(state.discard_pile.is_empty());
}

#[test]
fn draw_marks_cards_pending_and_hand_update_keeps_one() {
    let service = service();
    service.get_or_create_state(1).expect("state");

    let drawn = service.draw_cards(1, "MATCHING").expect("draw");
    assert_eq!(drawn.count, 3);
    assert_eq!(drawn.pick_count, 1);
    assert_eq!(drawn.cards.len(), 3);

    let state = service.get_or_create_state(1).expect("state");
    assert_eq!(state.deck.len(), 79);
    assert_eq!(pending_count(&state.deck), 3);

    let mut hand = vec![None; 5];
    hand[0] = Some(drawn.cards[0].clone());
    let state = service.update_hand(1, &hand).expect("update");
    assert_eq!(state.deck.len(), 78);
    assert_eq!(pending_count(&state.deck), 0);
    assert_eq!(state.hand[0].as_ref().map(|c| c.id), Some(drawn.cards[0].id));
}

#[test]
fn rearranging_the_hand_returns_pending_cards() {
    let service = service();
    service.get_or_create_state(1).expect("state");
    let first = service.draw_cards(1, "PHOTOS").expect("draw");
    let mut hand = vec![None; 5];
    hand[0] = Some(first.cards[0].clone());
    service.update_hand(1, &hand).expect("keep");

    service.draw_cards(1, "TENTACLES").expect("second draw");
    hand.swap(0, 3);
    let state = service.update_hand(1, &hand).expect("rearrange");
    assert_eq!(state.deck.len(), 78);
    assert_eq!(pending_count(&state.deck), 0);
}

#[test]
fn second_draw_replaces_the_pending_batch() {
    let service = service();
    service.draw_cards(2, "TENTACLES").expect("draw");
    service.draw_cards(2, "RADAR").expect("draw");
    let state = service.get_or_create_state(2).expect("state");
    assert_eq!(state.deck.len(), 79);
    assert_eq!(pending_count(&state.deck), 2);
}

#[test]
fn hand_update_is_validated() {
    let service = service();
    assert!(matches!(
        service.update_hand(9, &vec![None; 5]),
        Err(GameError::NotFound(_))
    ));

    service.get_or_create_state(9).expect("state");
    assert!(matches!(
        service.update_hand(9, &vec![None; 4]),
        Err(GameError::Validation(_))
    ));

    let mut unknown = card(&service, 1);
    unknown.id = 999;
    let mut hand = vec![None; 5];
    hand[2] = Some(unknown);
    assert!(matches!(
        service.update_hand(9, &hand),
        Err(GameError::Validation(_))
    ));
}

#[test]
fn client_card_fields_are_replaced_by_catalog_values() {
    let service = service();
    service.get_or_create_state(1).expect("state");
    let mut forged = card(&service, 1);
    forged.large = 1000;
    forged.name = Some("Forged".to_string());
    let mut hand = vec![None; 5];
    hand[0] = Some(forged);
    let state = service.update_hand(1, &hand).expect("update");
    assert_eq!(state.hand[0], Some(card(&service, 1)));
}

#[test]
fn curse_needs_exact_discards_and_leaves_state_on_failure() {
    let service = service();
    // Jammed Door costs two discards.
    deal(&service, 1, &[15, 1, 2]);
    let before = service.get_or_create_state(1).expect("state");

    assert!(matches!(
        service.play_card(1, 0, &[1]),
        Err(GameError::Validation(_))
    ));
    assert!(matches!(
        service.play_card(1, 0, &[1, 1]),
        Err(GameError::Validation(_))
    ));
    assert_eq!(
        service.play_card(1, 0, &[1, 3]),
        Err(GameError::position(3, PositionFault::EmptySlot))
    );
    assert_eq!(
        service.play_card(1, 0, &[0, 1]),
        Err(GameError::position(0, PositionFault::PlayedCard))
    );
    assert_eq!(service.get_or_create_state(1).expect("state"), before);
    assert_eq!(service.statistics(1).expect("stats").cards_played, 0);

    let result = service.play_card(1, 0, &[1, 2]).expect("curse cast");
    let curse = result.curse_data.expect("curse data");
    assert_eq!(curse.name.as_deref(), Some("Curse of the Jammed Door"));
    assert_eq!(result.state.hand, vec![None; 5]);
    let pile: Vec<CardId> = result.state.discard_pile.iter().map(|c| c.id).collect();
    assert_eq!(pile, vec![1, 2, 15]);
    assert_eq!(service.statistics(1).expect("stats").cards_played, 1);
}

#[test]
fn free_curse_casts_without_discards() {
    let service = service();
    deal(&service, 1, &[16]);
    let result = service.play_card(1, 0, &[]).expect("cast");
    assert!(result.curse_data.is_some());
    assert_eq!(result.state.discard_pile.len(), 1);
}

#[test]
fn chained_draw_auto_places_into_free_slots() {
    let service = service();
    deal(&service, 1, &[10, 1, 2]);

    let result = service.play_card(1, 0, &[1]).expect("play");
    assert_eq!(result.drawn_cards.len(), 2);
    assert!(result.auto_placed);
    assert_eq!(result.placed_positions, vec![0, 1]);
    assert_eq!(result.state.deck.len(), 77);
    assert_eq!(
        result.state.hand[0].as_ref().map(|c| c.id),
        Some(result.drawn_cards[0].id)
    );
    let pile: Vec<CardId> = result.state.discard_pile.iter().map(|c| c.id).collect();
    assert_eq!(pile, vec![1, 10]);

    let stats = service.statistics(1).expect("stats");
    assert_eq!(stats.cards_drawn, 2);
    assert_eq!(stats.cards_played, 1);
}

#[test]
fn play_rejects_bad_hand_positions() {
    let service = service();
    deal(&service, 1, &[1]);
    assert_eq!(
        service.play_card(1, 7, &[]).map(|r| r.played),
        Err(GameError::position(7, PositionFault::OutOfBounds))
    );
    assert_eq!(
        service.play_card(1, 3, &[]).map(|r| r.played),
        Err(GameError::position(3, PositionFault::EmptySlot))
    );
    assert!(matches!(
        service.play_card(42, 0, &[]),
        Err(GameError::NotFound(_))
    ));
}

#[test]
fn simple_card_goes_to_discard_pile() {
    let service = service();
    deal(&service, 1, &[7]);
    let result = service.play_card(1, 0, &[]).expect("play");
    assert!(result.drawn_cards.is_empty());
    assert!(!result.auto_placed);
    assert_eq!(result.state.hand[0], None);
    assert_eq!(result.state.discard_pile, vec![card(&service, 7)]);
}

#[test]
fn pending_cards_are_placed_after_discards() {
    let service = service();
    deal(&service, 1, &[1, 2, 3, 6, 7]);
    let red = card(&service, 1);
    let state = service
        .place_pending_cards(1, &[red.clone()], &[4])
        .expect("place");
    assert_eq!(state.hand[4], Some(red));
    assert_eq!(state.discard_pile, vec![card(&service, 7)]);

    assert!(matches!(
        service.place_pending_cards(1, &[card(&service, 2)], &[]),
        Err(GameError::Validation(_))
    ));
}

#[test]
fn game_size_change_rebuilds_deck_and_keeps_hand() {
    let service = service();
    deal(&service, 1, &[5]);
    service.draw_cards(1, "MATCHING").expect("draw");

    let state = service.update_game_size(1, 3).expect("resize");
    assert_eq!(state.game_size, 3);
    assert_eq!(state.deck.len(), 74);
    assert_eq!(pending_count(&state.deck), 0);
    assert_eq!(state.hand[0], Some(card(&service, 5)));
    assert!(state.deck.iter().all(|c| c.card.id != 4 && c.card.id != 5));

    assert!(matches!(
        service.update_game_size(1, 6),
        Err(GameError::Validation(_))
    ));
}

#[test]
fn exhausted_deck_leaves_state_and_counters_alone() {
    let catalog = Catalog::from_json(
        r#"[{ "id": 1, "Type": "Action", "name": "Veto", "cards": 2 }]"#,
    )
    .expect("catalog");
    let service = GameService::in_memory(
        seeded_config(),
        Arc::new(catalog),
        Arc::new(HistoryLog::new()),
    )
    .expect("service");

    service.draw_cards(1, "THERMOMETER").expect("two cards fit");
    let before = service.get_or_create_state(1).expect("state");
    let history_before = service.history().len();

    assert_eq!(
        service.draw_cards(1, "MATCHING"),
        Err(GameError::DeckExhausted {
            requested: 3,
            available: 2
        })
    );
    assert_eq!(service.get_or_create_state(1).expect("state"), before);
    assert_eq!(service.statistics(1).expect("stats").cards_drawn, 2);
    assert_eq!(service.history().len(), history_before);
}

#[test]
fn every_mutation_records_one_history_entry() {
    let service = service();
    deal(&service, 1, &[7, 1]);
    service.draw_cards(1, "RADAR").expect("draw");
    service.update_game_size(1, 4).expect("resize");
    service.play_card(1, 0, &[]).expect("play");
    service
        .place_pending_cards(1, &[card(&service, 2)], &[1])
        .expect("place");

    let actions: Vec<String> = service
        .user_history(1, &HistoryQuery::default())
        .into_iter()
        .map(|e| e.action_type)
        .collect();
    assert_eq!(
        actions,
        vec![
            "place_pending_cards",
            "play_card",
            "update_game_size",
            "draw",
            "update_hand"
        ]
    );
}

#[test]
fn reset_archives_then_starts_fresh() {
    let service = service();
    deal(&service, 1, &[7, 1]);
    service.update_game_size(1, 4).expect("resize");
    service.draw_cards(1, "MATCHING").expect("draw");
    service.play_card(1, 0, &[]).expect("play");

    let archive = service.reset_progress(1).expect("reset");
    match archive.payload {
        HistoryPayload::ResetArchive {
            game_state: Some(snapshot),
            statistics: Some(stats),
        } => {
            assert_eq!(snapshot.game_size, 4);
            assert_eq!(snapshot.discard_pile.len(), 1);
            assert_eq!(stats.cards_drawn, 3);
            assert_eq!(stats.cards_played, 1);
        }
        other => panic!("unexpected archive payload: {other:?}"),
    }

    let state = service.get_or_create_state(1).expect("state");
    assert_eq!(state.hand, vec![None; 5]);
    assert_eq!(state.game_size, 4);
    assert!(state.deck.is_empty());
    assert!(state.discard_pile.is_empty());
    assert_eq!(service.statistics(1).expect("stats"), Statistics::default());
}

#[test]
fn reset_without_prior_game_creates_one() {
    let service = service();
    let archive = service.reset_progress(5).expect("reset");
    assert_eq!(
        archive.payload,
        HistoryPayload::ResetArchive {
            game_state: None,
            statistics: None
        }
    );
    assert_eq!(service.get_or_create_state(5).expect("state").game_size, 5);
}

#[test]
fn concurrent_draws_for_one_user_keep_a_single_batch() {
    let service = service();
    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..10 {
                    service.draw_cards(1, "MATCHING").expect("draw");
                    service.draw_cards(2, "PHOTOS").expect("draw");
                }
            });
        }
    });

    let state = service.get_or_create_state(1).expect("state");
    assert_eq!(state.deck.len(), 79);
    assert_eq!(pending_count(&state.deck), 3);
    assert_eq!(service.statistics(1).expect("stats").cards_drawn, 240);
    assert_eq!(service.statistics(2).expect("stats").cards_drawn, 80);
    assert_eq!(service.history().len(), 160);
}

#[test]
fn practice_draw_touches_no_state() {
    let service = service();
    let cards = service.practice_draw(3, 10).expect("practice");
    assert_eq!(cards.len(), 10);
    assert!(cards.iter().all(|c| c.id != 4 && c.id != 5));
    assert!(service.history().is_empty());
    assert!(matches!(
        service.practice_draw(9, 1),
        Err(GameError::Validation(_))
    ));
}
