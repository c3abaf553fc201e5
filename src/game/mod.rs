//! Per-user game state: the hand, the pending-aware deck, and the service
//! that runs every operation against them.

mod endpoints;
pub mod hand;
pub mod service;
pub mod types;

pub use endpoints::{
    draw_cards, get_deck_info, get_game_state, okapi_add_operation_for_draw_cards_,
    okapi_add_operation_for_get_deck_info_, okapi_add_operation_for_get_game_state_,
    okapi_add_operation_for_place_pending_cards_, okapi_add_operation_for_play_card_,
    okapi_add_operation_for_update_game_size_, okapi_add_operation_for_update_hand_,
    place_pending_cards, play_card, update_game_size, update_hand,
};
pub use service::GameService;
