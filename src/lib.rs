//! # Hide and Seek Deck
//!
//! Backend for the hider's deck in a hide-and-seek card game.
//!
//! ## Overview
//!
//! Every user owns one game: a fixed-size hand, a deck built from the card
//! catalog for the chosen difficulty, and a discard pile. Drawing for a
//! question marks cards as pending in the deck; the next hand update keeps
//! some of them and returns the rest. Playing a card resolves its effect
//! (plain discard, curse with a casting cost, or discard-and-draw) in one
//! atomic step.
//!
//! ## Architecture
//!
//! The HTTP layer is a thin Rocket application with OpenAPI documentation.
//! All game rules live in [`game::GameService`], which serializes requests per
//! user and records every mutation in the [`history::HistoryLog`].

// Rocket makes this a bit tricky to support
#![allow(clippy::module_name_repetitions)]
#[macro_use]
extern crate rocket;

use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::{make_swagger_ui, SwaggerUIConfig};

pub mod catalog;
pub mod config;
pub mod deck;
pub mod error;
pub mod game;
pub mod history;
pub mod repository;
pub mod status_messages;

use crate::config::GameConfig;
use crate::game::GameService;

/// Lock a mutex, recovering the data if a holder panicked.
pub(crate) fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(g) => g,
        Err(e) => e.into_inner(),
    }
}

/// Builds the Rocket server, reading the game configuration from the
/// environment and Rocket's own figment.
///
/// # Example
///
/// ```no_run
/// use hideseek_deck::rocket_initialize;
///
/// #[rocket::main]
/// async fn main() {
///     let _ = rocket_initialize().launch().await;
/// }
/// ```
pub fn rocket_initialize() -> rocket::Rocket<rocket::Build> {
    #[allow(clippy::no_effect_underscore_binding)]
    let _ = env_logger::try_init();

    let config = GameConfig::from_figment(&rocket::Config::figment());
    match GameService::from_config(config) {
        Ok(service) => rocket_with_service(service),
        Err(e) => {
            log::error!("game service failed to start: {e}");
            rocket::build().attach(rocket::fairing::AdHoc::try_on_ignite(
                "game-service",
                |rocket| async move { Err(rocket) },
            ))
        }
    }
}

/// Builds the Rocket server around an already constructed service.
pub fn rocket_with_service(service: GameService) -> rocket::Rocket<rocket::Build> {
    use crate::catalog::{
        list_cards, okapi_add_operation_for_list_cards_, okapi_add_operation_for_practice_draw_,
        practice_draw,
    };
    use crate::game::{
        draw_cards, get_deck_info, get_game_state, okapi_add_operation_for_draw_cards_,
        okapi_add_operation_for_get_deck_info_, okapi_add_operation_for_get_game_state_,
        okapi_add_operation_for_place_pending_cards_, okapi_add_operation_for_play_card_,
        okapi_add_operation_for_update_game_size_, okapi_add_operation_for_update_hand_,
        place_pending_cards, play_card, update_game_size, update_hand,
    };
    use crate::history::{
        get_statistics, list_history, okapi_add_operation_for_get_statistics_,
        okapi_add_operation_for_list_history_, okapi_add_operation_for_reset_progress_,
        reset_progress,
    };
    use rocket::fairing::AdHoc;

    rocket::build()
        .mount(
            "/",
            openapi_get_routes![
                get_game_state,
                draw_cards,
                update_hand,
                update_game_size,
                play_card,
                place_pending_cards,
                get_deck_info,
                get_statistics,
                list_history,
                reset_progress,
                list_cards,
                practice_draw
            ],
        )
        .mount("/swagger", make_swagger_ui(&get_docs()))
        .manage(service)
        .attach(AdHoc::on_shutdown("history-shutdown", |rocket| {
            Box::pin(async move {
                // Flush queued history lines before the process exits.
                if let Some(service) = rocket.state::<GameService>() {
                    service.shutdown();
                }
            })
        }))
}

fn get_docs() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: "/openapi.json".to_string(),
        ..Default::default()
    }
}
