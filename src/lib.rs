//! Single-screen Pokédex card: fetch one Pokémon from PokéAPI by number
//! (or at random) and show its sprite, stats and localized description.

pub mod config;
pub mod error;
pub mod fetch;
pub mod identifier;
pub mod logging;
pub mod models;
pub mod projector;
pub mod state;
pub mod ui;
pub mod utils;

pub use config::Settings;
pub use error::{FetchError, ValidationError};
pub use fetch::PokeApiClient;
pub use identifier::{validate, Identifier};
pub use models::DisplayModel;
pub use projector::project;
