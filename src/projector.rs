//! Reduce the two raw PokéAPI records into the card model.

use crate::error::FetchError;
use crate::models::{DisplayModel, PrimaryRecord, SpeciesRecord, StatEntry};

pub const NO_DESCRIPTION: &str = "No description available.";
pub const NO_DESCRIPTION_ES: &str = "No hay descripción disponible.";

/// Fallback text shown when no flavor text exists in `language`.
pub fn no_description(language: &str) -> &'static str {
    match language {
        "es" => NO_DESCRIPTION_ES,
        _ => NO_DESCRIPTION,
    }
}

pub fn project(
    primary: &PrimaryRecord,
    species: &SpeciesRecord,
    language: &str,
) -> Result<DisplayModel, FetchError> {
    let stats = &primary.stats;
    Ok(DisplayModel {
        id: primary.id,
        image: primary.sprites.front_default.clone(),
        name: primary.name.clone(),
        hp: base_stat(stats, "hp")?,
        attack: base_stat(stats, "attack")?,
        defense: base_stat(stats, "defense")?,
        special: base_stat(stats, "special-attack")?,
        description: description(species, language),
    })
}

/// Looks a stat up by its API name rather than by position.
fn base_stat(stats: &[StatEntry], name: &str) -> Result<u32, FetchError> {
    stats
        .iter()
        .find(|s| s.stat.name == name)
        .map(|s| s.base_stat)
        .ok_or_else(|| FetchError::Decode(format!("missing `{}` stat", name)))
}

/// First flavor text in `language`, in the order the provider sent them.
pub fn description(species: &SpeciesRecord, language: &str) -> String {
    species
        .flavor_text_entries
        .iter()
        .find(|e| e.language.name == language)
        .map(|e| e.flavor_text.clone())
        .unwrap_or_else(|| no_description(language).to_string())
}
