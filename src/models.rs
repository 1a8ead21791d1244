use serde::Deserialize;

/// `{ "name": ..., "url": ... }` reference used all over PokéAPI.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct NamedResource {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Body of `GET /pokemon/{id}`. Only the fields the card needs are kept.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PrimaryRecord {
    pub id: u32,
    pub name: String,
    pub sprites: Sprites,
    pub stats: Vec<StatEntry>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Sprites {
    #[serde(default)]
    pub front_default: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StatEntry {
    pub base_stat: u32,
    pub stat: NamedResource,
}

/// Body of `GET /pokemon-species/{id}`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SpeciesRecord {
    pub flavor_text_entries: Vec<FlavorTextEntry>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FlavorTextEntry {
    pub flavor_text: String,
    pub language: NamedResource,
}

/// Everything the card shows, flattened out of the two raw records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayModel {
    pub id: u32,
    pub image: Option<String>,
    pub name: String,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special: u32,
    pub description: String,
}
