use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single catalog record as the gallery reads it.
///
/// The proxy never builds these; it forwards raw records. The gallery decodes
/// them leniently so one odd record cannot sink the page.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub elixir_cost: Option<u32>,
    #[serde(default)]
    pub icon_urls: IconUrls,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub hitpoints: Option<u32>,
    #[serde(default)]
    pub damage: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct IconUrls {
    #[serde(default)]
    pub medium: Option<String>,
}

impl Card {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Card::deserialize(value)
    }

    /// Icon to display, if the record has a usable one.
    pub fn icon(&self) -> Option<&str> {
        self.icon_urls
            .medium
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Champion,
    #[default]
    Unknown,
    Other(String),
}

impl Rarity {
    /// Matches catalog tags case-insensitively; anything else is kept as `Other`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "common" => Rarity::Common,
            "rare" => Rarity::Rare,
            "epic" => Rarity::Epic,
            "legendary" => Rarity::Legendary,
            "champion" => Rarity::Champion,
            "" => Rarity::Unknown,
            _ => Rarity::Other(tag.to_string()),
        }
    }

    /// CSS class for the tile border and background.
    pub fn style_class(&self) -> &'static str {
        match self {
            Rarity::Common => "rarity-common",
            Rarity::Rare => "rarity-rare",
            Rarity::Epic => "rarity-epic",
            Rarity::Legendary => "rarity-legendary",
            Rarity::Champion => "rarity-champion",
            Rarity::Unknown | Rarity::Other(_) => "rarity-default",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::Champion => "Champion",
            Rarity::Unknown => "Unknown",
            Rarity::Other(tag) => tag,
        }
    }
}

impl<'de> Deserialize<'de> for Rarity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(tag.map(|t| Rarity::from_tag(&t)).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_troop_card() {
        let value = json!({
            "id": 26000000,
            "name": "Knight",
            "elixirCost": 3,
            "iconUrls": { "medium": "https://api-assets.clashroyale.com/cards/300/knight.png" },
            "rarity": "common",
            "hitpoints": 1452,
            "damage": 167,
            "maxLevel": 14
        });
        let card = Card::from_value(&value).unwrap();

        assert_eq!(card.id, 26000000);
        assert_eq!(card.name, "Knight");
        assert_eq!(card.elixir_cost, Some(3));
        assert_eq!(card.rarity, Rarity::Common);
        assert_eq!(card.hitpoints, Some(1452));
        assert_eq!(card.damage, Some(167));
        assert!(card.icon().is_some());
    }

    #[test]
    fn test_decode_spell_without_stats_or_cost() {
        let value = json!({
            "id": 28000006,
            "name": "Mirror",
            "iconUrls": { "medium": "https://example.test/mirror.png" },
            "rarity": "Epic"
        });
        let card = Card::from_value(&value).unwrap();

        assert_eq!(card.elixir_cost, None);
        assert_eq!(card.hitpoints, None);
        assert_eq!(card.damage, None);
        assert_eq!(card.rarity, Rarity::Epic);
    }

    #[test]
    fn test_missing_icon_has_no_icon() {
        let card = Card::from_value(&json!({ "id": 1, "name": "Ghost" })).unwrap();
        assert_eq!(card.icon(), None);

        let card = Card::from_value(&json!({ "id": 2, "name": "Blank", "iconUrls": { "medium": "" } })).unwrap();
        assert_eq!(card.icon(), None);
    }

    #[test]
    fn test_record_without_id_is_rejected() {
        assert!(Card::from_value(&json!({ "name": "Nameless" })).is_err());
    }

    #[test]
    fn test_rarity_styles_have_default_branch() {
        assert_eq!(Rarity::from_tag("Legendary").style_class(), "rarity-legendary");
        assert_eq!(Rarity::from_tag("CHAMPION").style_class(), "rarity-champion");
        assert_eq!(Rarity::from_tag("mythic").style_class(), "rarity-default");
        assert_eq!(Rarity::from_tag("mythic").label(), "mythic");
        assert_eq!(Rarity::default().style_class(), "rarity-default");
    }

    #[test]
    fn test_null_rarity_is_unknown() {
        let card = Card::from_value(&json!({ "id": 3, "name": "Odd", "rarity": null })).unwrap();
        assert_eq!(card.rarity, Rarity::Unknown);
    }
}
