use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

pub type CardId = u32;

/// The three kinds of card in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum CardType {
    #[serde(rename = "Time Bonus")]
    TimeBonus,
    Action,
    Curse,
}

impl CardType {
    pub fn label(&self) -> &'static str {
        match self {
            CardType::TimeBonus => "Time Bonus",
            CardType::Action => "Action",
            CardType::Curse => "Curse",
        }
    }
}

/// Difficulty tier selected by the game size: 3 → Small, 4 → Medium, 5 → Large.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub enum Difficulty {
    Small,
    Medium,
    Large,
}

impl Difficulty {
    /// Anything outside 3..=5 is treated as Large.
    pub fn from_game_size(game_size: u8) -> Self {
        match game_size {
            3 => Difficulty::Small,
            4 => Difficulty::Medium,
            _ => Difficulty::Large,
        }
    }
}

/// What a curse demands before its text applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", default)]
pub struct CastingCost {
    pub discard: usize,
    pub photo: bool,
    pub location: bool,
    pub die_roll: bool,
}

/// How playing a card resolves. Resolved once when the catalog is loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "kind")]
pub enum EffectKind {
    #[default]
    SimpleDiscard,
    CurseCast {
        discard: usize,
    },
    ChainedDraw {
        discard: usize,
        draw: usize,
    },
}

impl EffectKind {
    pub fn classify(card: &Card) -> Self {
        if card.card_type == CardType::Curse {
            let discard = card.casting_cost.as_ref().map_or(0, |c| c.discard);
            return EffectKind::CurseCast { discard };
        }
        match card.name.as_deref().and_then(parse_discard_draw) {
            Some((discard, draw)) => EffectKind::ChainedDraw { discard, draw },
            None => EffectKind::SimpleDiscard,
        }
    }
}

/// Parses names of the form "Discard N Draw M".
fn parse_discard_draw(name: &str) -> Option<(usize, usize)> {
    let mut words = name.split_whitespace();
    if !words.next()?.eq_ignore_ascii_case("discard") {
        return None;
    }
    let discard = words.next()?.parse().ok()?;
    if !words.next()?.eq_ignore_ascii_case("draw") {
        return None;
    }
    let draw = words.next()?.parse().ok()?;
    if words.next().is_some() || discard == 0 || draw == 0 {
        return None;
    }
    Some((discard, draw))
}

/// A card definition as it appears in the catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Card {
    pub id: CardId,
    #[serde(rename = "Type")]
    pub card_type: CardType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Copies of this card in a freshly built deck.
    #[serde(rename = "cards")]
    pub weight: u32,
    #[serde(rename = "Small", default)]
    pub small: u32,
    #[serde(rename = "Medium", default)]
    pub medium: u32,
    #[serde(rename = "Large", default)]
    pub large: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curse_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub casting_cost: Option<CastingCost>,
    /// Resolved by the catalog on load; never read from or written to JSON.
    #[serde(skip)]
    pub effect: EffectKind,
}

impl Card {
    pub fn value(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Small => self.small,
            Difficulty::Medium => self.medium,
            Difficulty::Large => self.large,
        }
    }

    /// Action and Curse cards are always in play; Time Bonus cards only when
    /// they are worth something at this difficulty.
    pub fn is_eligible(&self, difficulty: Difficulty) -> bool {
        matches!(self.card_type, CardType::Action | CardType::Curse) || self.value(difficulty) > 0
    }

    /// Key used when grouping a deck for display: "Type (color)" or the bare type.
    pub fn composition_key(&self) -> String {
        match &self.color {
            Some(color) => format!("{} ({})", self.card_type.label(), color),
            None => self.card_type.label().to_string(),
        }
    }
}

/// Curse details handed back to the caller when a curse is cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct CurseData {
    pub name: Option<String>,
    pub curse_text: Option<String>,
    pub casting_cost: Option<CastingCost>,
}

impl From<&Card> for CurseData {
    fn from(card: &Card) -> Self {
        CurseData {
            name: card.name.clone(),
            curse_text: card.curse_text.clone(),
            casting_cost: card.casting_cost.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(name: &str) -> Card {
        Card {
            id: 1,
            card_type: CardType::Action,
            color: None,
            name: Some(name.to_string()),
            weight: 1,
            small: 0,
            medium: 0,
            large: 0,
            description: None,
            curse_text: None,
            casting_cost: None,
            effect: EffectKind::SimpleDiscard,
        }
    }

    #[test]
    fn classifies_discard_draw_names() {
        assert_eq!(
            EffectKind::classify(&action("Discard 1 Draw 2")),
            EffectKind::ChainedDraw {
                discard: 1,
                draw: 2
            }
        );
        assert_eq!(
            EffectKind::classify(&action("Discard 2 Draw 3")),
            EffectKind::ChainedDraw {
                discard: 2,
                draw: 3
            }
        );
        assert_eq!(
            EffectKind::classify(&action("Veto")),
            EffectKind::SimpleDiscard
        );
        assert_eq!(
            EffectKind::classify(&action("Discard 0 Draw 2")),
            EffectKind::SimpleDiscard
        );
    }

    #[test]
    fn curse_takes_discard_from_casting_cost() {
        let mut curse = action("Curse of Something");
        curse.card_type = CardType::Curse;
        assert_eq!(
            EffectKind::classify(&curse),
            EffectKind::CurseCast { discard: 0 }
        );
        curse.casting_cost = Some(CastingCost {
            discard: 2,
            ..CastingCost::default()
        });
        assert_eq!(
            EffectKind::classify(&curse),
            EffectKind::CurseCast { discard: 2 }
        );
    }

    #[test]
    fn catalog_json_keys_deserialize() {
        let json = r#"{ "id": 7, "Type": "Time Bonus", "color": "Red", "cards": 3,
                        "Small": 2, "Medium": 0, "Large": 5 }"#;
        let card: Card = rocket::serde::json::from_str(json).expect("valid card json");
        assert_eq!(card.card_type, CardType::TimeBonus);
        assert_eq!(card.weight, 3);
        assert!(card.is_eligible(Difficulty::Small));
        assert!(!card.is_eligible(Difficulty::Medium));
        assert_eq!(card.composition_key(), "Time Bonus (Red)");
    }

    #[test]
    fn effect_stays_out_of_json() {
        let mut card = action("Discard 1 Draw 2");
        card.effect = EffectKind::classify(&card);
        let json = serde_json::to_string(&card).expect("serializable");
        assert!(!json.contains("effect"));
        assert!(!json.contains("ChainedDraw"));

        let forged = r#"{ "id": 1, "Type": "Action", "name": "Veto", "cards": 1,
                          "effect": { "kind": "ChainedDraw", "discard": 1, "draw": 9 } }"#;
        let card: Card = rocket::serde::json::from_str(forged).expect("valid card json");
        assert_eq!(card.effect, EffectKind::SimpleDiscard);
    }
}
