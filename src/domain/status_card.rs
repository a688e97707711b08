// Status card metadata shown beside the charts
use super::theme::ThemeName;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSettings {
    pub title: &'static str,
    pub icon_class: &'static str,
    #[serde(rename = "type")]
    pub card_type: &'static str,
}

const LIGHT: CardSettings = CardSettings {
    title: "Light",
    icon_class: "nb-lightbulb",
    card_type: "primary",
};

const ROLLER_SHADES: CardSettings = CardSettings {
    title: "Roller Shades",
    icon_class: "nb-roller-shades",
    card_type: "success",
};

const WIRELESS_AUDIO: CardSettings = CardSettings {
    title: "Wireless Audio",
    icon_class: "nb-audio",
    card_type: "info",
};

const COFFEE_MAKER: CardSettings = CardSettings {
    title: "Coffee Maker",
    icon_class: "nb-coffee-maker",
    card_type: "warning",
};

/// Card layout variant for a theme.
pub fn status_cards_for(theme: ThemeName) -> Vec<CardSettings> {
    let common = [LIGHT, ROLLER_SHADES, WIRELESS_AUDIO, COFFEE_MAKER];
    match theme {
        ThemeName::Default | ThemeName::Cosmic => common.to_vec(),
        ThemeName::Corporate => {
            let types = ["warning", "primary", "danger", "secondary"];
            common
                .into_iter()
                .zip(types)
                .map(|(card, card_type)| CardSettings { card_type, ..card })
                .collect()
        }
    }
}
