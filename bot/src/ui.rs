//! Keyboard builders. The persistent reply keyboard is the main surface;
//! cases go through inline keyboards so the menu message can be swapped
//! out mid-flow.

use clutch_types::Catalog;

use crate::telegram::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, ReplyKeyboardMarkup, ReplyMarkup,
};
use crate::texts;

fn button(text: &str) -> KeyboardButton {
    KeyboardButton {
        text: text.to_string(),
    }
}

pub fn main_menu() -> ReplyMarkup {
    ReplyMarkup::Keyboard(ReplyKeyboardMarkup {
        keyboard: vec![
            vec![button(texts::BTN_PLAY), button(texts::BTN_STATS)],
            vec![
                button(texts::BTN_TOP),
                button(texts::BTN_CASES),
                button(texts::BTN_HELP),
            ],
        ],
        resize_keyboard: true,
    })
}

pub fn choice_menu() -> ReplyMarkup {
    ReplyMarkup::Keyboard(ReplyKeyboardMarkup {
        keyboard: vec![vec![
            button(texts::BTN_TEAM_T),
            button(texts::BTN_TEAM_CT),
            button(texts::BTN_BACK),
        ]],
        resize_keyboard: true,
    })
}

/// One row per case in catalog order, then the back button.
pub fn cases_menu(catalog: &Catalog) -> ReplyMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = catalog
        .cases
        .iter()
        .map(|case| {
            vec![InlineKeyboardButton {
                text: texts::case_button_label(&case.name, case.price),
                callback_data: format!("case_{}", case.id),
            }]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton {
        text: texts::BTN_BACK.to_string(),
        callback_data: "back_to_main".to_string(),
    }]);
    ReplyMarkup::Inline(InlineKeyboardMarkup {
        inline_keyboard: rows,
    })
}

pub fn open_button(case_id: &str) -> ReplyMarkup {
    ReplyMarkup::Inline(InlineKeyboardMarkup {
        inline_keyboard: vec![vec![InlineKeyboardButton {
            text: texts::BTN_OPEN_CASE.to_string(),
            callback_data: format!("open_{case_id}"),
        }]],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_menu_layout() {
        let ReplyMarkup::Keyboard(menu) = main_menu() else {
            panic!("main menu must be a reply keyboard");
        };
        assert!(menu.resize_keyboard);
        assert_eq!(menu.keyboard.len(), 2);
        assert_eq!(menu.keyboard[0].len(), 2);
        assert_eq!(menu.keyboard[1].len(), 3);
        assert_eq!(menu.keyboard[0][0].text, texts::BTN_PLAY);
    }

    #[test]
    fn test_cases_menu_tracks_catalog_order() {
        let ReplyMarkup::Inline(menu) = cases_menu(&Catalog::builtin()) else {
            panic!("cases menu must be inline");
        };
        assert_eq!(menu.inline_keyboard.len(), 4);
        assert_eq!(
            menu.inline_keyboard[0][0].text,
            "Оружейный кейс - 80 очков"
        );
        assert_eq!(menu.inline_keyboard[0][0].callback_data, "case_weapon_case");
        assert_eq!(
            menu.inline_keyboard[3][0].callback_data,
            "back_to_main"
        );
    }

    #[test]
    fn test_open_button_carries_case_id() {
        let ReplyMarkup::Inline(markup) = open_button("fire_case") else {
            panic!("open button must be inline");
        };
        assert_eq!(markup.inline_keyboard[0][0].callback_data, "open_fire_case");
    }
}
