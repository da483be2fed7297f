//! Reply and inline keyboards.

use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
    KeyboardRemove,
};

pub const CB_CONFIRM_ADD: &str = "confirm_add";
pub const CB_REGENERATE: &str = "regenerate_codes";
pub const CB_CANCEL_ADD: &str = "cancel_add";
pub const CB_REFRESH_LIST: &str = "refresh_codes_list";

/// One-tap "share my phone number" reply keyboard, replacing anything else.
pub fn request_contact() -> KeyboardMarkup {
    KeyboardMarkup::new([[
        KeyboardButton::new("📱 Share my phone number").request(ButtonRequest::Contact)
    ]])
    .resize_keyboard(true)
    .one_time_keyboard(true)
}

pub fn remove_keyboard() -> KeyboardRemove {
    KeyboardRemove::new()
}

/// Confirm / regenerate / cancel rows under a code preview.
pub fn preview_actions() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        vec![InlineKeyboardButton::callback("✅ Save codes", CB_CONFIRM_ADD)],
        vec![InlineKeyboardButton::callback("🔄 Regenerate", CB_REGENERATE)],
        vec![InlineKeyboardButton::callback("❌ Cancel", CB_CANCEL_ADD)],
    ])
}

/// Single refresh button under the unused-codes listing.
pub fn refresh_list() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([vec![InlineKeyboardButton::callback(
        "🔄 Refresh list",
        CB_REFRESH_LIST,
    )]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_actions_carry_expected_callback_data() {
        let markup = preview_actions();
        let data: Vec<_> = markup
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|b| match &b.kind {
                teloxide::types::InlineKeyboardButtonKind::CallbackData(d) => Some(d.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(data, vec![CB_CONFIRM_ADD, CB_REGENERATE, CB_CANCEL_ADD]);
    }
}
