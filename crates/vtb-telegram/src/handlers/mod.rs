//! Telegram update handlers.
//!
//! `handle_message` is the classifier chain: commands first, then contact
//! shares, then plain text (which is offered to the admin dialog before any
//! general handling).

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use crate::router::AppState;

mod callback;
mod commands;
mod contact;
mod text;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    callback::handle_callback(bot, q, state).await
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            return commands::handle_command(bot, msg, state).await;
        }
    }

    if msg.contact().is_some() {
        return contact::handle_contact(bot, msg, state).await;
    }

    if msg.text().is_some() {
        return text::handle_text(bot, msg, state).await;
    }

    // Stickers, photos, voice, ... — nothing in this bot consumes them.
    Ok(())
}
