use std::sync::Arc;

use teloxide::{prelude::*, types::ParseMode};

use vtb_core::{
    admin::TextOutcome,
    domain::UserId,
    formatting::{escape_html, preview_message},
};

use crate::keyboards;
use crate::router::AppState;

const INVALID_COUNT: &str = "Please send a number between 1 and 50.";
const ASK_NAME: &str = "What is the resource called?";
const FALLBACK: &str =
    "Open the verification link on the website to start phone verification, or send /info.";

pub async fn handle_text(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let user_id = UserId(user.id.0 as i64);
    let chat_id = msg.chat.id;

    // Admin dialog gets first claim on every plain text message.
    match state.admin.offer_text(user_id, text).await {
        TextOutcome::NotClaimed => {
            bot.send_message(chat_id, FALLBACK).await?;
        }
        TextOutcome::InvalidCount => {
            bot.send_message(chat_id, INVALID_COUNT).await?;
        }
        TextOutcome::NamePrompt => {
            bot.send_message(chat_id, ASK_NAME).await?;
        }
        TextOutcome::LinkPrompt { name } => {
            bot.send_message(
                chat_id,
                format!("Send the download link for <b>{}</b>.", escape_html(&name)),
            )
            .parse_mode(ParseMode::Html)
            .await?;
        }
        TextOutcome::Preview(session) => {
            bot.send_message(chat_id, preview_message(&session))
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::preview_actions())
                .await?;
        }
    }

    Ok(())
}
