use std::sync::Arc;

use teloxide::{prelude::*, types::ParseMode};

use vtb_core::{
    admin::{ConfirmOutcome, RegenerateOutcome},
    domain::UserId,
    formatting::{committed_message, preview_message, unused_codes_message},
};

use crate::keyboards::{self, CB_CANCEL_ADD, CB_CONFIRM_ADD, CB_REFRESH_LIST, CB_REGENERATE};
use crate::router::AppState;

const DIALOG_EXPIRED: &str = "⌛ This dialog has expired. Send /addcodes to start over.";
const CANCELLED: &str = "Cancelled. Nothing was saved.";
const STORE_ERROR: &str = "⚠️ Saving failed. Press Save codes again to retry.";

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let cb_id = q.id.clone();
    let data = q.data.clone().unwrap_or_default();
    let user_id = UserId(q.from.id.0 as i64);

    // Always answer the callback query so the client stops its spinner.
    let Some(message) = q.message.as_ref() else {
        bot.answer_callback_query(cb_id).await?;
        return Ok(());
    };
    let chat_id = message.chat.id;
    let message_id = message.id;

    if !state.admin.is_admin(user_id) {
        bot.answer_callback_query(cb_id).text("Unauthorized").await?;
        return Ok(());
    }

    match data.as_str() {
        CB_CONFIRM_ADD => match state.admin.confirm(user_id).await {
            Ok(ConfirmOutcome::Committed { count, name }) => {
                bot.answer_callback_query(cb_id).await?;
                bot.edit_message_text(chat_id, message_id, committed_message(count, &name))
                    .parse_mode(ParseMode::Html)
                    .reply_markup(keyboards::refresh_list())
                    .await?;
            }
            Ok(ConfirmOutcome::Expired) => {
                bot.answer_callback_query(cb_id).text(DIALOG_EXPIRED).await?;
            }
            Err(e) => {
                tracing::error!(user_id = user_id.0, "confirm failed: {e}");
                bot.answer_callback_query(cb_id).text(STORE_ERROR).await?;
            }
        },
        CB_REGENERATE => match state.admin.regenerate(user_id).await {
            RegenerateOutcome::Preview(session) => {
                bot.answer_callback_query(cb_id).text("Regenerated").await?;
                bot.edit_message_text(chat_id, message_id, preview_message(&session))
                    .parse_mode(ParseMode::Html)
                    .reply_markup(keyboards::preview_actions())
                    .await?;
            }
            RegenerateOutcome::Expired => {
                bot.answer_callback_query(cb_id).text(DIALOG_EXPIRED).await?;
            }
        },
        CB_CANCEL_ADD => {
            state.admin.cancel(user_id).await;
            bot.answer_callback_query(cb_id).await?;
            bot.edit_message_text(chat_id, message_id, CANCELLED).await?;
        }
        CB_REFRESH_LIST => match state.admin.list_unused(user_id).await {
            Ok(Some(grouped)) => {
                bot.answer_callback_query(cb_id).await?;
                // Unchanged content makes Telegram reject the edit; that is
                // fine for a refresh.
                let _ = bot
                    .edit_message_text(chat_id, message_id, unused_codes_message(&grouped))
                    .parse_mode(ParseMode::Html)
                    .reply_markup(keyboards::refresh_list())
                    .await;
            }
            Ok(None) => {
                bot.answer_callback_query(cb_id).text("Unauthorized").await?;
            }
            Err(e) => {
                tracing::error!(user_id = user_id.0, "code listing failed: {e}");
                bot.answer_callback_query(cb_id)
                    .text("Listing failed, try again")
                    .await?;
            }
        },
        _ => {
            bot.answer_callback_query(cb_id).await?;
        }
    }

    Ok(())
}
