use std::sync::Arc;

use teloxide::{prelude::*, types::ParseMode};

use vtb_core::{
    domain::{SharedContact, UserId},
    formatting::otp_message,
    verify::ContactOutcome,
};

use crate::keyboards;
use crate::router::AppState;

const OWNER_MISMATCH: &str = "❌ Please share your own contact, not someone else's.";
const SESSION_EXPIRED: &str =
    "⌛ This verification session has expired. Open the link on the website again.";
const STORE_ERROR: &str = "⚠️ Something went wrong on our side. Please try again.";

pub async fn handle_contact(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(contact) = msg.contact() else {
        return Ok(());
    };

    let user_id = UserId(user.id.0 as i64);
    let chat_id = msg.chat.id;

    let shared = SharedContact {
        owner: contact.user_id.map(|u| UserId(u.0 as i64)),
        phone_number: contact.phone_number.clone(),
        first_name: contact.first_name.clone(),
        last_name: contact.last_name.clone(),
    };

    match state
        .verify
        .handle_contact(user_id, &shared, user.username.as_deref())
        .await
    {
        Ok(ContactOutcome::OwnerMismatch) => {
            bot.send_message(chat_id, OWNER_MISMATCH).await?;
        }
        Ok(ContactOutcome::SessionExpired) => {
            bot.send_message(chat_id, SESSION_EXPIRED)
                .reply_markup(keyboards::remove_keyboard())
                .await?;
        }
        Ok(ContactOutcome::OtpIssued { code }) => {
            bot.send_message(chat_id, otp_message(&code))
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::remove_keyboard())
                .await?;
        }
        Err(e) => {
            tracing::error!(user_id = user_id.0, "contact share failed: {e}");
            bot.send_message(chat_id, STORE_ERROR).await?;
        }
    }

    Ok(())
}
