use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile, ParseMode},
};

use vtb_core::{
    admin::DialogStart,
    domain::UserId,
    verify::StartOutcome,
};

use crate::keyboards;
use crate::router::AppState;

const WELCOME: &str = "👋 Welcome! Open the verification link on the website to start phone verification.";
const CONTACT_PROMPT: &str =
    "To verify your phone number, tap the button below to share your contact.";
const ASK_COUNT: &str = "How many access codes should I generate? (1-50)";
const UNAUTHORIZED: &str = "Unauthorized.";
const STORE_ERROR: &str = "⚠️ Something went wrong on our side. Please try again.";

const INFO_CAPTION: &str = "ℹ️ <b>Phone verification bot</b>\n\n\
This bot confirms that you own the phone number on your Telegram account. \
Open the verification link on the website, share your contact with one tap, \
and enter the 6-digit code you receive here.\n\n\
We never message you without a verification in progress. See /privacy on the website.";

/// Social links shown by the admin-only `/admin_socials` command.
const SOCIAL_LINKS: &[(&str, &str)] = &[
    ("📣 Channel", "https://t.me/redemhub"),
    ("💬 Support", "https://t.me/redemhub_support"),
    ("🌐 Website", "https://redemhub.com"),
];

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let user_id = UserId(user.id.0 as i64);
    let chat_id = msg.chat.id;

    let (cmd, rest) = parse_command(msg.text().unwrap_or(""));

    match cmd.as_str() {
        "start" => {
            let payload = if rest.is_empty() { None } else { Some(rest.as_str()) };
            match state.verify.handle_start(user_id, payload).await {
                Ok(StartOutcome::Welcome) => {
                    bot.send_message(chat_id, WELCOME).await?;
                }
                Ok(StartOutcome::ContactRequested) => {
                    bot.send_message(chat_id, CONTACT_PROMPT)
                        .reply_markup(keyboards::request_contact())
                        .await?;
                }
                Err(e) => {
                    tracing::error!(user_id = user_id.0, "start failed: {e}");
                    bot.send_message(chat_id, STORE_ERROR).await?;
                }
            }
        }
        "addcodes" => match state.admin.start(user_id).await {
            DialogStart::Unauthorized => {
                bot.send_message(chat_id, UNAUTHORIZED).await?;
            }
            DialogStart::Started => {
                bot.send_message(chat_id, ASK_COUNT).await?;
            }
        },
        "admin_socials" => {
            if !state.admin.is_admin(user_id) {
                bot.send_message(chat_id, UNAUTHORIZED).await?;
                return Ok(());
            }

            let rows: Vec<Vec<InlineKeyboardButton>> = SOCIAL_LINKS
                .iter()
                .filter_map(|(label, link)| {
                    let url = url::Url::parse(link).ok()?;
                    Some(vec![InlineKeyboardButton::url(label.to_string(), url)])
                })
                .collect();

            bot.send_message(chat_id, "Our social links:")
                .reply_markup(InlineKeyboardMarkup::new(rows))
                .await?;
        }
        "info" => {
            let photo = state
                .cfg
                .info_image_url
                .as_deref()
                .and_then(|raw| url::Url::parse(raw).ok());

            match photo {
                Some(url) => {
                    bot.send_photo(chat_id, InputFile::url(url))
                        .caption(INFO_CAPTION)
                        .parse_mode(ParseMode::Html)
                        .await?;
                }
                None => {
                    bot.send_message(chat_id, INFO_CAPTION)
                        .parse_mode(ParseMode::Html)
                        .await?;
                }
            }
        }
        _ => {
            // Unknown commands are ignored.
        }
    }

    Ok(())
}
