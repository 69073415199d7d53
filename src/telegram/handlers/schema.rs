//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::Command;
use crate::telegram::keyboard::{parse_selection_payload, SELECTION_PREFIX};

/// Creates the main dispatcher schema for the Telegram bot.
///
/// The same tree is used by the binary and can be fed updates in tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(message_handler(deps_messages))
        .branch(callback_handler(deps_callback))
}

fn is_plain_text(text: Option<&str>) -> bool {
    text.map(|text| !text.starts_with('/')).unwrap_or(false)
}

/// Handler for /start and /help
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);
                match cmd {
                    Command::Start => deps.flow.on_start(msg.chat.id).await,
                    Command::Help => deps.flow.on_help(msg.chat.id).await,
                }
                Ok(())
            }
        },
    ))
}

/// Handler for URL submissions (any text that is not a command)
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| is_plain_text(msg.text()))
        .endpoint(move |msg: Message| {
            let deps = deps.clone();
            async move {
                let text = msg.text().unwrap_or_default();
                // Errors were already reported to the chat by the flow
                let _ = deps.flow.on_url(msg.chat.id, text).await;
                Ok(())
            }
        })
}

/// Handler for format buttons (`dl_<format_id>`)
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query()
        .filter(|q: CallbackQuery| {
            q.data
                .as_deref()
                .map(|data| data.starts_with(SELECTION_PREFIX))
                .unwrap_or(false)
        })
        .endpoint(move |q: CallbackQuery| {
            let deps = deps.clone();
            async move {
                let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) else {
                    log::warn!("Callback query {:?} has no message, ignoring", q.id);
                    return Ok(());
                };
                let Some(format_id) = q.data.as_deref().and_then(parse_selection_payload) else {
                    return Ok(());
                };

                log::info!("Chat {}: format {} selected", chat_id, format_id);
                let _ = deps.flow.on_button_press(chat_id, &q.id.0, format_id).await;
                Ok(())
            }
        })
}
