use crate::adapters::telegram::TelegramSink;
use crate::app::session::{BotCommand, Keyboard, Reply, SessionStore};
use crate::core::delivery::{deliver, Renderer};
use crate::core::dispatcher::Dispatcher as SearchDispatcher;
use crate::domain::model::{SearchCriteria, SearchRequest};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tokio::sync::Mutex;

/// Everything the update handlers share.
pub struct BotContext {
    pub sessions: Mutex<SessionStore>,
    pub dispatcher: SearchDispatcher,
    pub renderer: Renderer,
    pub per_site_limit: usize,
}

impl BotContext {
    pub fn new(
        sessions: SessionStore,
        dispatcher: SearchDispatcher,
        renderer: Renderer,
        per_site_limit: usize,
    ) -> Self {
        Self {
            sessions: Mutex::new(sessions),
            dispatcher,
            renderer,
            per_site_limit,
        }
    }
}

/// Long-polls Telegram until Ctrl-C.
pub async fn run_bot(bot: Bot, context: Arc<BotContext>) {
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    tracing::info!("🤖 Bot is polling for updates");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![context])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
    tracing::info!("Bot stopped");
}

fn markup(keyboard: Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.into_iter().map(|row| {
        row.into_iter()
            .map(|button| InlineKeyboardButton::callback(button.label, button.data))
    }))
}

async fn handle_message(bot: Bot, msg: Message, context: Arc<BotContext>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    let reply = {
        let mut sessions = context.sessions.lock().await;
        match BotCommand::parse(text) {
            Some(command) => {
                tracing::debug!("Chat {}: {:?}", chat_id.0, command);
                sessions.handle_command(chat_id.0, command)
            }
            None => sessions.handle_text(chat_id.0, text),
        }
    };

    match reply {
        Reply::Text(text) | Reply::Edit { text, .. } => {
            bot.send_message(chat_id, text).await?;
        }
        Reply::Keyboard { text, keyboard } => {
            bot.send_message(chat_id, text)
                .reply_markup(markup(keyboard))
                .await?;
        }
        Reply::Search(criteria) => run_search(&bot, chat_id, &context, criteria).await?,
    }
    Ok(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    context: Arc<BotContext>,
) -> ResponseResult<()> {
    bot.answer_callback_query(q.id.clone()).await?;

    let (Some(data), Some((chat_id, message_id))) = (
        q.data.as_deref(),
        q.message.as_ref().map(|m| (m.chat().id, m.id())),
    ) else {
        return Ok(());
    };

    let reply = context
        .sessions
        .lock()
        .await
        .handle_callback(chat_id.0, data);

    match reply {
        Some(Reply::Edit { text, keyboard }) => {
            let edit = bot.edit_message_text(chat_id, message_id, text);
            match keyboard {
                Some(keyboard) => edit.reply_markup(markup(keyboard)).await?,
                None => edit.await?,
            };
        }
        Some(Reply::Text(text)) => {
            bot.send_message(chat_id, text).await?;
        }
        Some(Reply::Keyboard { text, keyboard }) => {
            bot.send_message(chat_id, text)
                .reply_markup(markup(keyboard))
                .await?;
        }
        Some(Reply::Search(criteria)) => run_search(&bot, chat_id, &context, criteria).await?,
        None => tracing::debug!("Ignoring callback data '{}' from chat {}", data, chat_id.0),
    }
    Ok(())
}

async fn run_search(
    bot: &Bot,
    chat_id: ChatId,
    context: &BotContext,
    criteria: SearchCriteria,
) -> ResponseResult<()> {
    tracing::info!("🔎 Chat {} searching '{}'", chat_id.0, criteria.query_text());
    bot.send_message(chat_id, "🔎 Searching, this can take a minute...")
        .await?;

    let request = SearchRequest {
        criteria,
        limit: context.per_site_limit,
    };
    let report = context.dispatcher.handle_request(&request).await;

    let mut messages = vec![context.renderer.summary(&report)];
    messages.extend(context.renderer.render(&report.resumes));

    let sink = TelegramSink::new(bot.clone());
    if let Err(e) = deliver(&sink, chat_id.0, &messages).await {
        tracing::error!("❌ Delivering results to chat {} failed: {}", chat_id.0, e);
        bot.send_message(chat_id, format!("⚠️ Could not send all results: {}", e))
            .await?;
    }
    Ok(())
}
