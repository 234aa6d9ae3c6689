use std::{error::Error, sync::Arc};

use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    dptree,
    error_handlers::LoggingErrorHandler,
    prelude::{Dispatcher, Requester},
    types::{CallbackQuery, InputFile, Update},
    update_listeners::webhooks::{self, Options},
    Bot, RequestError,
};
use tracing::instrument;

use crate::{
    config::WebhookConfig,
    database::{RetrieveQuestions, SessionStore},
    dispatcher::ChatDispatcher,
    state::StateFactory,
    transport::Transport,
    update::ChatUpdate,
    HandlerResult,
};

pub fn schema<T, Q, S>() -> UpdateHandler<Box<dyn Error + Send + Sync + 'static>>
where
    T: Transport + 'static,
    Q: RetrieveQuestions + 'static,
    S: SessionStore + 'static,
{
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(take_answer::<T, Q, S>))
        .endpoint(route_update::<T, Q, S>)
}

/// Runs the bot until ctrl-c, by webhook when configured and by long
/// polling otherwise.
pub async fn run<Q, S>(
    bot: Bot,
    webhook: Option<WebhookConfig>,
    questions: Arc<Q>,
    sessions: Arc<S>,
) -> Result<(), RequestError>
where
    Q: RetrieveQuestions + 'static,
    S: SessionStore + 'static,
{
    let factory = StateFactory::new(Arc::new(bot.clone()), questions);
    let chat_dispatcher: Arc<ChatDispatcher<Bot, Q, S>> =
        Arc::new(ChatDispatcher::new(factory, sessions));

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema::<Bot, Q, S>())
        .dependencies(dptree::deps![chat_dispatcher])
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred while handling an update",
        ))
        .enable_ctrlc_handler()
        .build();

    match webhook {
        Some(webhook) => {
            log::info!("Listening for webhook updates on {}", webhook.addr);
            let mut options = Options::new(webhook.addr, webhook.url);
            if let Some(certificate) = webhook.certificate {
                log::info!("Uploading webhook certificate {}", certificate.display());
                options = options.certificate(InputFile::file(certificate));
            }
            let listener = webhooks::axum(bot, options).await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        }
        None => {
            log::info!("Polling for updates");
            dispatcher.dispatch().await
        }
    }

    Ok(())
}

/// Stops the button's loading spinner, then handles the tap. A failed
/// acknowledgement does not cost the user their answer.
#[instrument(level = "info", skip_all)]
async fn take_answer<T, Q, S>(
    bot: Bot,
    update: Update,
    q: CallbackQuery,
    chat_dispatcher: Arc<ChatDispatcher<T, Q, S>>,
) -> HandlerResult
where
    T: Transport + 'static,
    Q: RetrieveQuestions + 'static,
    S: SessionStore + 'static,
{
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        log::warn!("Failed to answer callback query {}: {}", q.id, e);
    }
    route_update(update, chat_dispatcher).await
}

#[instrument(level = "info", skip_all)]
async fn route_update<T, Q, S>(
    update: Update,
    chat_dispatcher: Arc<ChatDispatcher<T, Q, S>>,
) -> HandlerResult
where
    T: Transport + 'static,
    Q: RetrieveQuestions + 'static,
    S: SessionStore + 'static,
{
    match ChatUpdate::from_update(&update) {
        Some(chat_update) => chat_dispatcher.handle_update(chat_update).await?,
        None => log::debug!("Skipping an update no chat session handles"),
    }

    Ok(())
}
