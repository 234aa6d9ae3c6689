use std::sync::Arc;

use tracing::instrument;

use crate::{
    database::{RetrieveQuestions, SessionStore},
    error::BotError,
    session::ChatSession,
    state::StateFactory,
    transport::Transport,
    update::ChatUpdate,
};

/// Routes each update to its chat's session and persists the result.
///
/// Callers must not run two updates for the same chat at once; updates
/// for different chats are independent.
pub struct ChatDispatcher<T, Q, S> {
    factory: StateFactory<T, Q>,
    store: Arc<S>,
}

impl<T, Q, S> ChatDispatcher<T, Q, S>
where
    T: Transport,
    Q: RetrieveQuestions,
    S: SessionStore,
{
    pub fn new(factory: StateFactory<T, Q>, store: Arc<S>) -> Self {
        Self { factory, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[instrument(level = "info", skip(self), fields(chat_id = update.chat_id().0))]
    pub async fn handle_update(&self, update: ChatUpdate) -> Result<(), BotError> {
        let chat_id = update.chat_id();

        if let ChatUpdate::Membership { status, .. } = &update {
            if status.is_unreachable() {
                log::warn!("The bot was blocked by chat {}", chat_id.0);
                self.store.delete(chat_id).await?;
            } else {
                log::warn!("The bot was unblocked by chat {}", chat_id.0);
            }
            return Ok(());
        }

        let mut session = match self.store.get(chat_id).await? {
            Some(snapshot) => ChatSession::decode(chat_id, &snapshot, self.factory.clone())
                .map_err(|e| {
                    log::error!("Stored session of chat {} is unreadable: {}", chat_id.0, e);
                    e
                })?,
            None => {
                log::info!("First contact with chat {}", chat_id.0);
                ChatSession::create(chat_id, self.factory.clone()).await?
            }
        };

        if session.process(&update).await? {
            log::debug!("Chat {} switched to {:?}", chat_id.0, session.state().kind());
        }

        self.store.put(chat_id, session.encode()?).await?;
        Ok(())
    }
}
