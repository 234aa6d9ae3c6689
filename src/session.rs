use teloxide::types::ChatId;

use crate::{
    codec,
    database::RetrieveQuestions,
    error::{BotError, DecodeError},
    state::{BotState, StateFactory, Transition},
    transport::Transport,
    update::ChatUpdate,
};

/// A chat's state machine together with the handles it runs on.
pub struct ChatSession<T, Q> {
    chat_id: ChatId,
    state: BotState,
    factory: StateFactory<T, Q>,
}

impl<T: Transport, Q: RetrieveQuestions> ChatSession<T, Q> {
    /// First contact with a chat: a greeting state, already entered.
    pub async fn create(chat_id: ChatId, factory: StateFactory<T, Q>) -> Result<Self, BotError> {
        let mut state = factory.greeting();
        state.enter(chat_id, &factory).await?;
        Ok(Self {
            chat_id,
            state,
            factory,
        })
    }

    /// Rebuilds a session from its snapshot. `enter` is not run again.
    pub fn decode(
        chat_id: ChatId,
        snapshot: &str,
        factory: StateFactory<T, Q>,
    ) -> Result<Self, DecodeError> {
        Ok(Self {
            chat_id,
            state: codec::decode(chat_id, snapshot)?,
            factory,
        })
    }

    pub fn encode(&self) -> Result<String, BotError> {
        codec::encode(self.chat_id, &self.state)
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn state(&self) -> &BotState {
        &self.state
    }

    /// Feeds one update through the state machine, entering the next state
    /// when it transitions. Returns whether a transition happened.
    pub async fn process(&mut self, update: &ChatUpdate) -> Result<bool, BotError> {
        match self.state.process(update, &self.factory).await? {
            Transition::Stay => Ok(false),
            Transition::Switch(mut next) => {
                next.enter(self.chat_id, &self.factory).await?;
                self.state = next;
                Ok(true)
            }
        }
    }
}

impl<T, Q> PartialEq for ChatSession<T, Q> {
    fn eq(&self, other: &Self) -> bool {
        self.chat_id == other.chat_id && self.state == other.state
    }
}

impl<T, Q> std::fmt::Debug for ChatSession<T, Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("chat_id", &self.chat_id)
            .field("state", &self.state)
            .finish()
    }
}
