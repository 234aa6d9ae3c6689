use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use teloxide::{
    types::{ChatId, InlineKeyboardMarkup, MessageId},
    ApiError, RequestError,
};
use triviabot::{
    database::{memory::MemoryStorage, Question},
    dispatcher::ChatDispatcher,
    state::StateFactory,
    transport::Transport,
    update::ChatUpdate,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Message { chat_id: ChatId, text: String },
    Edit { chat_id: ChatId, message_id: MessageId, text: String },
}

impl Sent {
    pub fn text(&self) -> &str {
        match self {
            Sent::Message { text, .. } | Sent::Edit { text, .. } => text,
        }
    }
}

/// Records outbound calls; fails every call with `BotBlocked` while
/// `blocked` is set, and a single send after `fail_next_send`.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    next_id: Mutex<i32>,
    blocked: AtomicBool,
    fail_next_send: AtomicBool,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().iter().map(|s| s.text().to_owned()).collect()
    }

    pub fn texts_for(&self, chat_id: ChatId) -> Vec<String> {
        self.sent()
            .iter()
            .filter(|s| match s {
                Sent::Message { chat_id: id, .. } | Sent::Edit { chat_id: id, .. } => *id == chat_id,
            })
            .map(|s| s.text().to_owned())
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    pub fn fail_next_send(&self) {
        self.fail_next_send.store(true, Ordering::SeqCst);
    }

    fn check_blocked(&self) -> Result<(), RequestError> {
        if self.blocked.load(Ordering::SeqCst) {
            return Err(RequestError::Api(ApiError::BotBlocked));
        }
        Ok(())
    }
}

impl Transport for RecordingTransport {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        _keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<MessageId, RequestError> {
        self.check_blocked()?;
        if self.fail_next_send.swap(false, Ordering::SeqCst) {
            return Err(RequestError::Api(ApiError::Unknown("Bad Gateway".into())));
        }
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        self.sent.lock().unwrap().push(Sent::Message {
            chat_id,
            text: text.to_owned(),
        });
        Ok(MessageId(*next_id))
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), RequestError> {
        self.check_blocked()?;
        self.sent.lock().unwrap().push(Sent::Edit {
            chat_id,
            message_id,
            text: text.to_owned(),
        });
        Ok(())
    }
}

pub type TestDispatcher = ChatDispatcher<RecordingTransport, MemoryStorage, MemoryStorage>;

pub fn dispatcher(questions: Vec<Question>) -> (Arc<RecordingTransport>, TestDispatcher) {
    let transport = Arc::new(RecordingTransport::default());
    let storage = Arc::new(MemoryStorage::new(questions));
    let factory = StateFactory::new(Arc::clone(&transport), Arc::clone(&storage));
    (transport, ChatDispatcher::new(factory, storage))
}

pub fn question(text: &str, answers: &[&str], correct: usize) -> Question {
    Question::new(text, answers.iter().map(|a| a.to_string()).collect(), correct).unwrap()
}

pub fn text(chat_id: ChatId, text: &str) -> ChatUpdate {
    ChatUpdate::TextMessage {
        chat_id,
        text: text.into(),
    }
}

pub fn tap(chat_id: ChatId, data: &str) -> ChatUpdate {
    ChatUpdate::ButtonTap {
        chat_id,
        data: data.into(),
    }
}
