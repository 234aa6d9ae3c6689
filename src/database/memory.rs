use std::collections::HashMap;

use teloxide::types::ChatId;
use tokio::sync::RwLock;

use super::{question::fixture_questions, Question, RetrieveQuestions, SessionStore};
use crate::error::StorageError;

/// Keeps questions and session snapshots in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    questions: Vec<Question>,
    sessions: RwLock<HashMap<ChatId, String>>,
}

impl MemoryStorage {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            sessions: RwLock::default(),
        }
    }

    pub fn with_fixtures() -> Self {
        Self::new(fixture_questions())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl RetrieveQuestions for MemoryStorage {
    async fn get_questions(&self, count: usize) -> Result<Vec<Question>, StorageError> {
        Ok(self.questions.iter().take(count).cloned().collect())
    }
}

impl SessionStore for MemoryStorage {
    async fn get(&self, chat_id: ChatId) -> Result<Option<String>, StorageError> {
        Ok(self.sessions.read().await.get(&chat_id).cloned())
    }

    async fn put(&self, chat_id: ChatId, snapshot: String) -> Result<(), StorageError> {
        self.sessions.write().await.insert(chat_id, snapshot);
        Ok(())
    }

    async fn delete(&self, chat_id: ChatId) -> Result<(), StorageError> {
        if self.sessions.write().await.remove(&chat_id).is_none() {
            log::debug!("No session stored for chat {}, nothing to delete", chat_id.0);
        }
        Ok(())
    }
}
