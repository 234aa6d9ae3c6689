use std::future::Future;

use teloxide::types::ChatId;

use crate::error::StorageError;

pub mod connection;
pub mod memory;
pub mod question;

pub use question::Question;

/// Supplies quiz questions. Repeated calls may return different sets.
pub trait RetrieveQuestions: Send + Sync {
    fn get_questions(
        &self,
        count: usize,
    ) -> impl Future<Output = Result<Vec<Question>, StorageError>> + Send;
}

/// Keeps one opaque session snapshot per chat. Last write wins.
pub trait SessionStore: Send + Sync {
    fn get(
        &self,
        chat_id: ChatId,
    ) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    fn put(
        &self,
        chat_id: ChatId,
        snapshot: String,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    fn delete(&self, chat_id: ChatId) -> impl Future<Output = Result<(), StorageError>> + Send;
}
