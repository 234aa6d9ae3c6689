use std::future::Future;

use teloxide::{
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{ChatId, InlineKeyboardMarkup, MessageId},
    ApiError, Bot, RequestError,
};

/// The outbound half of Telegram as seen by the state machine.
pub trait Transport: Send + Sync {
    /// Sends `text` to the chat and reports the id of the new message.
    fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> impl Future<Output = Result<MessageId, RequestError>> + Send;

    /// Replaces the text of a message. Setting the text it already has
    /// succeeds, so a replayed update can repeat its edit.
    fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> impl Future<Output = Result<(), RequestError>> + Send;
}

/// Telegram refuses an edit that changes nothing; for us it is done.
fn ignore_not_modified<T>(result: Result<T, RequestError>) -> Result<(), RequestError> {
    match result {
        Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
        Err(e) => Err(e),
    }
}

impl Transport for Bot {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<MessageId, RequestError> {
        let request = self.send_message(chat_id, text.to_owned());
        let message = match keyboard {
            Some(keyboard) => request.reply_markup(keyboard).await?,
            None => request.await?,
        };

        Ok(message.id)
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), RequestError> {
        let result = self
            .edit_message_text(chat_id, message_id, text.to_owned())
            .await;
        if let Err(RequestError::Api(ApiError::MessageNotModified)) = &result {
            log::debug!(
                "Message {} in chat {} already reads as requested",
                message_id.0,
                chat_id.0
            );
        }
        ignore_not_modified(result)
    }
}
