use teloxide::RequestError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestionError {
    #[error("a question needs at least 2 answers, got {0}")]
    TooFewAnswers(usize),

    #[error("a question can have at most 26 answers, got {0}")]
    TooManyAnswers(usize),

    #[error("correct answer {index} is out of range for {len} answers")]
    CorrectAnswerOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error("snapshot belongs to chat {found}, expected {expected}")]
    ChatMismatch { expected: i64, found: i64 },

    #[error("invalid question in snapshot: {0}")]
    InvalidQuestion(#[from] QuestionError),

    #[error("game snapshot has no questions")]
    EmptyGame,

    #[error("current question {current} is out of range for {len} questions")]
    CurrentQuestionOutOfRange { current: usize, len: usize },

    #[error("score {score} exceeds the {current} questions answered")]
    ScoreExceedsProgress { score: usize, current: usize },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored question is invalid: {0}")]
    InvalidQuestion(#[from] QuestionError),

    #[error("stored question {0} has no correct answer")]
    NoCorrectAnswer(uuid::Uuid),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} should be set")]
    Missing(&'static str),

    #[error("{key} can't be parsed: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("NGROK_URL and NGROK_ADDR must be set together, and WEBHOOK_CERT needs both")]
    IncompleteWebhook,
}

/// Everything that can abort the handling of a single update.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("transport failed: {0}")]
    Transport(#[from] RequestError),

    /// The bot itself produced every inline keyboard, so an unparseable
    /// payload means the keyboard contract was broken or tampered with.
    #[error("invalid callback data {0:?}")]
    InvalidCallbackData(String),

    #[error("no question source configured")]
    MissingQuestionSource,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to decode session: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to encode session: {0}")]
    Encode(serde_json::Error),
}
