use sqlx::postgres::PgPool;
use teloxide::types::ChatId;
use uuid::Uuid;

use super::{Question, RetrieveQuestions, SessionStore};
use crate::error::StorageError;

pub struct Connection {
    pool: PgPool,
}

/// One joined `questions`/`answers` row.
#[derive(Debug, sqlx::FromRow)]
struct QuestionRecord {
    id: Uuid,
    question: String,
    answer: String,
    is_correct: bool,
}

impl Connection {
    pub async fn connect(connection_string: &str) -> Result<Self, StorageError> {
        let pool = PgPool::connect(connection_string).await?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        log::debug!("Applying database migrations");
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Database(e.into()))
    }
}

/// Folds answer rows, already ordered by question and position, into questions.
fn group_records(records: Vec<QuestionRecord>) -> Result<Vec<Question>, StorageError> {
    let mut questions = Vec::new();
    let mut records = records.into_iter().peekable();

    while let Some(first) = records.next() {
        let id = first.id;
        let text = first.question;
        let mut answers = vec![first.answer];
        let mut correct = first.is_correct.then_some(0);

        while let Some(record) = records.next_if(|r| r.id == id) {
            if record.is_correct && correct.is_none() {
                correct = Some(answers.len());
            }
            answers.push(record.answer);
        }

        let correct = correct.ok_or(StorageError::NoCorrectAnswer(id))?;
        questions.push(Question::new(text, answers, correct)?);
    }

    Ok(questions)
}

impl RetrieveQuestions for Connection {
    async fn get_questions(&self, count: usize) -> Result<Vec<Question>, StorageError> {
        let records = sqlx::query_as::<_, QuestionRecord>(
            "SELECT questions.uuid AS id, questions.text AS question, answers.text AS answer, answers.is_correct \
             FROM questions INNER JOIN answers ON questions.uuid = answers.question_id \
             WHERE questions.uuid IN (SELECT uuid FROM questions ORDER BY random() LIMIT $1) \
             ORDER BY questions.uuid, answers.position",
        )
        .bind(count as i64)
        .fetch_all(&self.pool)
        .await?;

        log::debug!("Fetched {} answer rows for {} questions", records.len(), count);
        group_records(records)
    }
}

impl SessionStore for Connection {
    async fn get(&self, chat_id: ChatId) -> Result<Option<String>, StorageError> {
        let snapshot = sqlx::query_scalar::<_, String>(
            "SELECT snapshot FROM chat_sessions WHERE chat_id = $1",
        )
        .bind(chat_id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(snapshot)
    }

    async fn put(&self, chat_id: ChatId, snapshot: String) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO chat_sessions (chat_id, snapshot) VALUES ($1, $2) \
             ON CONFLICT (chat_id) DO UPDATE SET snapshot = excluded.snapshot",
        )
        .bind(chat_id.0)
        .bind(snapshot)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, chat_id: ChatId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM chat_sessions WHERE chat_id = $1")
            .bind(chat_id.0)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
