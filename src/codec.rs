//! Snapshot format for persisted chat sessions.
//!
//! A snapshot is a JSON document tagged with a schema version. The state
//! variant is named explicitly by `kind`, and a game carries its whole
//! question list so a restored game asks exactly what it asked before.

use serde::{Deserialize, Serialize};
use teloxide::types::{ChatId, MessageId};

use crate::{
    database::Question,
    error::{BotError, DecodeError},
    state::{BotState, GameState, StateKind},
};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SessionSnapshot {
    version: u32,
    chat_id: i64,
    state: StateSnapshot,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum StateSnapshot {
    Greeting {
        entered: bool,
    },
    Idle {
        entered: bool,
    },
    Game {
        entered: bool,
        questions: Vec<QuestionSnapshot>,
        current_question: usize,
        score: usize,
        last_question_msg_id: i32,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct QuestionSnapshot {
    text: String,
    answers: Vec<String>,
    correct_answer: usize,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl From<&Question> for QuestionSnapshot {
    fn from(question: &Question) -> Self {
        Self {
            text: question.text().to_owned(),
            answers: question.answers().to_vec(),
            correct_answer: question.correct_answer(),
        }
    }
}

impl TryFrom<QuestionSnapshot> for Question {
    type Error = DecodeError;

    fn try_from(snapshot: QuestionSnapshot) -> Result<Self, Self::Error> {
        Ok(Question::new(
            snapshot.text,
            snapshot.answers,
            snapshot.correct_answer,
        )?)
    }
}

impl From<&BotState> for StateSnapshot {
    fn from(state: &BotState) -> Self {
        let entered = state.is_entered();
        match state.kind() {
            StateKind::Greeting => StateSnapshot::Greeting { entered },
            StateKind::Idle => StateSnapshot::Idle { entered },
            StateKind::Game(game) => StateSnapshot::Game {
                entered,
                questions: game.questions().iter().map(QuestionSnapshot::from).collect(),
                current_question: game.current_question(),
                score: game.score(),
                last_question_msg_id: game.last_question_msg_id().0,
            },
        }
    }
}

impl TryFrom<StateSnapshot> for BotState {
    type Error = DecodeError;

    fn try_from(snapshot: StateSnapshot) -> Result<Self, Self::Error> {
        let state = match snapshot {
            StateSnapshot::Greeting { entered } => BotState::restore(StateKind::Greeting, entered),
            StateSnapshot::Idle { entered } => BotState::restore(StateKind::Idle, entered),
            StateSnapshot::Game {
                entered,
                questions,
                current_question,
                score,
                last_question_msg_id,
            } => {
                let questions = questions
                    .into_iter()
                    .map(Question::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                let game = GameState::restore(
                    questions,
                    current_question,
                    score,
                    MessageId(last_question_msg_id),
                )?;
                BotState::restore(StateKind::Game(game), entered)
            }
        };

        Ok(state)
    }
}

pub fn encode(chat_id: ChatId, state: &BotState) -> Result<String, BotError> {
    let snapshot = SessionSnapshot {
        version: SNAPSHOT_VERSION,
        chat_id: chat_id.0,
        state: StateSnapshot::from(state),
    };
    serde_json::to_string(&snapshot).map_err(BotError::Encode)
}

/// Decodes a snapshot stored under `chat_id`. Anything that does not
/// describe a valid session for that chat is an error, never a fresh one.
pub fn decode(chat_id: ChatId, snapshot: &str) -> Result<BotState, DecodeError> {
    let probe: VersionProbe = serde_json::from_str(snapshot)?;
    if probe.version != SNAPSHOT_VERSION {
        return Err(DecodeError::UnsupportedVersion(probe.version));
    }

    let snapshot: SessionSnapshot = serde_json::from_str(snapshot)?;
    if snapshot.chat_id != chat_id.0 {
        return Err(DecodeError::ChatMismatch {
            expected: chat_id.0,
            found: snapshot.chat_id,
        });
    }

    BotState::try_from(snapshot.state)
}
