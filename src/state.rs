use std::sync::Arc;

use teloxide::types::{ChatId, MessageId};
use tracing::instrument;

use crate::{
    database::{Question, RetrieveQuestions},
    error::{BotError, DecodeError},
    format::{
        answered_question_message, final_score, is_start_command, out_of_range_prompt,
        parse_answer, question_message, GREETING, IDLE_PROMPT, NO_QUESTIONS, STARTING_GAME,
        UNPARSEABLE_ANSWER,
    },
    keyboard::answers_keyboard,
    transport::Transport,
    update::ChatUpdate,
};

/// Number of questions fetched for every new game.
pub const QUESTION_COUNT: usize = 5;

/// Holds the live handles new states are built with.
pub struct StateFactory<T, Q> {
    transport: Arc<T>,
    questions: Option<Arc<Q>>,
}

impl<T, Q> Clone for StateFactory<T, Q> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            questions: self.questions.clone(),
        }
    }
}

impl<T: Transport, Q: RetrieveQuestions> StateFactory<T, Q> {
    pub fn new(transport: Arc<T>, questions: Arc<Q>) -> Self {
        Self {
            transport,
            questions: Some(questions),
        }
    }

    /// A factory that can run every state except a game.
    pub fn without_questions(transport: Arc<T>) -> Self {
        Self {
            transport,
            questions: None,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn greeting(&self) -> BotState {
        BotState::new(StateKind::Greeting)
    }

    pub fn idle(&self) -> BotState {
        BotState::new(StateKind::Idle)
    }

    /// Builds a game over freshly fetched questions, or `None` when the
    /// source has no questions to offer.
    pub async fn game(&self) -> Result<Option<BotState>, BotError> {
        let source = self
            .questions
            .as_ref()
            .ok_or(BotError::MissingQuestionSource)?;
        let questions = source.get_questions(QUESTION_COUNT).await?;

        if questions.is_empty() {
            return Ok(None);
        }
        Ok(Some(BotState::new(StateKind::Game(GameState::new(questions)))))
    }
}

/// The outcome of [`BotState::process`].
#[must_use]
#[derive(Debug)]
pub enum Transition {
    Stay,
    Switch(BotState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateKind {
    Greeting,
    Idle,
    Game(GameState),
}

/// One chat's conversational state.
///
/// `enter` runs exactly once per instance, when the instance becomes
/// active; `process` may only run after it. Instances restored from a
/// snapshot carry the flag they were saved with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotState {
    kind: StateKind,
    entered: bool,
}

impl BotState {
    fn new(kind: StateKind) -> Self {
        Self {
            kind,
            entered: false,
        }
    }

    pub(crate) fn restore(kind: StateKind, entered: bool) -> Self {
        Self { kind, entered }
    }

    pub fn kind(&self) -> &StateKind {
        &self.kind
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }

    pub fn game(&self) -> Option<&GameState> {
        match &self.kind {
            StateKind::Game(game) => Some(game),
            _ => None,
        }
    }

    pub async fn enter<T: Transport, Q: RetrieveQuestions>(
        &mut self,
        chat_id: ChatId,
        factory: &StateFactory<T, Q>,
    ) -> Result<(), BotError> {
        assert!(!self.entered, "enter called twice on the same state");
        self.entered = true;

        match &mut self.kind {
            StateKind::Greeting | StateKind::Idle => Ok(()),
            StateKind::Game(game) => {
                game.send_current_question(chat_id, factory.transport())
                    .await
            }
        }
    }

    #[instrument(level = "debug", skip(self, factory))]
    pub async fn process<T: Transport, Q: RetrieveQuestions>(
        &mut self,
        update: &ChatUpdate,
        factory: &StateFactory<T, Q>,
    ) -> Result<Transition, BotError> {
        assert!(self.entered, "process called before enter");

        match &mut self.kind {
            StateKind::Greeting => {
                factory
                    .transport()
                    .send_text(update.chat_id(), GREETING, None)
                    .await?;
                Ok(Transition::Switch(factory.idle()))
            }
            StateKind::Idle => process_idle(update, factory).await,
            StateKind::Game(game) => game.process(update, factory).await,
        }
    }
}

async fn process_idle<T: Transport, Q: RetrieveQuestions>(
    update: &ChatUpdate,
    factory: &StateFactory<T, Q>,
) -> Result<Transition, BotError> {
    let ChatUpdate::TextMessage { chat_id, text } = update else {
        return Ok(Transition::Stay);
    };

    if !is_start_command(text) {
        factory.transport().send_text(*chat_id, IDLE_PROMPT, None).await?;
        return Ok(Transition::Stay);
    }

    match factory.game().await? {
        Some(game) => {
            log::info!("Chat {}: starting a new game", chat_id.0);
            factory.transport().send_text(*chat_id, STARTING_GAME, None).await?;
            Ok(Transition::Switch(game))
        }
        None => {
            log::warn!("Chat {}: no questions available, game not started", chat_id.0);
            factory.transport().send_text(*chat_id, NO_QUESTIONS, None).await?;
            Ok(Transition::Stay)
        }
    }
}

/// A game in progress. While active, `current_question` always points at
/// the question awaiting an answer and `last_question_msg_id` at the
/// message that asked it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    questions: Vec<Question>,
    current_question: usize,
    score: usize,
    last_question_msg_id: MessageId,
}

impl GameState {
    fn new(questions: Vec<Question>) -> Self {
        debug_assert!(!questions.is_empty());
        Self {
            questions,
            current_question: 0,
            score: 0,
            last_question_msg_id: MessageId(0),
        }
    }

    /// Rebuilds a game from persisted parts, checking its invariants.
    pub(crate) fn restore(
        questions: Vec<Question>,
        current_question: usize,
        score: usize,
        last_question_msg_id: MessageId,
    ) -> Result<Self, DecodeError> {
        if questions.is_empty() {
            return Err(DecodeError::EmptyGame);
        }
        if current_question >= questions.len() {
            return Err(DecodeError::CurrentQuestionOutOfRange {
                current: current_question,
                len: questions.len(),
            });
        }
        if score > current_question {
            return Err(DecodeError::ScoreExceedsProgress {
                score,
                current: current_question,
            });
        }

        Ok(Self {
            questions,
            current_question,
            score,
            last_question_msg_id,
        })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_question(&self) -> usize {
        self.current_question
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn last_question_msg_id(&self) -> MessageId {
        self.last_question_msg_id
    }

    async fn send_current_question<T: Transport>(
        &mut self,
        chat_id: ChatId,
        transport: &T,
    ) -> Result<(), BotError> {
        let question = &self.questions[self.current_question];
        self.last_question_msg_id = transport
            .send_text(
                chat_id,
                &question_message(question),
                Some(answers_keyboard(question)),
            )
            .await?;
        Ok(())
    }

    async fn process<T: Transport, Q: RetrieveQuestions>(
        &mut self,
        update: &ChatUpdate,
        factory: &StateFactory<T, Q>,
    ) -> Result<Transition, BotError> {
        let (chat_id, answer) = match update {
            ChatUpdate::TextMessage { chat_id, text } => match parse_answer(text) {
                Some(answer) => (*chat_id, answer),
                None => {
                    factory
                        .transport()
                        .send_text(*chat_id, UNPARSEABLE_ANSWER, None)
                        .await?;
                    return Ok(Transition::Stay);
                }
            },
            ChatUpdate::ButtonTap { chat_id, data } => match parse_answer(data) {
                Some(answer) => (*chat_id, answer),
                None => return Err(BotError::InvalidCallbackData(data.clone())),
            },
            _ => return Ok(Transition::Stay),
        };

        self.handle_answer(chat_id, answer, factory).await
    }

    async fn handle_answer<T: Transport, Q: RetrieveQuestions>(
        &mut self,
        chat_id: ChatId,
        answer: i64,
        factory: &StateFactory<T, Q>,
    ) -> Result<Transition, BotError> {
        let transport = factory.transport();
        let question = &self.questions[self.current_question];

        let answer = match usize::try_from(answer) {
            Ok(answer) if answer < question.answers().len() => answer,
            _ => {
                transport
                    .send_text(chat_id, &out_of_range_prompt(question), None)
                    .await?;
                return Ok(Transition::Stay);
            }
        };

        if question.is_correct(answer) {
            self.score += 1;
        }
        log::info!(
            "Chat {}: answer {} to question #{}, score {}",
            chat_id.0,
            answer,
            self.current_question + 1,
            self.score
        );

        transport
            .edit_text(
                chat_id,
                self.last_question_msg_id,
                &answered_question_message(answer, question),
            )
            .await?;
        self.current_question += 1;

        if self.current_question < self.questions.len() {
            self.send_current_question(chat_id, transport).await?;
            return Ok(Transition::Stay);
        }

        transport
            .send_text(
                chat_id,
                &final_score(self.score, self.current_question),
                None,
            )
            .await?;
        Ok(Transition::Switch(factory.idle()))
    }
}
