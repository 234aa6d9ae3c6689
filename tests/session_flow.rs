mod common;

use common::{dispatcher, question, tap, text};
use teloxide::types::{ChatId, MessageId};
use triviabot::{
    codec,
    database::{Question, SessionStore},
    error::BotError,
    format::{final_score, GREETING, IDLE_PROMPT, NO_QUESTIONS, STARTING_GAME, UNPARSEABLE_ANSWER},
    state::StateKind,
    update::{ChatUpdate, MemberStatus},
};

const CHAT: ChatId = ChatId(42);

fn three_questions() -> Vec<Question> {
    vec![
        question("sky?", &["orange", "blue", "green"], 1),
        question("2+5?", &["4", "10", "7", "8"], 2),
        question("Christmas?", &["Dec 24", "Apr 15", "Jan 1", "Dec 25"], 3),
    ]
}

async fn stored_kind(dispatcher: &common::TestDispatcher, chat_id: ChatId) -> StateKind {
    let snapshot = dispatcher.store().get(chat_id).await.unwrap().unwrap();
    codec::decode(chat_id, &snapshot).unwrap().kind().clone()
}

#[tokio::test]
async fn plays_a_whole_game() {
    let (transport, dispatcher) = dispatcher(three_questions());

    dispatcher.handle_update(text(CHAT, "hello")).await.unwrap();
    assert_eq!(transport.texts(), [GREETING]);
    assert_eq!(stored_kind(&dispatcher, CHAT).await, StateKind::Idle);

    transport.clear();
    dispatcher.handle_update(text(CHAT, "/startGame")).await.unwrap();
    assert_eq!(
        transport.texts(),
        [STARTING_GAME, "sky?\na) orange\nb) blue\nc) green"]
    );

    transport.clear();
    dispatcher.handle_update(text(CHAT, "b")).await.unwrap();
    assert_eq!(
        transport.sent()[0],
        common::Sent::Edit {
            chat_id: CHAT,
            message_id: MessageId(3),
            text: "sky?\n🔴orange\n✅blue\n🔴green".into(),
        }
    );
    assert_eq!(transport.texts()[1], "2+5?\na) 4\nb) 10\nc) 7\nd) 8");

    transport.clear();
    dispatcher.handle_update(tap(CHAT, "a")).await.unwrap();
    assert_eq!(
        transport.texts(),
        [
            "2+5?\n❌4\n🔴10\n✅7\n🔴8",
            "Christmas?\na) Dec 24\nb) Apr 15\nc) Jan 1\nd) Dec 25",
        ]
    );

    transport.clear();
    dispatcher.handle_update(text(CHAT, "D")).await.unwrap();
    assert_eq!(
        transport.texts(),
        [
            "Christmas?\n🔴Dec 24\n🔴Apr 15\n🔴Jan 1\n✅Dec 25".to_owned(),
            final_score(2, 3),
        ]
    );
    assert_eq!(stored_kind(&dispatcher, CHAT).await, StateKind::Idle);

    transport.clear();
    dispatcher.handle_update(text(CHAT, "b")).await.unwrap();
    assert_eq!(transport.texts(), [IDLE_PROMPT]);
}

#[tokio::test]
async fn bad_answers_keep_the_question_open() {
    let (transport, dispatcher) = dispatcher(three_questions());
    dispatcher.handle_update(text(CHAT, "hello")).await.unwrap();
    dispatcher.handle_update(text(CHAT, "/STARTGAME")).await.unwrap();
    transport.clear();

    dispatcher.handle_update(text(CHAT, "first")).await.unwrap();
    dispatcher.handle_update(text(CHAT, "z")).await.unwrap();
    dispatcher.handle_update(text(CHAT, "0")).await.unwrap();
    dispatcher
        .handle_update(text(CHAT, "99999999999999999999"))
        .await
        .unwrap();
    dispatcher
        .handle_update(ChatUpdate::Unsupported { chat_id: CHAT })
        .await
        .unwrap();

    assert_eq!(
        transport.texts(),
        [
            UNPARSEABLE_ANSWER,
            "Type the letter from a to c.",
            "Type the letter from a to c.",
            "Type the letter from a to c.",
        ]
    );
    let snapshot = dispatcher.store().get(CHAT).await.unwrap().unwrap();
    let state = codec::decode(CHAT, &snapshot).unwrap();
    let game = state.game().unwrap();
    assert_eq!(game.current_question(), 0);
    assert_eq!(game.score(), 0);

    // digits count from one
    transport.clear();
    dispatcher.handle_update(text(CHAT, "2")).await.unwrap();
    assert_eq!(transport.texts()[0], "sky?\n🔴orange\n✅blue\n🔴green");
}

#[tokio::test]
async fn garbage_callback_data_is_an_error() {
    let (transport, dispatcher) = dispatcher(three_questions());
    dispatcher.handle_update(text(CHAT, "hello")).await.unwrap();
    dispatcher.handle_update(text(CHAT, "/startGame")).await.unwrap();
    let before = dispatcher.store().get(CHAT).await.unwrap();
    transport.clear();

    let result = dispatcher.handle_update(tap(CHAT, "not a letter")).await;

    assert!(matches!(result, Err(BotError::InvalidCallbackData(data)) if data == "not a letter"));
    assert!(transport.sent().is_empty());
    assert_eq!(dispatcher.store().get(CHAT).await.unwrap(), before);
}

#[tokio::test]
async fn restored_game_continues_where_it_stopped() {
    let (_, first) = dispatcher(three_questions());
    first.handle_update(text(CHAT, "hello")).await.unwrap();
    first.handle_update(text(CHAT, "/startGame")).await.unwrap();
    let snapshot = first.store().get(CHAT).await.unwrap().unwrap();

    let (transport, second) = dispatcher(three_questions());
    second.store().put(CHAT, snapshot).await.unwrap();
    second.handle_update(text(CHAT, "c")).await.unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(
        sent[0],
        common::Sent::Edit {
            chat_id: CHAT,
            message_id: MessageId(3),
            text: "sky?\n🔴orange\n✅blue\n❌green".into(),
        }
    );
    assert_eq!(sent[1].text(), "2+5?\na) 4\nb) 10\nc) 7\nd) 8");
}

#[tokio::test]
async fn failed_send_leaves_the_session_untouched() {
    let (transport, dispatcher) = dispatcher(three_questions());
    dispatcher.handle_update(text(CHAT, "hello")).await.unwrap();
    dispatcher.handle_update(text(CHAT, "/startGame")).await.unwrap();
    let before = dispatcher.store().get(CHAT).await.unwrap();

    transport.set_blocked(true);
    let result = dispatcher.handle_update(text(CHAT, "b")).await;
    assert!(matches!(result, Err(BotError::Transport(_))));
    assert_eq!(dispatcher.store().get(CHAT).await.unwrap(), before);

    transport.set_blocked(false);
    transport.clear();
    dispatcher.handle_update(text(CHAT, "b")).await.unwrap();
    assert_eq!(transport.texts()[0], "sky?\n🔴orange\n✅blue\n🔴green");
}

#[tokio::test]
async fn replayed_answer_repeats_the_edit_and_moves_on() {
    let (transport, dispatcher) = dispatcher(three_questions());
    dispatcher.handle_update(text(CHAT, "hello")).await.unwrap();
    dispatcher.handle_update(text(CHAT, "/startGame")).await.unwrap();
    let before = dispatcher.store().get(CHAT).await.unwrap();
    transport.clear();

    // the edit lands, asking question 2 does not
    transport.fail_next_send();
    let result = dispatcher.handle_update(text(CHAT, "b")).await;
    assert!(matches!(result, Err(BotError::Transport(_))));
    assert_eq!(dispatcher.store().get(CHAT).await.unwrap(), before);
    assert_eq!(transport.texts(), ["sky?\n🔴orange\n✅blue\n🔴green"]);

    transport.clear();
    dispatcher.handle_update(text(CHAT, "b")).await.unwrap();

    let sent = transport.sent();
    assert_eq!(
        sent[0],
        common::Sent::Edit {
            chat_id: CHAT,
            message_id: MessageId(3),
            text: "sky?\n🔴orange\n✅blue\n🔴green".into(),
        }
    );
    assert_eq!(sent[1].text(), "2+5?\na) 4\nb) 10\nc) 7\nd) 8");

    let snapshot = dispatcher.store().get(CHAT).await.unwrap().unwrap();
    let state = codec::decode(CHAT, &snapshot).unwrap();
    let game = state.game().unwrap();
    assert_eq!(game.current_question(), 1);
    assert_eq!(game.score(), 1);
}

#[tokio::test]
async fn no_questions_keeps_the_chat_idle() {
    let (transport, dispatcher) = dispatcher(Vec::new());
    dispatcher.handle_update(text(CHAT, "hello")).await.unwrap();
    transport.clear();

    dispatcher.handle_update(text(CHAT, "/startGame")).await.unwrap();

    assert_eq!(transport.texts(), [NO_QUESTIONS]);
    assert_eq!(stored_kind(&dispatcher, CHAT).await, StateKind::Idle);
}

#[tokio::test]
async fn blocked_chat_starts_over() {
    let (transport, dispatcher) = dispatcher(three_questions());
    dispatcher.handle_update(text(CHAT, "hello")).await.unwrap();
    dispatcher.handle_update(text(CHAT, "/startGame")).await.unwrap();

    dispatcher
        .handle_update(ChatUpdate::Membership {
            chat_id: CHAT,
            status: MemberStatus::Banned,
        })
        .await
        .unwrap();
    assert_eq!(dispatcher.store().get(CHAT).await.unwrap(), None);
    assert_eq!(dispatcher.store().session_count().await, 0);

    transport.clear();
    dispatcher.handle_update(text(CHAT, "b")).await.unwrap();
    assert_eq!(transport.texts(), [GREETING]);
}

#[tokio::test]
async fn chats_do_not_share_games() {
    let other = ChatId(-1001);
    let (transport, dispatcher) = dispatcher(three_questions());

    for chat_id in [CHAT, other] {
        dispatcher.handle_update(text(chat_id, "hello")).await.unwrap();
        dispatcher.handle_update(text(chat_id, "/startGame")).await.unwrap();
    }
    transport.clear();

    let (a, b) = tokio::join!(
        dispatcher.handle_update(text(CHAT, "b")),
        dispatcher.handle_update(text(other, "a")),
    );
    a.unwrap();
    b.unwrap();
    assert_eq!(dispatcher.store().session_count().await, 2);

    assert_eq!(transport.texts_for(CHAT)[0], "sky?\n🔴orange\n✅blue\n🔴green");
    assert_eq!(transport.texts_for(other)[0], "sky?\n❌orange\n✅blue\n🔴green");

    let score = |snapshot: String, chat_id| {
        codec::decode(chat_id, &snapshot)
            .unwrap()
            .game()
            .map(|game| game.score())
    };
    let mine = dispatcher.store().get(CHAT).await.unwrap().unwrap();
    let theirs = dispatcher.store().get(other).await.unwrap().unwrap();
    assert_eq!(score(mine, CHAT), Some(1));
    assert_eq!(score(theirs, other), Some(0));
}
