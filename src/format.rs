//! Text rendering for questions, answers and the fixed bot replies.

use crate::database::Question;

pub const START_COMMAND: &str = "/startGame";

pub const GREETING: &str =
    "Hello. I am Trivia Bot. If you want to play the game,\nplease type /startGame";
pub const STARTING_GAME: &str = "Starting game!";
pub const IDLE_PROMPT: &str = "Type /startGame to start a new game.";
pub const NO_QUESTIONS: &str = "Sorry, there are no questions available right now.";
pub const UNPARSEABLE_ANSWER: &str = "Please, type the letter of your supposed answer.";

pub const CHECK_MARK: &str = "✅";
pub const CROSS_MARK: &str = "❌";
pub const RED_CIRCLE_MARK: &str = "🔴";

/// Whether `text` is the start command, also in its group-chat form
/// `/startGame@<botname>`.
pub fn is_start_command(text: &str) -> bool {
    let command = match text.split_once('@') {
        Some((command, bot_name)) if !bot_name.is_empty() && !bot_name.contains(' ') => command,
        _ => text,
    };
    command.eq_ignore_ascii_case(START_COMMAND)
}

/// Letter naming the answer at `index`: `a` for 0, `b` for 1 and so on.
pub fn answer_letter(index: usize) -> char {
    debug_assert!(index < 26);
    (b'a' + index as u8) as char
}

/// Reads an answer selector typed by the user or carried by a button.
///
/// A single letter selects by alphabet position, a number counts from 1.
/// The result is zero-based and may be negative or past the last answer;
/// numbers too large for `i64` saturate. `None` means the input is not a
/// selector at all.
pub fn parse_answer(input: &str) -> Option<i64> {
    let input = input.trim();
    let mut chars = input.chars();

    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_alphabetic() => {
            Some(i64::from(letter.to_ascii_lowercase() as u8 - b'a'))
        }
        (Some(_), _) if input.bytes().all(|b| b.is_ascii_digit()) => {
            Some(input.parse::<i64>().map_or(i64::MAX, |number| number - 1))
        }
        _ => None,
    }
}

pub fn question_message(question: &Question) -> String {
    let mut text = question.text().to_owned();
    for (i, answer) in question.answers().iter().enumerate() {
        text.push_str(&format!("\n{}) {}", answer_letter(i), answer));
    }
    text
}

/// The question as it reads once answered: the correct option, the
/// user's wrong pick and every other option each get their own mark.
pub fn answered_question_message(answer: usize, question: &Question) -> String {
    let mut text = question.text().to_owned();
    for (i, option) in question.answers().iter().enumerate() {
        let mark = if question.is_correct(i) {
            CHECK_MARK
        } else if i == answer {
            CROSS_MARK
        } else {
            RED_CIRCLE_MARK
        };
        text.push_str(&format!("\n{mark}{option}"));
    }
    text
}

pub fn out_of_range_prompt(question: &Question) -> String {
    format!(
        "Type the letter from a to {}.",
        answer_letter(question.answers().len() - 1)
    )
}

pub fn final_score(score: usize, total: usize) -> String {
    format!(
        "You got {score} points out of {total}.\nIf you want to try again, type {START_COMMAND} to start a new game."
    )
}
