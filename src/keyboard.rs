use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::{database::Question, format::answer_letter};

/// One button per answer, in a single row. The callback payload is the
/// answer's letter, which `format::parse_answer` reads back.
pub(crate) fn answers_keyboard(question: &Question) -> InlineKeyboardMarkup {
    let row: Vec<InlineKeyboardButton> = (0..question.answers().len())
        .map(|i| {
            let letter = answer_letter(i).to_string();
            InlineKeyboardButton::callback(letter.clone(), letter)
        })
        .collect();

    InlineKeyboardMarkup::new(vec![row])
}
