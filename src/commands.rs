use teloxide::utils::command::BotCommands;

/// Commands shown in the Telegram command menu. The state machine reads
/// the text itself; this only advertises it.
#[derive(Debug, Clone, BotCommands)]
#[command(rename_rule = "camelCase")]
pub enum Command {
    #[command(description = "start a new trivia game.")]
    StartGame,
}
