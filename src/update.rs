use teloxide::{
    dispatching::dialogue::GetChatId,
    types::{ChatId, ChatMemberStatus, Update, UpdateKind},
};

/// What the bot's membership in a chat became.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Present,
    Left,
    Banned,
}

impl MemberStatus {
    /// Whether the bot can no longer talk to the chat.
    pub fn is_unreachable(self) -> bool {
        matches!(self, MemberStatus::Left | MemberStatus::Banned)
    }
}

/// An inbound update, reduced to what the chat session cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatUpdate {
    TextMessage { chat_id: ChatId, text: String },
    ButtonTap { chat_id: ChatId, data: String },
    Membership { chat_id: ChatId, status: MemberStatus },
    /// A message the session has no use for, e.g. a sticker.
    Unsupported { chat_id: ChatId },
}

impl ChatUpdate {
    pub fn chat_id(&self) -> ChatId {
        match self {
            ChatUpdate::TextMessage { chat_id, .. }
            | ChatUpdate::ButtonTap { chat_id, .. }
            | ChatUpdate::Membership { chat_id, .. }
            | ChatUpdate::Unsupported { chat_id } => *chat_id,
        }
    }

    /// Returns `None` for update kinds that are not routed to a session,
    /// such as channel posts.
    pub fn from_update(update: &Update) -> Option<Self> {
        match &update.kind {
            UpdateKind::Message(msg) => Some(match msg.text() {
                Some(text) => ChatUpdate::TextMessage {
                    chat_id: msg.chat.id,
                    text: text.to_owned(),
                },
                None => ChatUpdate::Unsupported {
                    chat_id: msg.chat.id,
                },
            }),
            UpdateKind::CallbackQuery(q) => Some(ChatUpdate::ButtonTap {
                chat_id: q.chat_id().unwrap_or_else(|| ChatId::from(q.from.id)),
                data: q.data.clone().unwrap_or_default(),
            }),
            UpdateKind::MyChatMember(member) => {
                let status = match member.new_chat_member.kind.status() {
                    ChatMemberStatus::Left => MemberStatus::Left,
                    ChatMemberStatus::Banned => MemberStatus::Banned,
                    _ => MemberStatus::Present,
                };
                Some(ChatUpdate::Membership {
                    chat_id: member.chat.id,
                    status,
                })
            }
            _ => None,
        }
    }
}
