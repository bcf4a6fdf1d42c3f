mod split_msg;
pub use split_msg::*;

use teloxide::types::{Message, UserId};

pub trait MessageStuff {
    /// Text of the message, or its caption if it's a media message.
    fn text_full(&self) -> Option<&str>;
    /// ID of the user who sent this message, if it was sent by a user
    /// and not by a channel or anonymous admin.
    fn sender_user_id(&self) -> Option<UserId>;
}

impl MessageStuff for Message {
    fn text_full(&self) -> Option<&str> {
        self.text().or_else(|| self.caption())
    }
    fn sender_user_id(&self) -> Option<UserId> {
        if self.sender_chat.is_some() {
            return None;
        }
        self.from.as_ref().map(|user| user.id)
    }
}
