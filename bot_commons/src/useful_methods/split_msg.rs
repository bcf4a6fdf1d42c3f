use std::{future::Future, iter::Peekable};

use teloxide::{
    payloads::SendMessageSetters,
    requests::Requester,
    sugar::request::RequestReplyExt,
    types::{Message, MessageId, ParseMode, Recipient},
    Bot, RequestError,
};

pub trait BotSendChunks {
    /// Send a reply that was already split into message-sized chunks, in order,
    /// with HTML markup. Every chunk is sent once; the first failure aborts
    /// the rest and is returned as is.
    fn send_chunks<'a>(
        &'a self,
        to_where: impl Into<Recipient> + Send,
        chunks: &'a [String],
        reply_to: impl Into<Option<MessageId>> + Send,
    ) -> impl Future<Output = Result<Vec<Message>, RequestError>> + Send;
}

impl BotSendChunks for Bot {
    async fn send_chunks<'a>(
        &'a self,
        to_where: impl Into<Recipient> + Send,
        chunks: &'a [String],
        reply_to: impl Into<Option<MessageId>> + Send,
    ) -> Result<Vec<Message>, RequestError> {
        let to_where: Recipient = to_where.into();
        let reply_to = reply_to.into();
        let mut sent_messages = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            let mut request = self
                .send_message(to_where.clone(), chunk)
                .parse_mode(ParseMode::Html);
            if let Some(reply_to) = reply_to {
                request = request.reply_to(reply_to);
            }
            sent_messages.push(request.await?);
        }

        Ok(sent_messages)
    }
}

/// Length of text as Telegram measures it, in UTF-16 code units.
#[must_use]
pub fn telegram_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Iterator that glues consecutive pieces of text together with a separator,
/// starting a new chunk whenever the next piece would push the current one
/// over the maximum length.
///
/// Length is counted in UTF-16 code units, like Telegram does, so characters
/// outside the BMP such as most emoji count as two. Pieces are never cut:
/// a single piece longer than the limit becomes its own oversized chunk.
pub struct JoinUnderLength<I: Iterator> {
    pieces: Peekable<I>,
    separator: &'static str,
    max_len: usize,
}

impl<I: Iterator> JoinUnderLength<I> {
    /// Create a new joiner over `pieces` with specified max length in UTF-16 code units.
    #[must_use]
    pub fn new(
        pieces: impl IntoIterator<IntoIter = I>,
        separator: &'static str,
        max_len: usize,
    ) -> JoinUnderLength<I> {
        JoinUnderLength {
            pieces: pieces.into_iter().peekable(),
            separator,
            max_len,
        }
    }
}

impl<I, S> Iterator for JoinUnderLength<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = String;
    fn next(&mut self) -> Option<Self::Item> {
        let first = self.pieces.next()?;
        let mut output = first.as_ref().to_string();
        let mut output_len = telegram_len(&output);
        let separator_len = telegram_len(self.separator);

        // Take as many of the following pieces as we can fit.
        while let Some(piece) = self.pieces.peek() {
            let piece = piece.as_ref();
            let total_len = output_len + separator_len + telegram_len(piece);
            if total_len > self.max_len {
                break;
            }
            output.push_str(self.separator);
            output.push_str(piece);
            output_len = total_len;
            self.pieces.next();
        }

        Some(output)
    }
}
