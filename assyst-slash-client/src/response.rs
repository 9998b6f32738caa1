use std::fmt::Display;

use twilight_model::channel::message::MessageFlags;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};

pub struct ResponseBuilder(InteractionResponse);

impl ResponseBuilder {
    #[must_use]
    pub fn new(kind: InteractionResponseType) -> Self {
        Self(InteractionResponse { kind, data: None })
    }

    #[must_use]
    pub fn channel_message_with_source() -> Self {
        Self::new(InteractionResponseType::ChannelMessageWithSource)
    }

    #[must_use]
    pub fn build(self) -> InteractionResponse {
        self.0
    }

    #[must_use]
    pub fn content(mut self, content: impl Display) -> Self {
        self.0.data.get_or_insert(<_>::default()).content = Some(format!("{content}"));
        self
    }

    #[must_use]
    pub fn ephemeral(mut self, value: bool) -> Self {
        let f = self
            .0
            .data
            .get_or_insert(<_>::default())
            .flags
            .get_or_insert(MessageFlags::empty());

        if value {
            f.insert(MessageFlags::EPHEMERAL);
        } else {
            f.remove(MessageFlags::EPHEMERAL);
        }

        self
    }
}
