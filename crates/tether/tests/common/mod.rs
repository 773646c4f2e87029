//! A host double recording what the engine asks of it.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tether::prelude::*;
use tether::core::ApiResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AddReaction(String),
    RemoveReaction(String, String),
    ClearReactions,
    Edit(Page),
    SetButtons(Vec<String>),
    ClearButtons,
    Ack,
}

#[derive(Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<Call>>,
}

impl RecordingClient {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn last_edit(&self) -> Option<Page> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            Call::Edit(page) => Some(page.clone()),
            _ => None,
        })
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls.lock().iter().filter(|c| *c == wanted).count()
    }

    fn record(&self, call: Call) -> ApiResult<()> {
        self.calls.lock().push(call);
        Ok(())
    }
}

#[async_trait]
impl ChatClient for RecordingClient {
    async fn add_reaction(&self, _: &MessageRef, glyph: &str) -> ApiResult<()> {
        self.record(Call::AddReaction(glyph.to_string()))
    }

    async fn remove_reaction(&self, _: &MessageRef, glyph: &str, user_id: &str) -> ApiResult<()> {
        self.record(Call::RemoveReaction(glyph.to_string(), user_id.to_string()))
    }

    async fn clear_reactions(&self, _: &MessageRef) -> ApiResult<()> {
        self.record(Call::ClearReactions)
    }

    async fn edit_message(&self, _: &MessageRef, page: &Page) -> ApiResult<()> {
        self.record(Call::Edit(page.clone()))
    }

    async fn set_buttons(&self, _: &MessageRef, buttons: &[ButtonSpec]) -> ApiResult<()> {
        self.record(Call::SetButtons(
            buttons.iter().map(|b| b.id.clone()).collect(),
        ))
    }

    async fn clear_buttons(&self, _: &MessageRef) -> ApiResult<()> {
        self.record(Call::ClearButtons)
    }

    async fn fetch_user(&self, user_id: &str) -> ApiResult<User> {
        Ok(User::new(user_id, user_id))
    }

    async fn acknowledge(&self, _: &InteractionHandle) -> ApiResult<()> {
        self.record(Call::Ack)
    }
}

/// An isolated runtime that leaves the process-wide handle alone.
pub fn runtime() -> (TetherRuntime, Arc<RecordingClient>) {
    let client = Arc::new(RecordingClient::default());
    let runtime = TetherRuntime::builder(client.clone())
        .config(TetherConfig::default())
        .isolated()
        .without_logging()
        .activate(false)
        .build()
        .expect("default config is valid");
    (runtime, client)
}

pub fn message() -> MessageRef {
    MessageRef::group("guild", "channel", "message")
}

pub fn react(message: &MessageRef, user: &str, glyph: &str) -> InboundEvent {
    InboundEvent::ReactionAdded(ReactionEvent {
        message: message.clone(),
        user_id: user.to_string(),
        glyph: glyph.to_string(),
    })
}
