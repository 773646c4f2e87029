//! Test doubles for the controller tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tether_core::{
    ApiError, ApiResult, ButtonEvent, ButtonSpec, ChatClient, InboundEvent, InteractionHandle,
    MessageRef, Page, ReactionEvent, Settings, Tether, User,
};

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
    gone: AtomicBool,
}

impl RecordingClient {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn edits(&self) -> Vec<Page> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Edit(page) => Some(page.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls.lock().iter().filter(|c| *c == wanted).count()
    }

    /// Makes every later message call fail as if the message was deleted.
    pub fn delete_message(&self) {
        self.gone.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: Call, message: &MessageRef) -> ApiResult<()> {
        if self.gone.load(Ordering::SeqCst) {
            return Err(ApiError::UnknownMessage(message.message_id.clone()));
        }
        self.calls.lock().push(call);
        Ok(())
    }
}

#[async_trait]
impl ChatClient for RecordingClient {
    async fn add_reaction(&self, message: &MessageRef, glyph: &str) -> ApiResult<()> {
        self.record(Call::AddReaction(glyph.to_string()), message)
    }

    async fn remove_reaction(
        &self,
        message: &MessageRef,
        glyph: &str,
        user_id: &str,
    ) -> ApiResult<()> {
        self.record(
            Call::RemoveReaction(glyph.to_string(), user_id.to_string()),
            message,
        )
    }

    async fn clear_reactions(&self, message: &MessageRef) -> ApiResult<()> {
        self.record(Call::ClearReactions, message)
    }

    async fn edit_message(&self, message: &MessageRef, page: &Page) -> ApiResult<()> {
        self.record(Call::Edit(page.clone()), message)
    }

    async fn set_buttons(&self, message: &MessageRef, buttons: &[ButtonSpec]) -> ApiResult<()> {
        let ids = buttons.iter().map(|b| b.id.clone()).collect();
        self.record(Call::SetButtons(ids), message)
    }

    async fn clear_buttons(&self, message: &MessageRef) -> ApiResult<()> {
        self.record(Call::ClearButtons, message)
    }

    async fn fetch_user(&self, user_id: &str) -> ApiResult<User> {
        Ok(User::new(user_id, user_id))
    }

    async fn acknowledge(&self, _interaction: &InteractionHandle) -> ApiResult<()> {
        self.calls.lock().push(Call::Ack);
        Ok(())
    }
}

pub fn tether() -> (Tether, Arc<RecordingClient>) {
    tether_with(Settings::default())
}

pub fn tether_with(settings: Settings) -> (Tether, Arc<RecordingClient>) {
    let client = Arc::new(RecordingClient::default());
    let tether = Tether::builder(client.clone())
        .settings(settings)
        .isolated()
        .build();
    (tether, client)
}

pub fn group_message() -> MessageRef {
    MessageRef::group("guild", "channel", "message")
}

pub fn react(message: &MessageRef, user: &str, glyph: &str) -> InboundEvent {
    InboundEvent::ReactionAdded(ReactionEvent {
        message: message.clone(),
        user_id: user.to_string(),
        glyph: glyph.to_string(),
    })
}

pub fn click(message: &MessageRef, user: &str, component_id: &str) -> InboundEvent {
    InboundEvent::ButtonPressed(ButtonEvent {
        message: message.clone(),
        user: User::new(user, user),
        component_id: component_id.to_string(),
        interaction: InteractionHandle {
            id: "interaction".to_string(),
            token: "token".to_string(),
        },
    })
}
