//! Inbound events and the context handed to callbacks.
//!
//! The host SDK adapter converts its own gateway events into
//! [`InboundEvent`]s and forwards them to the
//! [`InteractionRouter`](crate::InteractionRouter). Only the shape tether needs
//! is modelled here:
//!
//! - [`InboundEvent`] - what happened (reaction, button, selection, deletion)
//! - [`MessageRef`] - which message it happened to
//! - [`InteractionContext`] - what a registered callback receives

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::foundation::key::Key;

// ============================================================================
// Identities
// ============================================================================

/// Identity of a message on the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel_id: String,
    pub message_id: String,
    /// The guild/group the channel belongs to, `None` for direct messages.
    #[serde(default)]
    pub guild_id: Option<String>,
}

impl MessageRef {
    /// A message in a group channel.
    pub fn group(
        guild_id: impl Into<String>,
        channel_id: impl Into<String>,
        message_id: impl Into<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            message_id: message_id.into(),
            guild_id: Some(guild_id.into()),
        }
    }

    /// A message in a direct conversation.
    pub fn direct(channel_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            message_id: message_id.into(),
            guild_id: None,
        }
    }

    pub fn is_group(&self) -> bool {
        self.guild_id.is_some()
    }

    /// The registry key of this message.
    pub fn key(&self) -> Key {
        Key::compute(self.is_group(), &self.channel_id, &self.message_id)
    }
}

/// A user as seen by tether.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Bots and service accounts never drive interactive messages.
    #[serde(default)]
    pub bot: bool,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bot: false,
        }
    }

    pub fn bot(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bot: true,
        }
    }
}

/// Handle used to acknowledge an interaction-style event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionHandle {
    pub id: String,
    pub token: String,
}

// ============================================================================
// Inbound events
// ============================================================================

/// A reaction being added to or removed from a message.
///
/// Reaction events only carry the user id; the router resolves the full
/// [`User`] through the host SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub message: MessageRef,
    pub user_id: String,
    pub glyph: String,
}

/// A button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonEvent {
    pub message: MessageRef,
    pub user: User,
    pub component_id: String,
    pub interaction: InteractionHandle,
}

/// A change of the selected values in a select menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEvent {
    pub message: MessageRef,
    pub user: User,
    pub component_id: String,
    pub values: Vec<String>,
    pub interaction: InteractionHandle,
}

/// Every event the router understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    ReactionAdded(ReactionEvent),
    ReactionRemoved(ReactionEvent),
    MessageDeleted(MessageRef),
    ButtonPressed(ButtonEvent),
    SelectionChanged(SelectionEvent),
}

impl InboundEvent {
    /// Returns the human-readable name of this event type.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::ReactionAdded(_) => "reaction_added",
            Self::ReactionRemoved(_) => "reaction_removed",
            Self::MessageDeleted(_) => "message_deleted",
            Self::ButtonPressed(_) => "button_pressed",
            Self::SelectionChanged(_) => "selection_changed",
        }
    }

    /// The message this event refers to.
    pub fn message(&self) -> &MessageRef {
        match self {
            Self::ReactionAdded(e) | Self::ReactionRemoved(e) => &e.message,
            Self::MessageDeleted(message) => message,
            Self::ButtonPressed(e) => &e.message,
            Self::SelectionChanged(e) => &e.message,
        }
    }

    /// The interaction to acknowledge, for interaction-style events.
    pub fn interaction(&self) -> Option<&InteractionHandle> {
        match self {
            Self::ButtonPressed(e) => Some(&e.interaction),
            Self::SelectionChanged(e) => Some(&e.interaction),
            _ => None,
        }
    }

    /// The registry key of the target message.
    pub fn key(&self) -> Key {
        self.message().key()
    }
}

// ============================================================================
// Callback context
// ============================================================================

/// What the user did to trigger a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// A reaction was added (`added == true`) or removed.
    Reaction { glyph: String, added: bool },
    /// A button was pressed.
    Button { component_id: String },
    /// A select menu changed.
    Selection {
        component_id: String,
        values: Vec<String>,
    },
}

/// The context passed to a registered callback.
#[derive(Debug, Clone)]
pub struct InteractionContext {
    key: Key,
    message: MessageRef,
    user: User,
    trigger: Trigger,
    selections: HashMap<String, Vec<String>>,
}

impl InteractionContext {
    pub fn new(
        key: Key,
        message: MessageRef,
        user: User,
        trigger: Trigger,
        selections: HashMap<String, Vec<String>>,
    ) -> Self {
        Self {
            key,
            message,
            user,
            trigger,
            selections,
        }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn message(&self) -> &MessageRef {
        &self.message
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// Last-seen selection values for every select menu on the message.
    pub fn selections(&self) -> &HashMap<String, Vec<String>> {
        &self.selections
    }

    /// The glyph of the pressed control, if the trigger was a press.
    pub fn glyph(&self) -> Option<&str> {
        match &self.trigger {
            Trigger::Reaction { glyph, .. } => Some(glyph),
            Trigger::Button { component_id } => Some(component_id),
            Trigger::Selection { .. } => None,
        }
    }

    /// Whether the press came in as a newly added reaction.
    pub fn is_reaction_add(&self) -> bool {
        matches!(self.trigger, Trigger::Reaction { added: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_shared_across_event_types() {
        let message = MessageRef::group("g", "c", "m");
        let reaction = InboundEvent::ReactionAdded(ReactionEvent {
            message: message.clone(),
            user_id: "u".into(),
            glyph: "▶".into(),
        });
        let deleted = InboundEvent::MessageDeleted(message.clone());
        let button = InboundEvent::ButtonPressed(ButtonEvent {
            message: message.clone(),
            user: User::new("u", "user"),
            component_id: "▶".into(),
            interaction: InteractionHandle {
                id: "i".into(),
                token: "t".into(),
            },
        });

        assert_eq!(reaction.key(), message.key());
        assert_eq!(deleted.key(), message.key());
        assert_eq!(button.key(), message.key());
        assert!(reaction.interaction().is_none());
        assert!(button.interaction().is_some());
    }

    #[test]
    fn test_context_glyph() {
        let ctx = InteractionContext::new(
            Key::compute(false, "c", "m"),
            MessageRef::direct("c", "m"),
            User::new("u", "user"),
            Trigger::Selection {
                component_id: "menu".into(),
                values: vec!["a".into()],
            },
            HashMap::new(),
        );
        assert_eq!(ctx.glyph(), None);
        assert!(!ctx.is_reaction_add());
    }
}
