//! Foundation layer: keys, events, content, errors and settings.

pub mod content;
pub mod error;
pub mod event;
pub mod key;
pub mod settings;

pub use content::{ButtonSpec, Embed, EmbedCluster, EmbedField, MAX_EMBEDS, Page};
pub use error::{
    ApiError, ApiResult, BoxError, SchedulerError, SchedulerResult, TetherError, TetherResult,
};
pub use event::{
    ButtonEvent, InboundEvent, InteractionContext, InteractionHandle, MessageRef, ReactionEvent,
    SelectionEvent, Trigger, User,
};
pub use key::Key;
pub use settings::{Glyphs, MissingControlPolicy, Settings, UnmappedPolicy};
