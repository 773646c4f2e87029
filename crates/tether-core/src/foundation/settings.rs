//! Engine settings shared by the router and the controllers.
//!
//! tether-runtime loads these from configuration files; they can also be
//! built in code.

use serde::{Deserialize, Serialize};

/// What to do with a button/menu interaction whose message has no registered
/// callback (typically a message whose controller already expired).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnmappedPolicy {
    /// Acknowledge and remove the stale controls from the message.
    #[default]
    StripControls,
    /// Acknowledge only.
    Ignore,
}

/// What a controller does when a pressed control has no mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingControlPolicy {
    /// Treat the press as a no-op.
    #[default]
    Ignore,
    /// Fail the callback; the router logs the failure.
    Error,
}

/// The glyphs used for built-in controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Glyphs {
    pub previous: String,
    pub next: String,
    pub accept: String,
    pub cancel: String,
    pub skip_backward: String,
    pub skip_forward: String,
    pub goto_first: String,
    pub goto_last: String,
}

impl Default for Glyphs {
    fn default() -> Self {
        Self {
            previous: "◀".to_string(),
            next: "▶".to_string(),
            accept: "✅".to_string(),
            cancel: "❎".to_string(),
            skip_backward: "⏪".to_string(),
            skip_forward: "⏩".to_string(),
            goto_first: "⏮".to_string(),
            goto_last: "⏭".to_string(),
        }
    }
}

impl Glyphs {
    /// All glyphs, labelled by role.
    pub fn all(&self) -> [(&'static str, &str); 8] {
        [
            ("previous", &self.previous),
            ("next", &self.next),
            ("accept", &self.accept),
            ("cancel", &self.cancel),
            ("skip_backward", &self.skip_backward),
            ("skip_forward", &self.skip_forward),
            ("goto_first", &self.goto_first),
            ("goto_last", &self.goto_last),
        ]
    }
}

/// Engine-wide behaviour switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// At most one callback invocation per message at a time.
    pub serialized: bool,

    /// Policy for interactions on messages without a callback.
    pub unmapped_interaction: UnmappedPolicy,

    /// Policy for presses of controls that have no mapping.
    pub missing_control: MissingControlPolicy,

    /// Remove the user's reaction after a press in group channels, so the
    /// same control can be pressed again.
    pub remove_user_reactions: bool,

    /// Glyphs for navigation, accept and cancel controls.
    pub glyphs: Glyphs,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            serialized: true,
            unmapped_interaction: UnmappedPolicy::default(),
            missing_control: MissingControlPolicy::default(),
            remove_user_reactions: true,
            glyphs: Glyphs::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: Settings = serde_json::from_str(
            r#"{ "serialized": false, "unmapped_interaction": "ignore", "glyphs": { "next": "→" } }"#,
        )
        .unwrap();

        assert!(!settings.serialized);
        assert_eq!(settings.unmapped_interaction, UnmappedPolicy::Ignore);
        assert_eq!(settings.missing_control, MissingControlPolicy::Ignore);
        assert_eq!(settings.glyphs.next, "→");
        assert_eq!(settings.glyphs.previous, "◀");
    }
}
