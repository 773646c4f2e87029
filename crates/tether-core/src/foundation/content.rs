//! Message content shown by interactive messages.
//!
//! A [`Page`] is what a controller renders into its message: plain text, one
//! rich embed, or a cluster of embeds. Pages are immutable once built and the
//! cluster size is validated at construction.

use serde::{Deserialize, Serialize};

use crate::foundation::error::{TetherError, TetherResult};

/// Largest number of embeds a single message may carry.
pub const MAX_EMBEDS: usize = 9;

/// A field inside an [`Embed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

/// A rich content block.
///
/// Only the parts tether itself needs are modelled; the host adapter maps this
/// onto its own embed type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

impl Embed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }
}

/// Between one and [`MAX_EMBEDS`] embeds, shown together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EmbedCluster(Vec<Embed>);

impl EmbedCluster {
    /// Builds a cluster, rejecting empty or oversized collections.
    pub fn new(embeds: Vec<Embed>) -> TetherResult<Self> {
        match embeds.len() {
            0 => Err(TetherError::invalid_page("an embed cluster needs at least one embed")),
            n if n > MAX_EMBEDS => Err(TetherError::invalid_page(format!(
                "an embed cluster holds at most {MAX_EMBEDS} embeds, got {n}"
            ))),
            _ => Ok(Self(embeds)),
        }
    }

    pub fn embeds(&self) -> &[Embed] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The content of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Page {
    /// Plain message text.
    Text(String),
    /// A single embed.
    Embed(Embed),
    /// Several embeds shown at once.
    Cluster(EmbedCluster),
}

impl Page {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn embed(embed: Embed) -> Self {
        Self::Embed(embed)
    }

    /// Builds a cluster page. Fails when `embeds` is empty or too large.
    pub fn cluster(embeds: Vec<Embed>) -> TetherResult<Self> {
        EmbedCluster::new(embeds).map(Self::Cluster)
    }

    /// Short human-readable summary, used in logs.
    pub fn summary(&self) -> String {
        match self {
            Self::Text(text) => {
                let head: String = text.chars().take(32).collect();
                format!("text({head})")
            }
            Self::Embed(embed) => format!("embed({})", embed.title.as_deref().unwrap_or("")),
            Self::Cluster(cluster) => format!("cluster({})", cluster.len()),
        }
    }
}

impl From<String> for Page {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Page {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Embed> for Page {
    fn from(embed: Embed) -> Self {
        Self::Embed(embed)
    }
}

/// A clickable button rendered on a message.
///
/// The `id` is the glyph itself, so a press maps back to the same control
/// regardless of whether it was rendered as a reaction or a button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSpec {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
}

impl ButtonSpec {
    pub fn new(glyph: impl Into<String>) -> Self {
        let id = glyph.into();
        Self {
            label: id.clone(),
            id,
            disabled: false,
        }
    }

    /// Sets the text shown on the button.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}
