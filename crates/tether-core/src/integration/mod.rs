//! Integration layer: the boundary to the host chat SDK.

pub mod client;

pub use client::{BoxedClient, ChatClient};
