//! Rate-limited client for the MineSkin skin generation API.
//!
//! MineSkin (<https://mineskin.org>) turns arbitrary images into Minecraft
//! skin textures signed by Mojang. The service throttles aggressively, so
//! [`MineSkinClient`] serializes requests through a single-flight lock and
//! honors the cooldown each response advertises before sending the next one.

pub mod client;
pub mod error;
pub mod response;

pub use client::MineSkinClient;
pub use error::MineSkinError;
pub use response::{SkinData, SkinResponse, SkinTexture};

use serde::{Deserialize, Serialize};

/// Skin variant (Steve vs Alex arm width)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SkinVariant {
    Classic, // Steve (4px arms)
    Slim,    // Alex (3px arms)
}

impl Default for SkinVariant {
    fn default() -> Self {
        Self::Classic
    }
}

impl std::fmt::Display for SkinVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkinVariant::Classic => write!(f, "classic"),
            SkinVariant::Slim => write!(f, "slim"),
        }
    }
}
