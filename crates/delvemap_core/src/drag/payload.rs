//! Drag payload crossing the UI boundary.
//!
//! # Invariants
//! - The card kind is an explicit discriminant (`card_type`); untagged or
//!   unknown kinds are rejected at parse time.
//! - `offset` is pointer-to-anchor correction only; placement never reads it.

use crate::geometry::hex::PixelPoint;
use crate::model::entity::EntityId;
use crate::model::placement::CardKind;
use serde::{Deserialize, Serialize};

/// Card being dragged, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "card_type", rename_all = "snake_case")]
pub enum DragPayload {
    Landmark {
        card_id: EntityId,
        #[serde(default)]
        offset: PixelPoint,
    },
    Delve {
        card_id: EntityId,
        #[serde(default)]
        offset: PixelPoint,
    },
}

impl DragPayload {
    pub fn new(kind: CardKind, card_id: EntityId, offset: PixelPoint) -> Self {
        match kind {
            CardKind::Landmark => Self::Landmark { card_id, offset },
            CardKind::Delve => Self::Delve { card_id, offset },
        }
    }

    /// Parses a payload serialized by the UI layer.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn card_id(&self) -> EntityId {
        match self {
            Self::Landmark { card_id, .. } | Self::Delve { card_id, .. } => *card_id,
        }
    }

    pub fn kind(&self) -> CardKind {
        match self {
            Self::Landmark { .. } => CardKind::Landmark,
            Self::Delve { .. } => CardKind::Delve,
        }
    }

    pub fn offset(&self) -> PixelPoint {
        match self {
            Self::Landmark { offset, .. } | Self::Delve { offset, .. } => *offset,
        }
    }
}
