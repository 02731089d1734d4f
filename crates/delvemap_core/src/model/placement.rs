//! Placement and connection records for the delve map.
//!
//! # Responsibility
//! - Define axial hex positions, placed-card records and typed connections.
//! - Encode which connection kind fits which pair of card kinds.
//!
//! # Invariants
//! - `HexPosition` equality is exact component equality.
//! - Connection kinds are order-independent: `(landmark, delve)` and
//!   `(delve, landmark)` both require `LandmarkToDelve`.

use crate::model::entity::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Axial hex coordinate. Unbounded in both directions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct HexPosition {
    pub q: i32,
    pub r: i32,
}

impl HexPosition {
    pub const ORIGIN: HexPosition = HexPosition { q: 0, r: 0 };

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Position shifted by `(dq, dr)`, or `None` when it leaves the `i32` range.
    pub fn checked_offset(self, dq: i64, dr: i64) -> Option<Self> {
        let q = i32::try_from(i64::from(self.q) + dq).ok()?;
        let r = i32::try_from(i64::from(self.r) + dr).ok()?;
        Some(Self { q, r })
    }
}

impl Display for HexPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Kind of card that can be placed on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Landmark,
    Delve,
}

impl CardKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Landmark => "landmark",
            Self::Delve => "delve",
        }
    }
}

impl Display for CardKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One card occupying one hex cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedCard {
    pub id: EntityId,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: CardKind,
    pub position: HexPosition,
}

/// Typed edge between two placed cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionKind {
    LandmarkToDelve,
    DelveToDelve,
    LandmarkToLandmark,
}

impl ConnectionKind {
    /// Returns the only connection kind valid between two card kinds.
    pub fn between(a: CardKind, b: CardKind) -> Self {
        match (a, b) {
            (CardKind::Landmark, CardKind::Landmark) => Self::LandmarkToLandmark,
            (CardKind::Delve, CardKind::Delve) => Self::DelveToDelve,
            _ => Self::LandmarkToDelve,
        }
    }

    /// Whether this kind fits the endpoint kinds, in either order.
    pub fn accepts(self, a: CardKind, b: CardKind) -> bool {
        self == Self::between(a, b)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LandmarkToDelve => "landmark-to-delve",
            Self::DelveToDelve => "delve-to-delve",
            Self::LandmarkToLandmark => "landmark-to-landmark",
        }
    }
}

impl Display for ConnectionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection between two placed cards.
///
/// `from_id`/`to_id` record the order the user linked them in; they do not
/// encode kind order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub from_id: EntityId,
    pub to_id: EntityId,
    #[serde(rename = "type")]
    pub kind: ConnectionKind,
}

impl Connection {
    /// Whether either endpoint is `id`.
    pub fn touches(&self, id: EntityId) -> bool {
        self.from_id == id || self.to_id == id
    }

    /// Whether this connection links `a` and `b` in either direction.
    pub fn links(&self, a: EntityId, b: EntityId) -> bool {
        (self.from_id == a && self.to_id == b) || (self.from_id == b && self.to_id == a)
    }

    /// Returns the endpoint opposite to `id`, if `id` is an endpoint.
    pub fn other_end(&self, id: EntityId) -> Option<EntityId> {
        if self.from_id == id {
            Some(self.to_id)
        } else if self.to_id == id {
            Some(self.from_id)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CardKind, Connection, ConnectionKind, HexPosition, PlacedCard};
    use uuid::Uuid;

    #[test]
    fn connection_kind_is_order_independent() {
        assert!(ConnectionKind::LandmarkToDelve.accepts(CardKind::Delve, CardKind::Landmark));
        assert!(ConnectionKind::LandmarkToDelve.accepts(CardKind::Landmark, CardKind::Delve));
        assert!(!ConnectionKind::DelveToDelve.accepts(CardKind::Landmark, CardKind::Delve));
        assert!(!ConnectionKind::LandmarkToLandmark.accepts(CardKind::Delve, CardKind::Delve));
    }

    #[test]
    fn links_ignores_direction() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let connection = Connection {
            from_id: a,
            to_id: b,
            kind: ConnectionKind::DelveToDelve,
        };
        assert!(connection.links(b, a));
        assert_eq!(connection.other_end(b), Some(a));
        assert_eq!(connection.other_end(Uuid::new_v4()), None);
    }

    #[test]
    fn wire_names_match_external_schema() {
        let card = PlacedCard {
            id: Uuid::new_v4(),
            kind: CardKind::Delve,
            position: HexPosition::new(2, -1),
        };
        let json = serde_json::to_value(card).unwrap();
        assert_eq!(json["type"], "delve");
        assert_eq!(json["position"]["q"], 2);
        assert_eq!(json["position"]["r"], -1);

        let kind = serde_json::to_value(ConnectionKind::LandmarkToDelve).unwrap();
        assert_eq!(kind, "landmark-to-delve");
    }
}
