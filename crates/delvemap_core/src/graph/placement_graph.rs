//! Spatial placement and connection graph.
//!
//! # Responsibility
//! - Map each placed card id to exactly one hex cell.
//! - Maintain typed connections between placed cards.
//! - Repair persisted placement data that violates graph invariants.
//!
//! # Invariants
//! - No two placed cards share a cell (exact position equality).
//! - Every connection joins two distinct placed cards, with a kind that matches
//!   the endpoint kinds, and at most one connection exists per unordered pair.
//! - Removing a placement removes its connections in the same call.
//! - Placement holds ids only; card bodies stay in `EntityStore`.

use crate::geometry::hex::HexGeometry;
use crate::model::entity::EntityId;
use crate::model::placement::{CardKind, Connection, ConnectionKind, HexPosition, PlacedCard};
use crate::store::entity_store::EntityStore;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PlacementResult<T> = Result<T, PlacementError>;

/// Recoverable placement/connection failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// No entity of the requested kind exists for this id.
    EntityNotFound(EntityId),
    /// Target cell is held by another card.
    CellOccupied {
        position: HexPosition,
        occupant: EntityId,
    },
    /// Card has no current placement.
    CardNotPlaced(EntityId),
    /// Card already has a placement; use move instead.
    AlreadyPlaced(EntityId),
    /// Both connection endpoints are the same card.
    SelfConnection(EntityId),
    /// A connection endpoint is not placed on the map.
    EndpointNotPlaced(EntityId),
    /// Requested connection kind does not fit the endpoint kinds.
    TypeMismatch {
        requested: ConnectionKind,
        expected: ConnectionKind,
    },
    /// The pair is already connected (in either direction).
    DuplicateConnection { from_id: EntityId, to_id: EntityId },
    /// No connection links the pair.
    ConnectionNotFound { from_id: EntityId, to_id: EntityId },
}

impl Display for PlacementError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntityNotFound(id) => write!(f, "entity not found: {id}"),
            Self::CellOccupied { position, occupant } => {
                write!(f, "cell {position} is occupied by {occupant}")
            }
            Self::CardNotPlaced(id) => write!(f, "card is not placed: {id}"),
            Self::AlreadyPlaced(id) => write!(f, "card is already placed: {id}"),
            Self::SelfConnection(id) => write!(f, "card cannot connect to itself: {id}"),
            Self::EndpointNotPlaced(id) => write!(f, "connection endpoint is not placed: {id}"),
            Self::TypeMismatch {
                requested,
                expected,
            } => write!(
                f,
                "connection type `{requested}` does not match endpoints, expected `{expected}`"
            ),
            Self::DuplicateConnection { from_id, to_id } => {
                write!(f, "cards are already connected: {from_id} <-> {to_id}")
            }
            Self::ConnectionNotFound { from_id, to_id } => {
                write!(f, "no connection between {from_id} and {to_id}")
            }
        }
    }
}

impl Error for PlacementError {}

/// Result of removing one placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedPlacement {
    pub card: PlacedCard,
    /// Connections deleted as part of the removal.
    pub connections: Vec<Connection>,
}

/// Items dropped while rebuilding a graph from persisted parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Entity ids dropped from the store because their id was already taken.
    pub duplicate_entities: Vec<EntityId>,
    pub dropped_cards: Vec<PlacedCard>,
    pub dropped_connections: Vec<Connection>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.duplicate_entities.is_empty()
            && self.dropped_cards.is_empty()
            && self.dropped_connections.is_empty()
    }
}

/// Placement records and connections for one map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementGraph {
    cards: BTreeMap<EntityId, PlacedCard>,
    occupancy: HashMap<HexPosition, EntityId>,
    connections: Vec<Connection>,
}

impl PlacementGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a graph from persisted records, dropping anything that
    /// violates graph invariants against `entities`.
    ///
    /// Earlier records win over later ones on cell or pair collisions.
    pub fn restore(
        cards: impl IntoIterator<Item = PlacedCard>,
        connections: impl IntoIterator<Item = Connection>,
        entities: &EntityStore,
    ) -> (Self, RepairReport) {
        let mut graph = Self::new();
        let mut report = RepairReport::default();

        for card in cards {
            if graph.place(entities, card.id, card.kind, card.position).is_err() {
                report.dropped_cards.push(card);
            }
        }
        for connection in connections {
            if graph
                .connect(connection.from_id, connection.to_id, connection.kind)
                .is_err()
            {
                report.dropped_connections.push(connection);
            }
        }

        (graph, report)
    }

    /// Places a card on an empty cell.
    ///
    /// # Errors
    /// - `EntityNotFound` when `entities` has no `kind` entity with `card_id`.
    /// - `AlreadyPlaced` when the card already has a cell.
    /// - `CellOccupied` when another card holds `position`.
    pub fn place(
        &mut self,
        entities: &EntityStore,
        card_id: EntityId,
        kind: CardKind,
        position: HexPosition,
    ) -> PlacementResult<PlacedCard> {
        if entities.kind_of(card_id) != Some(kind) {
            return Err(PlacementError::EntityNotFound(card_id));
        }
        if self.cards.contains_key(&card_id) {
            return Err(PlacementError::AlreadyPlaced(card_id));
        }
        if let Some(&occupant) = self.occupancy.get(&position) {
            return Err(PlacementError::CellOccupied { position, occupant });
        }

        let card = PlacedCard {
            id: card_id,
            kind,
            position,
        };
        self.cards.insert(card_id, card);
        self.occupancy.insert(position, card_id);
        self.debug_check();
        Ok(card)
    }

    /// Moves a placed card. Moving onto its own cell is a no-op success.
    ///
    /// Connections are untouched.
    pub fn move_card(
        &mut self,
        card_id: EntityId,
        new_position: HexPosition,
    ) -> PlacementResult<PlacedCard> {
        let current = *self
            .cards
            .get(&card_id)
            .ok_or(PlacementError::CardNotPlaced(card_id))?;
        if current.position == new_position {
            return Ok(current);
        }
        if let Some(&occupant) = self.occupancy.get(&new_position) {
            return Err(PlacementError::CellOccupied {
                position: new_position,
                occupant,
            });
        }

        self.occupancy.remove(&current.position);
        self.occupancy.insert(new_position, card_id);
        let moved = PlacedCard {
            position: new_position,
            ..current
        };
        self.cards.insert(card_id, moved);
        self.debug_check();
        Ok(moved)
    }

    /// Removes a placement and every connection touching it.
    pub fn remove(&mut self, card_id: EntityId) -> PlacementResult<RemovedPlacement> {
        let card = self
            .cards
            .remove(&card_id)
            .ok_or(PlacementError::CardNotPlaced(card_id))?;
        self.occupancy.remove(&card.position);

        let (removed, kept): (Vec<Connection>, Vec<Connection>) =
            std::mem::take(&mut self.connections)
                .into_iter()
                .partition(|connection| connection.touches(card_id));
        self.connections = kept;

        self.debug_check();
        Ok(RemovedPlacement {
            card,
            connections: removed,
        })
    }

    /// Links two placed cards.
    ///
    /// # Errors
    /// Checked in order: `SelfConnection`, `EndpointNotPlaced` (from, then to),
    /// `TypeMismatch`, `DuplicateConnection`.
    pub fn connect(
        &mut self,
        from_id: EntityId,
        to_id: EntityId,
        kind: ConnectionKind,
    ) -> PlacementResult<Connection> {
        if from_id == to_id {
            return Err(PlacementError::SelfConnection(from_id));
        }
        let from = self
            .cards
            .get(&from_id)
            .ok_or(PlacementError::EndpointNotPlaced(from_id))?;
        let to = self
            .cards
            .get(&to_id)
            .ok_or(PlacementError::EndpointNotPlaced(to_id))?;

        let expected = ConnectionKind::between(from.kind, to.kind);
        if kind != expected {
            return Err(PlacementError::TypeMismatch {
                requested: kind,
                expected,
            });
        }
        if self.connection_between(from_id, to_id).is_some() {
            return Err(PlacementError::DuplicateConnection { from_id, to_id });
        }

        let connection = Connection {
            from_id,
            to_id,
            kind,
        };
        self.connections.push(connection);
        self.debug_check();
        Ok(connection)
    }

    /// Removes the connection between two cards, in either direction.
    pub fn disconnect(&mut self, from_id: EntityId, to_id: EntityId) -> PlacementResult<Connection> {
        let index = self
            .connections
            .iter()
            .position(|connection| connection.links(from_id, to_id))
            .ok_or(PlacementError::ConnectionNotFound { from_id, to_id })?;
        Ok(self.connections.remove(index))
    }

    /// Card currently holding `position`, if any.
    pub fn occupant_at(&self, position: HexPosition) -> Option<EntityId> {
        self.occupancy.get(&position).copied()
    }

    pub fn placement(&self, card_id: EntityId) -> Option<&PlacedCard> {
        self.cards.get(&card_id)
    }

    pub fn is_placed(&self, card_id: EntityId) -> bool {
        self.cards.contains_key(&card_id)
    }

    /// Placed cards ordered by id.
    pub fn placed_cards(&self) -> impl Iterator<Item = &PlacedCard> {
        self.cards.values()
    }

    /// Connections in creation order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connections_of(&self, card_id: EntityId) -> impl Iterator<Item = &Connection> {
        self.connections
            .iter()
            .filter(move |connection| connection.touches(card_id))
    }

    pub fn connection_between(&self, a: EntityId, b: EntityId) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|connection| connection.links(a, b))
    }

    /// Placed cards in the six cells around `card_id`, in neighbor order.
    pub fn adjacent_cards(&self, card_id: EntityId) -> PlacementResult<Vec<PlacedCard>> {
        let card = self
            .cards
            .get(&card_id)
            .ok_or(PlacementError::CardNotPlaced(card_id))?;
        Ok(HexGeometry::neighbors(card.position)
            .into_iter()
            .filter_map(|cell| self.occupant_at(cell))
            .filter_map(|id| self.cards.get(&id).copied())
            .collect())
    }

    /// Closest empty cell to `origin` within `max_radius` steps.
    ///
    /// Ties within a ring resolve to the smallest `(q, r)`.
    pub fn nearest_free_cell(&self, origin: HexPosition, max_radius: u32) -> Option<HexPosition> {
        (0..=max_radius).find_map(|radius| {
            HexGeometry::ring(origin, radius)
                .into_iter()
                .filter(|cell| !self.occupancy.contains_key(cell))
                .min()
        })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Verifies graph invariants, returning a description of the first breach.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.occupancy.len() != self.cards.len() {
            return Err(format!(
                "occupancy has {} cells for {} cards",
                self.occupancy.len(),
                self.cards.len()
            ));
        }
        for card in self.cards.values() {
            if self.occupancy.get(&card.position) != Some(&card.id) {
                return Err(format!("card {} not indexed at {}", card.id, card.position));
            }
        }
        for (index, connection) in self.connections.iter().enumerate() {
            if connection.from_id == connection.to_id {
                return Err(format!("self connection on {}", connection.from_id));
            }
            let (Some(from), Some(to)) = (
                self.cards.get(&connection.from_id),
                self.cards.get(&connection.to_id),
            ) else {
                return Err(format!(
                    "dangling connection {} <-> {}",
                    connection.from_id, connection.to_id
                ));
            };
            if !connection.kind.accepts(from.kind, to.kind) {
                return Err(format!(
                    "connection kind {} does not match {} <-> {}",
                    connection.kind, from.kind, to.kind
                ));
            }
            if self.connections[..index]
                .iter()
                .any(|earlier| earlier.links(connection.from_id, connection.to_id))
            {
                return Err(format!(
                    "duplicate connection {} <-> {}",
                    connection.from_id, connection.to_id
                ));
            }
        }
        Ok(())
    }

    fn debug_check(&self) {
        debug_assert_eq!(self.check_invariants(), Ok(()));
    }
}
