//! Drag gesture state machine.
//!
//! # Responsibility
//! - Translate pointer gestures into placement graph mutations.
//! - Throttle target notifications to cell-boundary crossings.
//! - Report every rejected drop together with the cell to revert to.
//!
//! # Invariants
//! - States: `Idle -> Dragging -> {Committed, Cancelled}`; a terminal state
//!   accepts a new `begin_drag` for the next gesture.
//! - The graph is mutated only by `end_drag`, at most once per gesture.
//! - `end_drag` and `cancel_drag` are mutually exclusive terminal transitions.

use crate::drag::payload::DragPayload;
use crate::geometry::hex::{HexGeometry, PixelPoint};
use crate::graph::placement_graph::{PlacementError, PlacementGraph};
use crate::model::entity::EntityId;
use crate::model::placement::{HexPosition, PlacedCard};
use crate::store::entity_store::EntityStore;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// What is being dragged and where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSource {
    pub payload: DragPayload,
    /// `true` for a card dragged from the palette (not yet placed).
    pub from_palette: bool,
}

/// Cell under the pointer, raised only when it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragTarget {
    pub cell: HexPosition,
    /// Another card already holding `cell`, if any.
    pub occupant: Option<EntityId>,
}

/// In-flight gesture data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveDrag {
    pub source: DragSource,
    /// Cell the card occupied before the drag; `None` for palette sources.
    pub origin: Option<HexPosition>,
    last_cell: Option<HexPosition>,
}

impl ActiveDrag {
    pub fn last_cell(&self) -> Option<HexPosition> {
        self.last_cell
    }
}

/// Why a gesture ended without a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelReason {
    /// Explicit abort, e.g. pointer left the drop surface.
    Aborted,
    /// The drop was refused by the placement graph.
    Rejected(PlacementError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(ActiveDrag),
    Committed(PlacedCard),
    Cancelled(CancelReason),
}

/// Drag gesture failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragError {
    /// `begin_drag` while another gesture is active.
    GestureInProgress,
    /// `update/end/cancel` without an active gesture.
    NotDragging,
    /// The drag source failed validation; nothing was started.
    InvalidSource(PlacementError),
    /// The drop was refused; the card reverts to `revert_to` (`None` = unplaced).
    Rejected {
        error: PlacementError,
        revert_to: Option<HexPosition>,
    },
}

impl Display for DragError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GestureInProgress => write!(f, "a drag gesture is already in progress"),
            Self::NotDragging => write!(f, "no drag gesture is in progress"),
            Self::InvalidSource(err) => write!(f, "invalid drag source: {err}"),
            Self::Rejected { error, .. } => write!(f, "drop rejected: {error}"),
        }
    }
}

impl Error for DragError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidSource(err) => Some(err),
            Self::Rejected { error, .. } => Some(error),
            Self::GestureInProgress | Self::NotDragging => None,
        }
    }
}

/// Single-gesture drag state machine.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Starts a gesture after validating the source. Does not touch the graph.
    ///
    /// # Errors
    /// - `GestureInProgress` when already dragging.
    /// - `InvalidSource(EntityNotFound)` when no entity of the payload kind exists.
    /// - `InvalidSource(AlreadyPlaced)` for a palette source that is on the map.
    /// - `InvalidSource(CardNotPlaced)` for a map source without a placement.
    pub fn begin_drag(
        &mut self,
        source: DragSource,
        graph: &PlacementGraph,
        entities: &EntityStore,
    ) -> Result<(), DragError> {
        if self.is_dragging() {
            error!("event=drag_begin module=drag status=error error_code=gesture_in_progress");
            return Err(DragError::GestureInProgress);
        }

        let card_id = source.payload.card_id();
        let kind = source.payload.kind();
        if entities.kind_of(card_id) != Some(kind) {
            return Err(DragError::InvalidSource(PlacementError::EntityNotFound(
                card_id,
            )));
        }

        let origin = match (source.from_palette, graph.placement(card_id)) {
            (true, None) => None,
            (true, Some(_)) => {
                return Err(DragError::InvalidSource(PlacementError::AlreadyPlaced(
                    card_id,
                )));
            }
            (false, Some(card)) => Some(card.position),
            (false, None) => {
                return Err(DragError::InvalidSource(PlacementError::CardNotPlaced(
                    card_id,
                )));
            }
        };

        debug!(
            "event=drag_begin module=drag status=ok card_id={} kind={} from_palette={}",
            card_id, kind, source.from_palette
        );
        self.state = DragState::Dragging(ActiveDrag {
            source,
            origin,
            last_cell: origin,
        });
        Ok(())
    }

    /// Tracks the pointer; returns a target only when the resolved cell changes.
    pub fn update_drag(
        &mut self,
        geometry: &HexGeometry,
        graph: &PlacementGraph,
        pointer: PixelPoint,
    ) -> Result<Option<DragTarget>, DragError> {
        let DragState::Dragging(active) = &mut self.state else {
            error!("event=drag_update module=drag status=error error_code=not_dragging");
            return Err(DragError::NotDragging);
        };

        let cell = resolve_cell(geometry, &active.source, pointer);
        if active.last_cell == Some(cell) {
            return Ok(None);
        }
        active.last_cell = Some(cell);

        let card_id = active.source.payload.card_id();
        let occupant = graph.occupant_at(cell).filter(|id| *id != card_id);
        debug!(
            "event=drag_target module=drag status=ok card_id={} q={} r={} occupied={}",
            card_id,
            cell.q,
            cell.r,
            occupant.is_some()
        );
        Ok(Some(DragTarget { cell, occupant }))
    }

    /// Drops the card at the pointer and commits it to the graph.
    ///
    /// Palette sources are placed; map sources are moved. Any refusal ends the
    /// gesture as `Cancelled` and is returned as `DragError::Rejected`.
    pub fn end_drag(
        &mut self,
        geometry: &HexGeometry,
        graph: &mut PlacementGraph,
        entities: &EntityStore,
        pointer: PixelPoint,
    ) -> Result<PlacedCard, DragError> {
        let DragState::Dragging(active) = self.state.clone() else {
            error!("event=drag_end module=drag status=error error_code=not_dragging");
            return Err(DragError::NotDragging);
        };

        let cell = resolve_cell(geometry, &active.source, pointer);
        let card_id = active.source.payload.card_id();
        let result = if active.source.from_palette {
            graph.place(entities, card_id, active.source.payload.kind(), cell)
        } else {
            graph.move_card(card_id, cell)
        };

        match result {
            Ok(card) => {
                info!(
                    "event=drag_end module=drag status=ok card_id={} q={} r={} from_palette={}",
                    card_id, cell.q, cell.r, active.source.from_palette
                );
                self.state = DragState::Committed(card);
                Ok(card)
            }
            Err(error) => {
                warn!(
                    "event=drag_end module=drag status=rejected card_id={} q={} r={} error={}",
                    card_id, cell.q, cell.r, error
                );
                self.state = DragState::Cancelled(CancelReason::Rejected(error.clone()));
                Err(DragError::Rejected {
                    error,
                    revert_to: active.origin,
                })
            }
        }
    }

    /// Card carried by the active gesture, if any.
    pub fn dragged_card(&self) -> Option<EntityId> {
        match &self.state {
            DragState::Dragging(active) => Some(active.source.payload.card_id()),
            _ => None,
        }
    }

    /// Aborts the gesture without touching the graph.
    ///
    /// Returns the cell the card reverts to (`None` for palette sources).
    pub fn cancel_drag(&mut self) -> Result<Option<HexPosition>, DragError> {
        let DragState::Dragging(active) = &self.state else {
            error!("event=drag_cancel module=drag status=error error_code=not_dragging");
            return Err(DragError::NotDragging);
        };
        let revert_to = active.origin;
        debug!(
            "event=drag_cancel module=drag status=ok card_id={}",
            active.source.payload.card_id()
        );
        self.state = DragState::Cancelled(CancelReason::Aborted);
        Ok(revert_to)
    }
}

fn resolve_cell(geometry: &HexGeometry, source: &DragSource, pointer: PixelPoint) -> HexPosition {
    let offset = source.payload.offset();
    geometry.pixel_to_cell(PixelPoint::new(pointer.x - offset.x, pointer.y - offset.y))
}
