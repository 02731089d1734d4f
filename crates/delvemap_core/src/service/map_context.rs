//! Map session orchestrator.
//!
//! # Responsibility
//! - Compose entity store, library, placement graph and drag controller into
//!   the single state container UI collaborators read and mutate.
//! - Run the content validator before entity bodies are committed.
//! - Keep cross-component operations atomic from the caller's view.
//!
//! # Invariants
//! - Deleting a placed entity removes its placement (and connections) before
//!   the entity body, so no placement ever points at a missing entity.
//! - Deleting an entity that is being dragged cancels that gesture first.
//! - Library copies always receive fresh ids before entering the store.
//! - Inner component errors are forwarded unchanged inside `MapError`.

use crate::config::{ConfigError, MapConfig};
use crate::drag::controller::{DragController, DragError, DragSource, DragState, DragTarget};
use crate::drag::payload::DragPayload;
use crate::geometry::hex::{HexGeometry, PixelPoint};
use crate::graph::placement_graph::{
    PlacementError, PlacementGraph, RemovedPlacement, RepairReport,
};
use crate::model::entity::{Delve, EntityId, Landmark, Monster};
use crate::model::placement::{CardKind, Connection, ConnectionKind, HexPosition, PlacedCard};
use crate::model::snapshot::{MapId, MapSnapshot, SNAPSHOT_FORMAT_VERSION};
use crate::model::validation::Validate;
use crate::store::entity_store::{EntityStore, StoreError};
use crate::store::library::Library;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type MapResult<T> = Result<T, MapError>;

/// Errors surfaced by map session operations.
#[derive(Debug)]
pub enum MapError {
    Config(ConfigError),
    /// Validator messages, in field order.
    Validation(Vec<String>),
    Store(StoreError),
    Placement(PlacementError),
    Drag(DragError),
}

impl Display for MapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Validation(errors) => write!(f, "validation failed: {}", errors.join("; ")),
            Self::Store(err) => write!(f, "{err}"),
            Self::Placement(err) => write!(f, "{err}"),
            Self::Drag(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Validation(_) => None,
            Self::Store(err) => Some(err),
            Self::Placement(err) => Some(err),
            Self::Drag(err) => Some(err),
        }
    }
}

impl From<ConfigError> for MapError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<StoreError> for MapError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<PlacementError> for MapError {
    fn from(value: PlacementError) -> Self {
        Self::Placement(value)
    }
}

impl From<DragError> for MapError {
    fn from(value: DragError) -> Self {
        Self::Drag(value)
    }
}

/// State container for one open map.
#[derive(Debug, Clone)]
pub struct MapContext {
    map_id: MapId,
    name: String,
    config: MapConfig,
    geometry: HexGeometry,
    entities: EntityStore,
    library: Library,
    graph: PlacementGraph,
    drag: DragController,
}

impl MapContext {
    /// Opens an empty map with a generated id.
    pub fn new(name: impl Into<String>, config: MapConfig) -> MapResult<Self> {
        Self::with_id(Uuid::new_v4(), name, config)
    }

    /// Opens an empty map with a caller-provided id.
    pub fn with_id(map_id: MapId, name: impl Into<String>, config: MapConfig) -> MapResult<Self> {
        config.validate()?;
        Ok(Self {
            map_id,
            name: name.into(),
            config,
            geometry: HexGeometry::new(&config.grid),
            entities: EntityStore::new(),
            library: Library::new(),
            graph: PlacementGraph::new(),
            drag: DragController::new(),
        })
    }

    /// Rebuilds a session from a persisted snapshot, repairing invariant
    /// violations instead of rejecting the whole map.
    pub fn from_snapshot(snapshot: MapSnapshot, config: MapConfig) -> MapResult<(Self, RepairReport)> {
        config.validate()?;
        let (entities, mut duplicate_entities) =
            EntityStore::from_parts(snapshot.landmarks, snapshot.delves);
        let (library, duplicate_templates) = snapshot.library.deduplicated();
        duplicate_entities.extend(duplicate_templates);

        let (graph, mut report) =
            PlacementGraph::restore(snapshot.placed_cards, snapshot.connections, &entities);
        report.duplicate_entities = duplicate_entities;

        if report.is_clean() {
            info!(
                "event=map_load module=map status=ok map_id={} cards={} connections={}",
                snapshot.map_id,
                graph.len(),
                graph.connections().len()
            );
        } else {
            warn!(
                "event=map_load module=map status=repaired map_id={} duplicate_entities={} dropped_cards={} dropped_connections={}",
                snapshot.map_id,
                report.duplicate_entities.len(),
                report.dropped_cards.len(),
                report.dropped_connections.len()
            );
        }

        let context = Self {
            map_id: snapshot.map_id,
            name: snapshot.name,
            config,
            geometry: HexGeometry::new(&config.grid),
            entities,
            library,
            graph,
            drag: DragController::new(),
        };
        Ok((context, report))
    }

    /// Captures the full persisted state of the session.
    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            map_id: self.map_id,
            name: self.name.clone(),
            landmarks: self.entities.landmarks().iter().cloned().collect(),
            delves: self.entities.delves().iter().cloned().collect(),
            placed_cards: self.graph.placed_cards().copied().collect(),
            connections: self.graph.connections().to_vec(),
            library: self.library.clone(),
        }
    }

    pub fn map_id(&self) -> MapId {
        self.map_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn geometry(&self) -> &HexGeometry {
        &self.geometry
    }

    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn graph(&self) -> &PlacementGraph {
        &self.graph
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn create_landmark(&mut self, landmark: Landmark) -> MapResult<EntityId> {
        ensure_valid(&landmark)?;
        let id = self.entities.insert_landmark(landmark)?;
        info!("event=entity_create module=map status=ok kind=landmark entity_id={id}");
        Ok(id)
    }

    pub fn update_landmark(&mut self, landmark: Landmark) -> MapResult<()> {
        ensure_valid(&landmark)?;
        self.entities.update_landmark(landmark)?;
        Ok(())
    }

    /// Deletes a landmark, removing its placement and connections first.
    pub fn delete_landmark(&mut self, id: EntityId) -> MapResult<Landmark> {
        if self.entities.landmark(id).is_none() {
            return Err(StoreError::NotFound(id).into());
        }
        self.detach_from_map(id);
        let landmark = self.entities.remove_landmark(id)?;
        info!("event=entity_delete module=map status=ok kind=landmark entity_id={id}");
        Ok(landmark)
    }

    pub fn create_delve(&mut self, delve: Delve) -> MapResult<EntityId> {
        ensure_valid(&delve)?;
        let id = self.entities.insert_delve(delve)?;
        info!("event=entity_create module=map status=ok kind=delve entity_id={id}");
        Ok(id)
    }

    pub fn update_delve(&mut self, delve: Delve) -> MapResult<()> {
        ensure_valid(&delve)?;
        self.entities.update_delve(delve)?;
        Ok(())
    }

    /// Deletes a delve (and its monsters), removing its placement first.
    pub fn delete_delve(&mut self, id: EntityId) -> MapResult<Delve> {
        if self.entities.delve(id).is_none() {
            return Err(StoreError::NotFound(id).into());
        }
        self.detach_from_map(id);
        let delve = self.entities.remove_delve(id)?;
        info!("event=entity_delete module=map status=ok kind=delve entity_id={id}");
        Ok(delve)
    }

    pub fn add_monster(&mut self, delve_id: EntityId, monster: Monster) -> MapResult<EntityId> {
        ensure_valid(&monster)?;
        Ok(self.entities.add_monster(delve_id, monster)?)
    }

    pub fn update_monster(&mut self, delve_id: EntityId, monster: Monster) -> MapResult<()> {
        ensure_valid(&monster)?;
        self.entities.update_monster(delve_id, monster)?;
        Ok(())
    }

    pub fn remove_monster(&mut self, delve_id: EntityId, monster_id: EntityId) -> MapResult<Monster> {
        Ok(self.entities.remove_monster(delve_id, monster_id)?)
    }

    /// Applies a clamped progress change to a delve; returns the new progress.
    pub fn mark_delve_progress(&mut self, delve_id: EntityId, delta: i64) -> MapResult<u32> {
        Ok(self.entities.mark_progress(delve_id, delta)?)
    }

    pub fn add_landmark_template(&mut self, template: Landmark) -> MapResult<EntityId> {
        ensure_valid(&template)?;
        Ok(self.library.add_landmark(template)?)
    }

    pub fn add_delve_template(&mut self, template: Delve) -> MapResult<EntityId> {
        ensure_valid(&template)?;
        Ok(self.library.add_delve(template)?)
    }

    pub fn add_monster_template(&mut self, template: Monster) -> MapResult<EntityId> {
        ensure_valid(&template)?;
        Ok(self.library.add_monster(template)?)
    }

    pub fn remove_landmark_template(&mut self, template_id: EntityId) -> MapResult<Landmark> {
        Ok(self.library.remove_landmark(template_id)?)
    }

    pub fn remove_delve_template(&mut self, template_id: EntityId) -> MapResult<Delve> {
        Ok(self.library.remove_delve(template_id)?)
    }

    pub fn remove_monster_template(&mut self, template_id: EntityId) -> MapResult<Monster> {
        Ok(self.library.remove_monster(template_id)?)
    }

    /// Clones a landmark template into the map with a fresh id. Not placed.
    pub fn copy_landmark_from_library(&mut self, template_id: EntityId) -> MapResult<Landmark> {
        let landmark = self.library.copy_landmark(template_id)?;
        ensure_valid(&landmark)?;
        self.entities.insert_landmark(landmark.clone())?;
        info!(
            "event=library_copy module=map status=ok kind=landmark template_id={} entity_id={}",
            template_id, landmark.id
        );
        Ok(landmark)
    }

    /// Clones a delve template (and its monsters) into the map. Not placed.
    pub fn copy_delve_from_library(&mut self, template_id: EntityId) -> MapResult<Delve> {
        let delve = self.library.copy_delve(template_id)?;
        ensure_valid(&delve)?;
        self.entities.insert_delve(delve.clone())?;
        info!(
            "event=library_copy module=map status=ok kind=delve template_id={} entity_id={}",
            template_id, delve.id
        );
        Ok(delve)
    }

    /// Clones a monster template into an existing delve.
    pub fn copy_monster_from_library(
        &mut self,
        template_id: EntityId,
        delve_id: EntityId,
    ) -> MapResult<Monster> {
        let monster = self.library.copy_monster(template_id)?;
        ensure_valid(&monster)?;
        self.entities.add_monster(delve_id, monster.clone())?;
        Ok(monster)
    }

    /// Saves a live landmark as a new library template; returns the template id.
    pub fn save_landmark_to_library(&mut self, entity_id: EntityId) -> MapResult<EntityId> {
        let landmark = self
            .entities
            .landmark(entity_id)
            .ok_or(StoreError::NotFound(entity_id))?;
        Ok(self.library.save_landmark(landmark)?)
    }

    /// Saves a live delve (with monsters) as a new library template.
    pub fn save_delve_to_library(&mut self, entity_id: EntityId) -> MapResult<EntityId> {
        let delve = self
            .entities
            .delve(entity_id)
            .ok_or(StoreError::NotFound(entity_id))?;
        Ok(self.library.save_delve(delve)?)
    }

    /// Places an existing entity on a specific cell.
    pub fn place_card(&mut self, card_id: EntityId, position: HexPosition) -> MapResult<PlacedCard> {
        let kind = self.kind_of(card_id)?;
        let result = self.graph.place(&self.entities, card_id, kind, position);
        log_placement("card_place", card_id, position, &result);
        Ok(result?)
    }

    /// Places an entity on the free cell closest to `position`.
    ///
    /// Fails with `CellOccupied` when every cell within `max_radius` is taken.
    pub fn place_card_near(
        &mut self,
        card_id: EntityId,
        position: HexPosition,
        max_radius: u32,
    ) -> MapResult<PlacedCard> {
        let kind = self.kind_of(card_id)?;
        if self.graph.is_placed(card_id) {
            return Err(PlacementError::AlreadyPlaced(card_id).into());
        }
        let Some(target) = self.graph.nearest_free_cell(position, max_radius) else {
            let occupant = self.graph.occupant_at(position).unwrap_or(card_id);
            return Err(PlacementError::CellOccupied { position, occupant }.into());
        };
        let result = self.graph.place(&self.entities, card_id, kind, target);
        log_placement("card_place", card_id, target, &result);
        Ok(result?)
    }

    pub fn move_card(&mut self, card_id: EntityId, position: HexPosition) -> MapResult<PlacedCard> {
        let result = self.graph.move_card(card_id, position);
        log_placement("card_move", card_id, position, &result);
        Ok(result?)
    }

    /// Takes a card off the map; the entity stays in the store.
    pub fn remove_from_map(&mut self, card_id: EntityId) -> MapResult<RemovedPlacement> {
        let removed = self.graph.remove(card_id)?;
        info!(
            "event=card_remove module=map status=ok card_id={} cascaded_connections={}",
            card_id,
            removed.connections.len()
        );
        Ok(removed)
    }

    pub fn connect(
        &mut self,
        from_id: EntityId,
        to_id: EntityId,
        kind: ConnectionKind,
    ) -> MapResult<Connection> {
        match self.graph.connect(from_id, to_id, kind) {
            Ok(connection) => {
                info!(
                    "event=card_connect module=map status=ok from_id={from_id} to_id={to_id} kind={kind}"
                );
                Ok(connection)
            }
            Err(err) => {
                warn!(
                    "event=card_connect module=map status=rejected from_id={from_id} to_id={to_id} kind={kind} error={err}"
                );
                Err(err.into())
            }
        }
    }

    pub fn disconnect(&mut self, from_id: EntityId, to_id: EntityId) -> MapResult<Connection> {
        Ok(self.graph.disconnect(from_id, to_id)?)
    }

    pub fn occupant_at(&self, position: HexPosition) -> Option<EntityId> {
        self.graph.occupant_at(position)
    }

    pub fn cell_at_pixel(&self, point: PixelPoint) -> HexPosition {
        self.geometry.pixel_to_cell(point)
    }

    pub fn cell_center(&self, position: HexPosition) -> PixelPoint {
        self.geometry.cell_center(position)
    }

    pub fn adjacent_cards(&self, card_id: EntityId) -> MapResult<Vec<PlacedCard>> {
        Ok(self.graph.adjacent_cards(card_id)?)
    }

    pub fn begin_drag(&mut self, payload: DragPayload, from_palette: bool) -> MapResult<()> {
        let source = DragSource {
            payload,
            from_palette,
        };
        Ok(self.drag.begin_drag(source, &self.graph, &self.entities)?)
    }

    pub fn update_drag(&mut self, pointer: PixelPoint) -> MapResult<Option<DragTarget>> {
        Ok(self.drag.update_drag(&self.geometry, &self.graph, pointer)?)
    }

    pub fn end_drag(&mut self, pointer: PixelPoint) -> MapResult<PlacedCard> {
        Ok(self
            .drag
            .end_drag(&self.geometry, &mut self.graph, &self.entities, pointer)?)
    }

    pub fn cancel_drag(&mut self) -> MapResult<Option<HexPosition>> {
        Ok(self.drag.cancel_drag()?)
    }

    fn kind_of(&self, card_id: EntityId) -> MapResult<CardKind> {
        self.entities
            .kind_of(card_id)
            .ok_or_else(|| PlacementError::EntityNotFound(card_id).into())
    }

    /// Drops the entity's in-flight drag, placement and connections.
    fn detach_from_map(&mut self, id: EntityId) {
        if self.drag.dragged_card() == Some(id) && self.drag.cancel_drag().is_ok() {
            info!("event=drag_cancel module=map status=ok card_id={id} reason=entity_delete");
        }
        if let Ok(removed) = self.graph.remove(id) {
            info!(
                "event=card_remove module=map status=ok card_id={} cascaded_connections={} reason=entity_delete",
                id,
                removed.connections.len()
            );
        }
    }
}

fn ensure_valid(card: &impl Validate) -> MapResult<()> {
    let errors = card.validation_errors();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(MapError::Validation(errors))
    }
}

fn log_placement(
    event: &str,
    card_id: EntityId,
    position: HexPosition,
    result: &Result<PlacedCard, PlacementError>,
) {
    match result {
        Ok(_) => info!(
            "event={} module=map status=ok card_id={} q={} r={}",
            event, card_id, position.q, position.r
        ),
        Err(err) => warn!(
            "event={} module=map status=rejected card_id={} q={} r={} error={}",
            event, card_id, position.q, position.r, err
        ),
    }
}
