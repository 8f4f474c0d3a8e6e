//! Live drawing/editing state.
//!
//! A [`Session`] owns the entities being drawn and, separately, the visual
//! primitive each one is rendered with. Entities never hold their primitive;
//! the session maps entity id to [`Primitive`] and runs the
//! [`CoordinateNormalizer`] over that map when producing a payload.

use std::collections::HashMap;

use crate::entity::{
    Amenity, Building, Category, DoorFlag, Fixture, Level, Opening, ProjectData, Restriction,
    Unit, Venue,
};
use crate::geometry::{
    default_footprint, CirclePrimitive, CoordinateNormalizer, Geometry, GeometryKind,
    Coordinates, LinePrimitive, Position, Primitive, RectPrimitive,
};
use crate::project::{Project, ProjectError};

/// Default unit rectangle edge, in screen units.
pub const UNIT_SIZE: f64 = 100.0;
/// Default amenity circle radius, in screen units.
pub const AMENITY_RADIUS: f64 = 15.0;
/// Default fixture segment length, in screen units.
pub const FIXTURE_LENGTH: f64 = 50.0;
/// Default opening segment length, in screen units.
pub const OPENING_LENGTH: f64 = 30.0;

/// Where reloaded entities without usable coordinates are placed.
const RELOAD_ANCHOR: f64 = 100.0;

/// Active drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Select,
    Unit,
    Amenity,
    Fixture,
    Opening,
}

/// Kinds of entity that live on a level and can be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Unit,
    Amenity,
    Fixture,
    Opening,
}

/// Entity counts, as shown in the editor sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionCounts {
    pub levels: usize,
    pub units: usize,
    pub amenities: usize,
    pub fixtures: usize,
    pub openings: usize,
}

/// Errors raised by session operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Add and select a level first")]
    NoActiveLevel,

    #[error("The select tool does not place anything")]
    NoDrawingTool,

    #[error("Unknown level: {id}")]
    UnknownLevel { id: String },

    #[error("Unknown entity: {id}")]
    UnknownEntity { id: String },

    #[error("No entity selected")]
    NothingSelected,
}

/// Editing state for one project.
#[derive(Debug, Clone, Default)]
pub struct Session {
    normalizer: CoordinateNormalizer,

    /// Identifier of the stored project, once saved.
    pub project_id: Option<String>,
    pub project_name: String,
    pub building_name: String,
    /// User-typed venue location. Not scaled.
    pub venue_coordinates: Position,
    pub floorplan_image: Option<String>,

    levels: Vec<Level>,
    units: Vec<Unit>,
    amenities: Vec<Amenity>,
    fixtures: Vec<Fixture>,
    openings: Vec<Opening>,
    primitives: HashMap<String, Primitive>,

    current_level: Option<String>,
    tool: Tool,
    selected: Option<(EntityKind, String)>,
}

impl Session {
    pub fn new(normalizer: CoordinateNormalizer) -> Self {
        Self {
            normalizer,
            ..Self::default()
        }
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn amenities(&self) -> &[Amenity] {
        &self.amenities
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn openings(&self) -> &[Opening] {
        &self.openings
    }

    pub fn current_level(&self) -> Option<&str> {
        self.current_level.as_deref()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// The primitive rendering an entity.
    pub fn primitive(&self, entity_id: &str) -> Option<&Primitive> {
        self.primitives.get(entity_id)
    }

    pub fn selected(&self) -> Option<(EntityKind, &str)> {
        self.selected.as_ref().map(|(kind, id)| (*kind, id.as_str()))
    }

    pub fn counts(&self) -> SessionCounts {
        SessionCounts {
            levels: self.levels.len(),
            units: self.units.len(),
            amenities: self.amenities.len(),
            fixtures: self.fixtures.len(),
            openings: self.openings.len(),
        }
    }

    /// Add a level and make it current. Name defaults to `Level {n}` and
    /// ordinal to the number of existing levels.
    pub fn add_level(&mut self, name: Option<&str>, ordinal: Option<i32>) -> String {
        let n = self.levels.len();
        let ordinal = ordinal.unwrap_or(n as i32);
        let name = name
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Level {n}"));
        let id = new_id();

        self.levels.push(Level {
            id: Some(id.clone()),
            name: Some(name),
            ordinal: Some(ordinal),
            short_name: Some(ordinal.to_string()),
            ..Level::default()
        });
        self.current_level = Some(id.clone());
        id
    }

    pub fn select_level(&mut self, level_id: &str) -> Result<(), SessionError> {
        if !self.has_level(level_id) {
            return Err(SessionError::UnknownLevel {
                id: level_id.to_string(),
            });
        }
        self.current_level = Some(level_id.to_string());
        Ok(())
    }

    /// Remove a level together with everything placed on it. Returns the
    /// number of dependent entities removed.
    pub fn remove_level(&mut self, level_id: &str) -> Result<usize, SessionError> {
        if !self.has_level(level_id) {
            return Err(SessionError::UnknownLevel {
                id: level_id.to_string(),
            });
        }
        self.levels.retain(|l| l.id.as_deref() != Some(level_id));

        let mut removed = Vec::new();
        let on_level = |entity_level: &Option<String>| entity_level.as_deref() == Some(level_id);
        drain_into(&mut self.units, &mut removed, |u| on_level(&u.level_id), |u| u.id.clone());
        drain_into(&mut self.amenities, &mut removed, |a| on_level(&a.level_id), |a| a.id.clone());
        drain_into(&mut self.fixtures, &mut removed, |f| on_level(&f.level_id), |f| f.id.clone());
        drain_into(&mut self.openings, &mut removed, |o| on_level(&o.level_id), |o| o.id.clone());

        for id in &removed {
            self.primitives.remove(id);
        }
        if matches!(&self.selected, Some((_, id)) if removed.contains(id)) {
            self.selected = None;
        }
        if self.current_level.as_deref() == Some(level_id) {
            self.current_level = None;
        }
        Ok(removed.len())
    }

    /// Place an entity for the active tool at a screen point on the current
    /// level. Returns the new entity's id.
    pub fn place(&mut self, x: f64, y: f64) -> Result<(EntityKind, String), SessionError> {
        if self.tool == Tool::Select {
            return Err(SessionError::NoDrawingTool);
        }
        let level_id = self
            .current_level
            .clone()
            .ok_or(SessionError::NoActiveLevel)?;
        let id = new_id();

        let kind = match self.tool {
            Tool::Unit => {
                self.units.push(Unit {
                    id: Some(id.clone()),
                    name: Some(format!("Unit {}", self.units.len() + 1)),
                    category: Some(Category::Room),
                    restriction: Some(Restriction::Restricted),
                    level_id: Some(level_id),
                    ..Unit::default()
                });
                self.primitives.insert(
                    id.clone(),
                    Primitive::Rect(RectPrimitive::new(x, y, UNIT_SIZE, UNIT_SIZE)),
                );
                EntityKind::Unit
            }
            Tool::Amenity => {
                self.amenities.push(Amenity {
                    id: Some(id.clone()),
                    name: Some(format!("Amenity {}", self.amenities.len() + 1)),
                    category: Some(Category::Seating),
                    level_id: Some(level_id),
                    ..Amenity::default()
                });
                self.primitives.insert(
                    id.clone(),
                    Primitive::Circle(CirclePrimitive {
                        left: x,
                        top: y,
                        radius: AMENITY_RADIUS,
                    }),
                );
                EntityKind::Amenity
            }
            Tool::Fixture => {
                self.fixtures.push(Fixture {
                    id: Some(id.clone()),
                    category: Some(Category::Wall),
                    level_id: Some(level_id),
                    ..Fixture::default()
                });
                self.primitives
                    .insert(id.clone(), horizontal_line(x, y, FIXTURE_LENGTH));
                EntityKind::Fixture
            }
            Tool::Opening => {
                self.openings.push(Opening {
                    id: Some(id.clone()),
                    category: Some(Category::Door),
                    level_id: Some(level_id),
                    ..Opening::default()
                });
                self.primitives
                    .insert(id.clone(), horizontal_line(x, y, OPENING_LENGTH));
                EntityKind::Opening
            }
            Tool::Select => return Err(SessionError::NoDrawingTool),
        };

        Ok((kind, id))
    }

    /// Replace the primitive for an entity, e.g. after the user drags or
    /// resizes it.
    pub fn update_primitive(
        &mut self,
        entity_id: &str,
        primitive: Primitive,
    ) -> Result<(), SessionError> {
        match self.primitives.get_mut(entity_id) {
            Some(slot) => {
                *slot = primitive;
                Ok(())
            }
            None => Err(SessionError::UnknownEntity {
                id: entity_id.to_string(),
            }),
        }
    }

    pub fn select(&mut self, entity_id: &str) -> Result<EntityKind, SessionError> {
        let kind = self
            .kind_of(entity_id)
            .ok_or_else(|| SessionError::UnknownEntity {
                id: entity_id.to_string(),
            })?;
        self.selected = Some((kind, entity_id.to_string()));
        Ok(kind)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Edit the selected entity's name and/or category. Fixtures and
    /// openings carry no name; a name given for them is ignored.
    pub fn update_selected(
        &mut self,
        name: Option<&str>,
        category: Option<Category>,
    ) -> Result<(), SessionError> {
        let (kind, id) = self.selected.clone().ok_or(SessionError::NothingSelected)?;
        let missing = || SessionError::UnknownEntity { id: id.clone() };

        match kind {
            EntityKind::Unit => {
                let unit = find_mut(&mut self.units, &id, |u| &u.id).ok_or_else(missing)?;
                if let Some(name) = name {
                    unit.name = Some(name.to_string());
                }
                if let Some(category) = category {
                    unit.category = Some(category);
                }
            }
            EntityKind::Amenity => {
                let amenity = find_mut(&mut self.amenities, &id, |a| &a.id).ok_or_else(missing)?;
                if let Some(name) = name {
                    amenity.name = Some(name.to_string());
                }
                if let Some(category) = category {
                    amenity.category = Some(category);
                }
            }
            EntityKind::Fixture => {
                let fixture = find_mut(&mut self.fixtures, &id, |f| &f.id).ok_or_else(missing)?;
                if let Some(category) = category {
                    fixture.category = Some(category);
                }
            }
            EntityKind::Opening => {
                let opening = find_mut(&mut self.openings, &id, |o| &o.id).ok_or_else(missing)?;
                if let Some(category) = category {
                    opening.category = Some(category);
                }
            }
        }
        Ok(())
    }

    /// Delete the selected entity and its primitive.
    pub fn delete_selected(&mut self) -> Result<String, SessionError> {
        let (_, id) = self.selected.take().ok_or(SessionError::NothingSelected)?;
        let target = Some(id.as_str());
        self.units.retain(|u| u.id.as_deref() != target);
        self.amenities.retain(|a| a.id.as_deref() != target);
        self.fixtures.retain(|f| f.id.as_deref() != target);
        self.openings.retain(|o| o.id.as_deref() != target);
        self.primitives.remove(&id);
        Ok(id)
    }

    /// Build the payload for saving or exporting. Every drawn entity's
    /// coordinates come from its primitive through the normalizer.
    pub fn to_project_data(&self) -> ProjectData {
        let n = &self.normalizer;
        let prim = |id: &Option<String>| id.as_deref().and_then(|id| self.primitives.get(id));

        ProjectData {
            project_name: Some(self.project_name.clone()),
            venue: Some(Venue {
                name: Some(self.project_name.clone()),
                coordinates: Some(self.venue_coordinates),
                ..Venue::default()
            }),
            building: Some(Building {
                name: Some(self.building_name.clone()),
                coordinates: Some(default_footprint()),
                ..Building::default()
            }),
            levels: self
                .levels
                .iter()
                .map(|l| Level {
                    coordinates: Some(default_footprint()),
                    ..l.clone()
                })
                .collect(),
            units: self
                .units
                .iter()
                .map(|u| {
                    let rect = prim(&u.id).and_then(Primitive::as_rect);
                    Unit {
                        coordinates: Some(n.rect_polygon(rect)),
                        display_point: Some(Geometry::point(n.rect_display_point(rect))),
                        ..u.clone()
                    }
                })
                .collect(),
            amenities: self
                .amenities
                .iter()
                .map(|a| Amenity {
                    coordinates: Some(n.circle_point(prim(&a.id).and_then(Primitive::as_circle))),
                    ..a.clone()
                })
                .collect(),
            fixtures: self
                .fixtures
                .iter()
                .map(|f| Fixture {
                    geometry_type: Some(GeometryKind::LineString),
                    coordinates: Some(Coordinates::Line(
                        n.line(prim(&f.id).and_then(Primitive::as_line)),
                    )),
                    ..f.clone()
                })
                .collect(),
            openings: self
                .openings
                .iter()
                .map(|o| Opening {
                    door: o.door.or(Some(DoorFlag::No)),
                    coordinates: Some(n.line(prim(&o.id).and_then(Primitive::as_line))),
                    ..o.clone()
                })
                .collect(),
            anchors: Vec::new(),
            floorplan_image: self.floorplan_image.clone(),
        }
    }

    /// Rebuild a session from a stored project. Primitives are reconstructed
    /// from stored coordinates; entities without usable coordinates get a
    /// default-sized primitive at a fixed anchor. Entities without an id are
    /// given one. The first level becomes current.
    pub fn from_project(
        project: &Project,
        normalizer: CoordinateNormalizer,
    ) -> Result<Self, ProjectError> {
        let data = project.project_data()?;
        let mut session = Self::new(normalizer);

        session.project_id = Some(project.id.clone());
        session.project_name = project.name.clone();
        session.building_name = data
            .building
            .as_ref()
            .and_then(|b| b.name.clone())
            .unwrap_or_default();
        session.venue_coordinates = data
            .venue
            .as_ref()
            .and_then(|v| v.coordinates)
            .unwrap_or([0.0, 0.0]);
        session.floorplan_image = data.floorplan_image.clone();

        session.levels = data
            .levels
            .into_iter()
            .map(|mut l| {
                l.id.get_or_insert_with(new_id);
                l
            })
            .collect();
        session.current_level = session.levels.first().and_then(|l| l.id.clone());

        for mut unit in data.units {
            let id = unit.id.get_or_insert_with(new_id).clone();
            let rect = unit
                .coordinates
                .take()
                .and_then(|poly| normalizer.rect_from_polygon(&poly))
                .unwrap_or_else(|| {
                    RectPrimitive::new(RELOAD_ANCHOR, RELOAD_ANCHOR, UNIT_SIZE, UNIT_SIZE)
                });
            unit.display_point = None;
            session.primitives.insert(id, Primitive::Rect(rect));
            session.units.push(unit);
        }

        for mut amenity in data.amenities {
            let id = amenity.id.get_or_insert_with(new_id).clone();
            let circle = match amenity.coordinates.take() {
                Some(point) => normalizer.circle_from_point(point, AMENITY_RADIUS),
                None => CirclePrimitive {
                    left: RELOAD_ANCHOR * 2.0,
                    top: RELOAD_ANCHOR * 2.0,
                    radius: AMENITY_RADIUS,
                },
            };
            session.primitives.insert(id, Primitive::Circle(circle));
            session.amenities.push(amenity);
        }

        for mut fixture in data.fixtures {
            let id = fixture.id.get_or_insert_with(new_id).clone();
            let line = match fixture.coordinates.take() {
                Some(Coordinates::Line(coords)) => normalizer.line_from_coords(&coords),
                _ => None,
            };
            fixture.geometry_type = None;
            session.primitives.insert(
                id,
                line.map(Primitive::Line).unwrap_or_else(|| {
                    horizontal_line(RELOAD_ANCHOR, RELOAD_ANCHOR, FIXTURE_LENGTH)
                }),
            );
            session.fixtures.push(fixture);
        }

        for mut opening in data.openings {
            let id = opening.id.get_or_insert_with(new_id).clone();
            let line = opening
                .coordinates
                .take()
                .and_then(|coords| normalizer.line_from_coords(&coords));
            session.primitives.insert(
                id,
                line.map(Primitive::Line).unwrap_or_else(|| {
                    horizontal_line(RELOAD_ANCHOR, RELOAD_ANCHOR, OPENING_LENGTH)
                }),
            );
            session.openings.push(opening);
        }

        Ok(session)
    }

    fn has_level(&self, level_id: &str) -> bool {
        self.levels.iter().any(|l| l.id.as_deref() == Some(level_id))
    }

    fn kind_of(&self, entity_id: &str) -> Option<EntityKind> {
        let target = Some(entity_id);
        if self.units.iter().any(|u| u.id.as_deref() == target) {
            Some(EntityKind::Unit)
        } else if self.amenities.iter().any(|a| a.id.as_deref() == target) {
            Some(EntityKind::Amenity)
        } else if self.fixtures.iter().any(|f| f.id.as_deref() == target) {
            Some(EntityKind::Fixture)
        } else if self.openings.iter().any(|o| o.id.as_deref() == target) {
            Some(EntityKind::Opening)
        } else {
            None
        }
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn horizontal_line(x: f64, y: f64, length: f64) -> Primitive {
    Primitive::Line(LinePrimitive {
        x1: x,
        y1: y,
        x2: x + length,
        y2: y,
    })
}

fn find_mut<'a, T>(
    items: &'a mut [T],
    id: &str,
    id_of: impl Fn(&T) -> &Option<String>,
) -> Option<&'a mut T> {
    items.iter_mut().find(|item| id_of(item).as_deref() == Some(id))
}

/// Move matching items out of `items`, recording their ids.
fn drain_into<T>(
    items: &mut Vec<T>,
    removed_ids: &mut Vec<String>,
    matches: impl Fn(&T) -> bool,
    id_of: impl Fn(&T) -> Option<String>,
) {
    items.retain(|item| {
        if matches(item) {
            removed_ids.extend(id_of(item));
            false
        } else {
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_level() -> (Session, String) {
        let mut session = Session::new(CoordinateNormalizer::default());
        let level = session.add_level(Some("Ground"), Some(0));
        (session, level)
    }

    fn place(session: &mut Session, tool: Tool, x: f64, y: f64) -> String {
        session.set_tool(tool);
        session.place(x, y).unwrap().1
    }

    #[test]
    fn test_add_level_defaults() {
        let mut session = Session::default();
        session.add_level(None, None);
        session.add_level(Some("  "), None);
        let levels = session.levels();
        assert_eq!(levels[0].name.as_deref(), Some("Level 0"));
        assert_eq!(levels[1].name.as_deref(), Some("Level 1"));
        assert_eq!(levels[1].ordinal, Some(1));
        assert_eq!(levels[1].short_name.as_deref(), Some("1"));
        assert_eq!(session.current_level(), levels[1].id.as_deref());
    }

    #[test]
    fn test_place_requires_level_and_tool() {
        let mut session = Session::default();
        assert_eq!(session.place(0.0, 0.0), Err(SessionError::NoDrawingTool));
        session.set_tool(Tool::Unit);
        assert_eq!(session.place(0.0, 0.0), Err(SessionError::NoActiveLevel));
    }

    #[test]
    fn test_place_each_tool() {
        let (mut session, level) = session_with_level();
        let unit = place(&mut session, Tool::Unit, 10.0, 20.0);
        place(&mut session, Tool::Amenity, 30.0, 40.0);
        let fixture = place(&mut session, Tool::Fixture, 5.0, 5.0);
        let opening = place(&mut session, Tool::Opening, 7.0, 9.0);

        assert_eq!(
            session.counts(),
            SessionCounts {
                levels: 1,
                units: 1,
                amenities: 1,
                fixtures: 1,
                openings: 1,
            }
        );
        assert_eq!(session.units()[0].name.as_deref(), Some("Unit 1"));
        assert_eq!(session.units()[0].category, Some(Category::Room));
        assert_eq!(session.units()[0].level_id.as_deref(), Some(level.as_str()));
        assert_eq!(session.amenities()[0].category, Some(Category::Seating));
        assert_eq!(
            session.primitive(&unit),
            Some(&Primitive::Rect(RectPrimitive::new(10.0, 20.0, 100.0, 100.0)))
        );
        assert_eq!(
            session.primitive(&fixture).and_then(Primitive::as_line).map(|l| l.x2),
            Some(55.0)
        );
        assert_eq!(
            session.primitive(&opening).and_then(Primitive::as_line).map(|l| l.x2),
            Some(37.0)
        );
    }

    #[test]
    fn test_remove_level_cascades_and_clears_state() {
        let (mut session, ground) = session_with_level();
        let unit = place(&mut session, Tool::Unit, 0.0, 0.0);
        place(&mut session, Tool::Amenity, 0.0, 0.0);
        place(&mut session, Tool::Fixture, 0.0, 0.0);
        place(&mut session, Tool::Opening, 0.0, 0.0);

        let upper = session.add_level(Some("Upper"), Some(1));
        let kept = place(&mut session, Tool::Unit, 0.0, 0.0);

        session.select(&unit).unwrap();
        session.select_level(&ground).unwrap();
        assert_eq!(session.remove_level(&ground), Ok(4));

        assert_eq!(session.counts().levels, 1);
        assert_eq!(session.units().len(), 1);
        assert!(session.amenities().is_empty());
        assert!(session.fixtures().is_empty());
        assert!(session.openings().is_empty());
        assert!(session.primitive(&unit).is_none());
        assert!(session.primitive(&kept).is_some());
        assert!(session.selected().is_none());
        assert!(session.current_level().is_none());
        assert!(session
            .units()
            .iter()
            .all(|u| u.level_id.as_deref() == Some(upper.as_str())));

        assert_eq!(
            session.remove_level(&ground),
            Err(SessionError::UnknownLevel { id: ground })
        );
    }

    #[test]
    fn test_select_update_delete() {
        let (mut session, _) = session_with_level();
        let unit = place(&mut session, Tool::Unit, 0.0, 0.0);
        let fixture = place(&mut session, Tool::Fixture, 0.0, 0.0);

        assert_eq!(session.update_selected(Some("x"), None), Err(SessionError::NothingSelected));

        assert_eq!(session.select(&unit), Ok(EntityKind::Unit));
        session
            .update_selected(Some("Lobby"), Some(Category::Conference))
            .unwrap();
        assert_eq!(session.units()[0].name.as_deref(), Some("Lobby"));
        assert_eq!(session.units()[0].category, Some(Category::Conference));

        session.select(&fixture).unwrap();
        session
            .update_selected(Some("ignored"), Some(Category::Other("railing".into())))
            .unwrap();
        assert_eq!(
            session.fixtures()[0].category,
            Some(Category::Other("railing".into()))
        );

        assert_eq!(session.delete_selected(), Ok(fixture.clone()));
        assert!(session.fixtures().is_empty());
        assert!(session.primitive(&fixture).is_none());
        assert_eq!(session.delete_selected(), Err(SessionError::NothingSelected));
        assert!(matches!(
            session.select("nope"),
            Err(SessionError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn test_to_project_data_normalizes_primitives() {
        let (mut session, _) = session_with_level();
        session.project_name = "HQ".to_string();
        session.building_name = "B1".to_string();
        session.venue_coordinates = [12.0, 34.0];
        let unit = place(&mut session, Tool::Unit, 100.0, 100.0);
        place(&mut session, Tool::Amenity, 300.0, 400.0);
        place(&mut session, Tool::Opening, 0.0, 0.0);

        session
            .update_primitive(&unit, Primitive::Rect(RectPrimitive::new(100.0, 100.0, 200.0, 100.0)))
            .unwrap();

        let data = session.to_project_data();
        assert_eq!(data.venue.as_ref().unwrap().coordinates, Some([12.0, 34.0]));
        assert_eq!(data.building.as_ref().unwrap().name.as_deref(), Some("B1"));
        assert_eq!(data.levels[0].coordinates, Some(default_footprint()));

        let ring = &data.units[0].coordinates.as_ref().unwrap()[0];
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        assert!((ring[2][0] - 0.003).abs() < 1e-12);
        let display = data.units[0].display_point.as_ref().unwrap().as_point().unwrap();
        assert!((display[0] - 0.002).abs() < 1e-12);
        assert!((display[1] - 0.0015).abs() < 1e-12);

        assert_eq!(data.amenities[0].coordinates, Some([0.003, 0.004]));
        assert_eq!(data.openings[0].door, Some(DoorFlag::No));
        assert_eq!(data.openings[0].coordinates.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_reload_rebuilds_primitives() {
        let (mut session, _) = session_with_level();
        session.project_name = "HQ".to_string();
        let unit = place(&mut session, Tool::Unit, 250.0, 120.0);
        let amenity = place(&mut session, Tool::Amenity, 40.0, 60.0);
        let fixture = place(&mut session, Tool::Fixture, 10.0, 10.0);

        let project = Project {
            id: "p-1".to_string(),
            name: "HQ".to_string(),
            created_at: "2024-05-01T10:00:00.000Z".to_string(),
            updated_at: "2024-05-01T10:00:00.000Z".to_string(),
            data: serde_json::to_value(session.to_project_data()).unwrap(),
        };

        let reloaded = Session::from_project(&project, CoordinateNormalizer::default()).unwrap();
        assert_eq!(reloaded.project_id.as_deref(), Some("p-1"));
        assert_eq!(reloaded.counts(), session.counts());
        assert_eq!(reloaded.current_level(), session.levels()[0].id.as_deref());

        let rect = reloaded.primitive(&unit).and_then(Primitive::as_rect).unwrap();
        assert!((rect.left - 250.0).abs() < 1e-6);
        assert!((rect.width - 100.0).abs() < 1e-6);
        let circle = reloaded.primitive(&amenity).and_then(Primitive::as_circle).unwrap();
        assert!((circle.top - 60.0).abs() < 1e-6);
        let line = reloaded.primitive(&fixture).and_then(Primitive::as_line).unwrap();
        assert!((line.x2 - 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_reload_without_coordinates_uses_anchor() {
        let project = Project {
            id: "p-2".to_string(),
            name: "Sketch".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
            data: serde_json::json!({"units": [{"name": "Loose"}]}),
        };
        let session = Session::from_project(&project, CoordinateNormalizer::default()).unwrap();
        let id = session.units()[0].id.clone().unwrap();
        assert_eq!(
            session.primitive(&id),
            Some(&Primitive::Rect(RectPrimitive::new(100.0, 100.0, 100.0, 100.0)))
        );
        assert!(session.current_level().is_none());
    }
}
