//! Read-only view of the grid the autopilot reasons over.
//!
//! The host simulation owns the maze and its entities; once per tick it hands
//! the autopilot something implementing [`GridWorld`]. [`WorldView`] is the
//! implementation built from a [`MazeMap`] plus whatever currently stands on it.

use std::collections::HashMap;

use crate::components::GridPosition;
use crate::error::ConfigError;
use crate::maze::{MazeMap, TileType};

/// Behavioural sub-state of a hostile occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreatMood {
    Active,
    Frightened,
}

/// Something standing on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occupant {
    Hostile(ThreatMood),
    Pellet,
    PowerPellet,
    Bonus,
}

/// Everything a target predicate may look at for one tile.
#[derive(Debug, Clone, Copy)]
pub struct Cell<'w> {
    pub position: GridPosition,
    pub tile: TileType,
    pub occupants: &'w [Occupant],
}

impl Cell<'_> {
    pub fn has(&self, occupant: Occupant) -> bool {
        self.occupants.contains(&occupant)
    }
}

/// Toroidal grid queried by the search and the threat scanner.
///
/// Implementations must accept any coordinate and wrap it; there is no edge.
pub trait GridWorld {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    fn tile(&self, pos: GridPosition) -> TileType;

    /// Whether the agent may stand on this tile.
    fn is_passable(&self, pos: GridPosition) -> bool;

    /// Entities on this tile, in a stable order.
    fn occupants(&self, pos: GridPosition) -> &[Occupant];

    fn wrap(&self, pos: GridPosition) -> GridPosition {
        GridPosition {
            x: pos.x.rem_euclid(self.width() as i32),
            y: pos.y.rem_euclid(self.height() as i32),
        }
    }

    fn cell(&self, pos: GridPosition) -> Cell<'_> {
        let position = self.wrap(pos);
        Cell {
            position,
            tile: self.tile(position),
            occupants: self.occupants(position),
        }
    }

    fn tile_count(&self) -> usize {
        self.width() * self.height()
    }
}

/// Reject worlds the modulo addressing cannot work with.
pub fn validate_dimensions<W: GridWorld + ?Sized>(world: &W) -> Result<(), ConfigError> {
    let (width, height) = (world.width(), world.height());
    if width == 0 || height == 0 || width > i32::MAX as usize || height > i32::MAX as usize {
        return Err(ConfigError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// A maze plus a per-tick occupancy index.
#[derive(Debug, Clone)]
pub struct WorldView<'m> {
    maze: &'m MazeMap,
    occupants: HashMap<GridPosition, Vec<Occupant>>,
}

impl<'m> WorldView<'m> {
    pub fn new(maze: &'m MazeMap) -> Self {
        Self {
            maze,
            occupants: HashMap::new(),
        }
    }

    /// A view whose pellets sit where the maze layout puts them.
    pub fn from_layout(maze: &'m MazeMap) -> Self {
        let mut view = Self::new(maze);
        for pos in maze.positions_of(TileType::Pellet) {
            view.add(pos, Occupant::Pellet);
        }
        for pos in maze.positions_of(TileType::PowerPellet) {
            view.add(pos, Occupant::PowerPellet);
        }
        view
    }

    pub fn add(&mut self, pos: GridPosition, occupant: Occupant) {
        let pos = self.maze.wrap(pos);
        self.occupants.entry(pos).or_default().push(occupant);
    }

    pub fn with(mut self, pos: GridPosition, occupant: Occupant) -> Self {
        self.add(pos, occupant);
        self
    }

    pub fn maze(&self) -> &MazeMap {
        self.maze
    }
}

impl GridWorld for WorldView<'_> {
    fn width(&self) -> usize {
        self.maze.width()
    }

    fn height(&self) -> usize {
        self.maze.height()
    }

    fn tile(&self, pos: GridPosition) -> TileType {
        self.maze.tile_at(pos)
    }

    fn is_passable(&self, pos: GridPosition) -> bool {
        self.maze.is_walkable_for_agent(pos)
    }

    fn occupants(&self, pos: GridPosition) -> &[Occupant] {
        self.occupants
            .get(&self.maze.wrap(pos))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
