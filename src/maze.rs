//! Maze layout parsed from ASCII and addressed as a torus.
//!
//! Every coordinate is valid: positions are reduced modulo the maze size before
//! lookup, so walking off one edge lands on the opposite one.

use bevy::prelude::*;
use pathfinding::matrix::Matrix;

use crate::components::GridPosition;
use crate::error::MazeError;

// ---------------------------------------------------------------------------
// Tile types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileType {
    Wall,
    Floor,
    Pellet,
    PowerPellet,
    PenGate,
    PlayerSpawn,
    EnemySpawn,
    BonusSpawn,
}

impl TileType {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '#' => Some(TileType::Wall),
            ' ' => Some(TileType::Floor),
            '.' => Some(TileType::Pellet),
            'o' => Some(TileType::PowerPellet),
            '-' => Some(TileType::PenGate),
            'P' => Some(TileType::PlayerSpawn),
            'G' => Some(TileType::EnemySpawn),
            'B' => Some(TileType::BonusSpawn),
            _ => None,
        }
    }

    /// Whether entities can walk on this tile (floor-like).
    pub fn is_walkable_floor(&self) -> bool {
        !matches!(self, TileType::Wall | TileType::PenGate)
    }
}

// ---------------------------------------------------------------------------
// Maze map resource
// ---------------------------------------------------------------------------

/// Parsed maze grid and spawn positions. Row `y`, column `x`.
#[derive(Resource, Debug, Clone)]
pub struct MazeMap {
    tiles: Matrix<TileType>,
    pub player_spawn: GridPosition,
    pub enemy_spawns: Vec<GridPosition>,
    pub bonus_spawns: Vec<GridPosition>,
}

impl MazeMap {
    /// Parse an ASCII maze string into a MazeMap.
    pub fn parse(text: &str) -> Result<Self, MazeError> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.is_empty() {
            return Err(MazeError::Empty);
        }

        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        if width == 0 {
            return Err(MazeError::ZeroWidth);
        }

        let mut rows = Vec::with_capacity(lines.len());
        let mut player_spawn = None;
        let mut enemy_spawns = Vec::new();
        let mut bonus_spawns = Vec::new();

        for (y, line) in lines.iter().enumerate() {
            let mut row = Vec::with_capacity(width);
            for (x, ch) in line.chars().enumerate() {
                let tile = TileType::from_char(ch).ok_or(MazeError::UnknownTile { ch, x, y })?;
                let pos = GridPosition::new(x as i32, y as i32);

                match tile {
                    TileType::PlayerSpawn => {
                        if player_spawn.is_some() {
                            return Err(MazeError::MultiplePlayerSpawns { x, y });
                        }
                        player_spawn = Some(pos);
                    }
                    TileType::EnemySpawn => enemy_spawns.push(pos),
                    TileType::BonusSpawn => bonus_spawns.push(pos),
                    _ => {}
                }

                row.push(tile);
            }
            // Pad short rows with Floor
            row.resize(width, TileType::Floor);
            rows.push(row);
        }

        let player_spawn = player_spawn.ok_or(MazeError::NoPlayerSpawn)?;
        // Rows all have `width` entries at this point.
        let tiles = Matrix::from_rows(rows).map_err(|_| MazeError::ZeroWidth)?;

        Ok(MazeMap {
            tiles,
            player_spawn,
            enemy_spawns,
            bonus_spawns,
        })
    }

    pub fn width(&self) -> usize {
        self.tiles.columns
    }

    pub fn height(&self) -> usize {
        self.tiles.rows
    }

    /// Reduce a position onto the torus.
    pub fn wrap(&self, pos: GridPosition) -> GridPosition {
        GridPosition {
            x: pos.x.rem_euclid(self.width() as i32),
            y: pos.y.rem_euclid(self.height() as i32),
        }
    }

    /// Tile type at a position. Out-of-range coordinates wrap around.
    pub fn tile_at(&self, pos: GridPosition) -> TileType {
        let pos = self.wrap(pos);
        self.tiles[(pos.y as usize, pos.x as usize)]
    }

    /// Walkable for the agent: pen gates are closed to it.
    pub fn is_walkable_for_agent(&self, pos: GridPosition) -> bool {
        self.tile_at(pos).is_walkable_floor()
    }

    /// Walkable for enemies: pen gates are open to them.
    pub fn is_walkable_for_enemy(&self, pos: GridPosition) -> bool {
        let tile = self.tile_at(pos);
        tile.is_walkable_floor() || tile == TileType::PenGate
    }

    /// Positions of every tile of the given type, row by row.
    pub fn positions_of(&self, tile: TileType) -> impl Iterator<Item = GridPosition> + '_ {
        self.tiles
            .keys()
            .filter(move |key| self.tiles[*key] == tile)
            .map(|(y, x)| GridPosition::new(x as i32, y as i32))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
