use bevy::prelude::*;

// ---------------------------------------------------------------------------
// Grid and spatial
// ---------------------------------------------------------------------------

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The adjacent position one step in `dir`. Not wrapped.
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Cardinal direction in the absolute grid frame. Grid y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Grid offset for this direction.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Quarter turn counter-clockwise.
    pub fn left(&self) -> Direction {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    /// Quarter turn clockwise.
    pub fn right(&self) -> Direction {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    pub fn behind(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Express this absolute direction in the frame of an agent facing `facing`.
    pub fn relative_to(&self, facing: Direction) -> RelativeDirection {
        if *self == facing {
            RelativeDirection::Forward
        } else if *self == facing.left() {
            RelativeDirection::Left
        } else if *self == facing.right() {
            RelativeDirection::Right
        } else {
            RelativeDirection::Behind
        }
    }

    pub(crate) fn bit(&self) -> u8 {
        match self {
            Direction::Up => 0b0001,
            Direction::Down => 0b0010,
            Direction::Left => 0b0100,
            Direction::Right => 0b1000,
        }
    }
}

/// Direction in the agent's own frame. The declaration order is the order of
/// every four-wide block in the feature vector and of the policy outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativeDirection {
    Forward,
    Left,
    Right,
    Behind,
}

impl RelativeDirection {
    pub const ALL: [RelativeDirection; 4] = [
        RelativeDirection::Forward,
        RelativeDirection::Left,
        RelativeDirection::Right,
        RelativeDirection::Behind,
    ];

    pub fn index(&self) -> usize {
        match self {
            RelativeDirection::Forward => 0,
            RelativeDirection::Left => 1,
            RelativeDirection::Right => 2,
            RelativeDirection::Behind => 3,
        }
    }

    pub fn to_absolute(&self, facing: Direction) -> Direction {
        match self {
            RelativeDirection::Forward => facing,
            RelativeDirection::Left => facing.left(),
            RelativeDirection::Right => facing.right(),
            RelativeDirection::Behind => facing.behind(),
        }
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// Marker: this entity is steered by the autopilot.
#[derive(Component, Debug)]
pub struct Agent;

/// Absolute direction the agent currently faces. Maintained by the host's
/// movement systems.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Facing(pub Direction);

/// Buffered move chosen by the autopilot. The host applies it when the agent
/// arrives at a tile.
#[derive(Component, Debug, Default)]
pub struct InputDirection(pub Option<Direction>);

// ---------------------------------------------------------------------------
// Other occupants
// ---------------------------------------------------------------------------

#[derive(Component, Debug)]
pub struct Enemy;

/// Marker: enemy is frightened and harmless to the agent.
#[derive(Component, Debug)]
pub struct Frightened;

#[derive(Component, Debug)]
pub struct Pellet;

#[derive(Component, Debug)]
pub struct PowerPellet;

/// Mobile bonus item (fruit and the like).
#[derive(Component, Debug)]
pub struct BonusItem;
