//! Line-of-sight threat scanner.
//!
//! Looks down each of the four absolute corridors from the agent's tile and
//! reports what the first hostile in view (if any) is doing.

use crate::components::{Direction, GridPosition, RelativeDirection};
use crate::world::{GridWorld, Occupant, ThreatMood};

/// Outcome of one straight-line scan.
///
/// `path_clear` and `passive_threat_ahead` are never both true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreatReading {
    pub path_clear: bool,
    pub passive_threat_ahead: bool,
}

impl ThreatReading {
    pub const CLEAR: ThreatReading = ThreatReading {
        path_clear: true,
        passive_threat_ahead: false,
    };

    pub const BLOCKED: ThreatReading = ThreatReading {
        path_clear: false,
        passive_threat_ahead: false,
    };

    pub const PASSIVE: ThreatReading = ThreatReading {
        path_clear: false,
        passive_threat_ahead: true,
    };
}

/// Readings for all four absolute directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreatScan {
    up: ThreatReading,
    down: ThreatReading,
    left: ThreatReading,
    right: ThreatReading,
}

impl ThreatScan {
    pub fn get(&self, dir: Direction) -> ThreatReading {
        match dir {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// Readings rotated into the agent's frame, in [`RelativeDirection::ALL`] order.
    pub fn relative(&self, facing: Direction) -> [ThreatReading; 4] {
        RelativeDirection::ALL.map(|rel| self.get(rel.to_absolute(facing)))
    }
}

/// Scan all four corridors leaving `start`.
pub fn scan<W: GridWorld + ?Sized>(world: &W, start: GridPosition) -> ThreatScan {
    ThreatScan {
        up: scan_ray(world, start, Direction::Up),
        down: scan_ray(world, start, Direction::Down),
        left: scan_ray(world, start, Direction::Left),
        right: scan_ray(world, start, Direction::Right),
    }
}

/// Walk from the tile next to `start` while tiles stay walkable. The first
/// hostile met decides the reading. The walk is capped at the tile count so a
/// corridor looping around the torus still ends.
pub fn scan_ray<W: GridWorld + ?Sized>(
    world: &W,
    start: GridPosition,
    dir: Direction,
) -> ThreatReading {
    let mut pos = world.wrap(start.step(dir));

    for _ in 0..world.tile_count() {
        if !world.is_passable(pos) {
            break;
        }

        let hostile = world.occupants(pos).iter().find_map(|occupant| match occupant {
            Occupant::Hostile(mood) => Some(*mood),
            _ => None,
        });
        match hostile {
            Some(ThreatMood::Frightened) => return ThreatReading::PASSIVE,
            Some(ThreatMood::Active) => return ThreatReading::BLOCKED,
            None => {}
        }

        pos = world.wrap(pos.step(dir));
    }

    ThreatReading::CLEAR
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::MazeMap;
    use crate::world::WorldView;

    const CORRIDOR: &str = "\
#########
#   P   #
#########";

    #[test]
    fn empty_corridor_is_clear() {
        let maze = MazeMap::parse(CORRIDOR).unwrap();
        let world = WorldView::new(&maze);
        let scan = scan(&world, maze.player_spawn);
        for dir in Direction::ALL {
            assert_eq!(scan.get(dir), ThreatReading::CLEAR);
        }
    }

    #[test]
    fn active_enemy_blocks() {
        let maze = MazeMap::parse(CORRIDOR).unwrap();
        let world = WorldView::new(&maze).with(
            GridPosition::new(7, 1),
            Occupant::Hostile(ThreatMood::Active),
        );
        let scan = scan(&world, maze.player_spawn);
        assert_eq!(scan.get(Direction::Right), ThreatReading::BLOCKED);
        assert_eq!(scan.get(Direction::Left), ThreatReading::CLEAR);
    }

    #[test]
    fn frightened_enemy_is_passive() {
        let maze = MazeMap::parse(CORRIDOR).unwrap();
        let world = WorldView::new(&maze).with(
            GridPosition::new(2, 1),
            Occupant::Hostile(ThreatMood::Frightened),
        );
        let reading = scan(&world, maze.player_spawn).get(Direction::Left);
        assert_eq!(reading, ThreatReading::PASSIVE);
        assert!(!(reading.path_clear && reading.passive_threat_ahead));
    }

    #[test]
    fn nearest_enemy_decides() {
        let maze = MazeMap::parse(CORRIDOR).unwrap();
        let world = WorldView::new(&maze)
            .with(GridPosition::new(5, 1), Occupant::Hostile(ThreatMood::Frightened))
            .with(GridPosition::new(6, 1), Occupant::Hostile(ThreatMood::Active));
        assert_eq!(
            scan(&world, maze.player_spawn).get(Direction::Right),
            ThreatReading::PASSIVE
        );
    }

    #[test]
    fn walls_hide_enemies() {
        let maze = MazeMap::parse("#########\n#  #P   #\n#########").unwrap();
        let world = WorldView::new(&maze).with(
            GridPosition::new(1, 1),
            Occupant::Hostile(ThreatMood::Active),
        );
        assert_eq!(
            scan(&world, maze.player_spawn).get(Direction::Left),
            ThreatReading::CLEAR
        );
    }

    #[test]
    fn sight_wraps_around_the_torus() {
        let maze = MazeMap::parse("P    \n#####").unwrap();
        // Enemy at x=4 is one step left of the agent through the wrap.
        let world = WorldView::new(&maze).with(
            GridPosition::new(4, 0),
            Occupant::Hostile(ThreatMood::Active),
        );
        let scan = scan(&world, maze.player_spawn);
        assert_eq!(scan.get(Direction::Left), ThreatReading::BLOCKED);
        assert_eq!(scan.get(Direction::Right), ThreatReading::BLOCKED);
    }

    #[test]
    fn open_torus_scan_terminates() {
        let maze = MazeMap::parse("P   \n    \n    ").unwrap();
        let world = WorldView::new(&maze);
        let scan = scan(&world, maze.player_spawn);
        for dir in Direction::ALL {
            assert_eq!(scan.get(dir), ThreatReading::CLEAR);
        }
    }

    #[test]
    fn relative_readings_follow_facing() {
        let maze = MazeMap::parse(CORRIDOR).unwrap();
        let world = WorldView::new(&maze).with(
            GridPosition::new(7, 1),
            Occupant::Hostile(ThreatMood::Active),
        );
        let scan = scan(&world, maze.player_spawn);
        // Facing up, the enemy on the right is on the agent's right.
        let rel = scan.relative(Direction::Up);
        assert_eq!(rel[RelativeDirection::Right.index()], ThreatReading::BLOCKED);
        assert_eq!(rel[RelativeDirection::Forward.index()], ThreatReading::CLEAR);
        // Facing left, it is behind.
        let rel = scan.relative(Direction::Left);
        assert_eq!(rel[RelativeDirection::Behind.index()], ThreatReading::BLOCKED);
    }
}
