//! Nearest-target direction finder.
//!
//! A breadth-first search over the torus that answers one question per target
//! category: which of the agent's four possible first steps begin a shortest
//! route to the closest matching cell? Several steps can qualify when targets
//! (or routes to the same target) tie on distance.

use std::collections::VecDeque;

use micromegas_tracing::prelude::span_scope;
use pathfinding::matrix::Matrix;

use crate::components::{Direction, GridPosition, RelativeDirection};
use crate::world::{Cell, GridWorld};

/// One bit per agent-relative direction, in [`RelativeDirection::ALL`] order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchResult([bool; 4]);

impl SearchResult {
    pub fn from_bits(bits: [bool; 4]) -> Self {
        Self(bits)
    }

    pub fn get(&self, dir: RelativeDirection) -> bool {
        self.0[dir.index()]
    }

    pub fn bits(&self) -> [bool; 4] {
        self.0
    }

    /// True when at least one direction leads to a target.
    pub fn any(&self) -> bool {
        self.0.iter().any(|b| *b)
    }

    fn set(&mut self, dir: RelativeDirection) {
        self.0[dir.index()] = true;
    }
}

#[derive(Debug, Clone, Copy)]
struct Node {
    pos: GridPosition,
    distance: u32,
}

/// Directional breadth-first search bound to one world snapshot.
pub struct DirectionalSearch<'w, W: ?Sized> {
    world: &'w W,
}

impl<'w, W: GridWorld + ?Sized> DirectionalSearch<'w, W> {
    pub fn new(world: &'w W) -> Self {
        Self { world }
    }

    /// Which first moves from `start` reach the nearest cell matching
    /// `predicate`, expressed relative to `facing`.
    ///
    /// Cells that are not passable are still entered when they match, but a
    /// matching cell is never expanded. A match on `start` itself sets the
    /// closest distance to zero and yields an empty result.
    pub fn directions_to_nearest<P>(
        &self,
        start: GridPosition,
        facing: Direction,
        predicate: P,
    ) -> SearchResult
    where
        P: Fn(&Cell<'_>) -> bool,
    {
        span_scope!("directional_search");

        let world = self.world;
        let start = world.wrap(start);

        // Per-call arena: distance of each discovered cell and the set of
        // first moves that reach it at that distance.
        let mut distance: Matrix<Option<u32>> = Matrix::new(world.height(), world.width(), None);
        let mut first_moves: Matrix<u8> = Matrix::new(world.height(), world.width(), 0);
        let mut queue = VecDeque::with_capacity(world.tile_count());

        distance[key(start)] = Some(0);
        queue.push_back(Node {
            pos: start,
            distance: 0,
        });

        let mut closest = u32::MAX;
        let mut moves_to_closest = 0u8;

        while let Some(node) = queue.pop_front() {
            if node.distance > closest {
                // Queue order is non-decreasing in distance; the rest are only drained.
                continue;
            }

            let moves = first_moves[key(node.pos)];
            if predicate(&world.cell(node.pos)) {
                if node.distance < closest {
                    closest = node.distance;
                    moves_to_closest = 0;
                }
                moves_to_closest |= moves;
                continue;
            }

            if node.distance == closest {
                // Neighbours would be farther than the closest target.
                continue;
            }

            for dir in Direction::ALL {
                let next = world.wrap(node.pos.step(dir));
                let inherited = if node.pos == start { dir.bit() } else { moves };
                let next_distance = node.distance + 1;

                match distance[key(next)] {
                    None => {
                        if !(world.is_passable(next) || predicate(&world.cell(next))) {
                            continue;
                        }
                        distance[key(next)] = Some(next_distance);
                        first_moves[key(next)] = inherited;
                        queue.push_back(Node {
                            pos: next,
                            distance: next_distance,
                        });
                    }
                    Some(known) if known == next_distance => {
                        // Tied route: merge first moves into the queued node.
                        first_moves[key(next)] |= inherited;
                    }
                    Some(_) => {}
                }
            }
        }

        let mut result = SearchResult::default();
        for dir in Direction::ALL {
            if moves_to_closest & dir.bit() != 0 {
                result.set(dir.relative_to(facing));
            }
        }
        result
    }
}

fn key(pos: GridPosition) -> (usize, usize) {
    (pos.y as usize, pos.x as usize)
}
