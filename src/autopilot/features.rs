//! Feature vector assembly and decision extraction.
//!
//! Layout, all entries exactly `0.0` or `1.0`, each block of four in
//! `forward, left, right, behind` order:
//!
//! | range              | content                                        |
//! |--------------------|------------------------------------------------|
//! | `0..4`             | the agent can step that way                    |
//! | `4 + 4k..8 + 4k`   | first moves toward the nearest target of `k`   |
//! | `4 + 4K..12 + 4K`  | `(path_clear, passive_threat_ahead)` pairs     |
//!
//! The policy is trained against this layout; reordering it is a breaking change.
//! The threat pairs are in the agent frame, not absolute `UP, LEFT, RIGHT, DOWN`
//! order, so weights trained on an absolute-order layout do not carry over.

use bevy::prelude::Resource;
use micromegas_tracing::prelude::span_scope;

use crate::autopilot::search::{DirectionalSearch, SearchResult};
use crate::autopilot::threat::{self, ThreatScan};
use crate::components::{Direction, GridPosition, RelativeDirection};
use crate::error::{ConfigError, PolicyOutputError};
use crate::world::{Cell, GridWorld, Occupant};

pub const MOVEMENT_INPUTS: usize = 4;
pub const THREAT_INPUTS: usize = 8;
/// Policy outputs: one score per relative direction.
pub const POLICY_OUTPUTS: usize = 4;

/// Feature vector length for `categories` target categories.
pub const fn feature_len(categories: usize) -> usize {
    MOVEMENT_INPUTS + 4 * categories + THREAT_INPUTS
}

type Predicate = dyn Fn(&Cell<'_>) -> bool + Send + Sync;

/// One kind of goal the agent is told about.
pub struct TargetCategory {
    pub name: &'static str,
    predicate: Box<Predicate>,
}

impl TargetCategory {
    pub fn new(name: &'static str, predicate: impl Fn(&Cell<'_>) -> bool + Send + Sync + 'static) -> Self {
        Self {
            name,
            predicate: Box::new(predicate),
        }
    }

    pub fn matches(&self, cell: &Cell<'_>) -> bool {
        (self.predicate)(cell)
    }

    /// Pellets of either size.
    pub fn pellet() -> Self {
        Self::new("pellet", |cell| {
            cell.has(Occupant::Pellet) || cell.has(Occupant::PowerPellet)
        })
    }

    pub fn power_pellet() -> Self {
        Self::new("power_pellet", |cell| cell.has(Occupant::PowerPellet))
    }

    pub fn bonus() -> Self {
        Self::new("bonus", |cell| cell.has(Occupant::Bonus))
    }

    /// The three categories the reference policies are trained on, in order.
    pub fn standard() -> Vec<Self> {
        vec![Self::pellet(), Self::power_pellet(), Self::bonus()]
    }
}

impl std::fmt::Debug for TargetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetCategory")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Where the agent is and which way it looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentPose {
    pub position: GridPosition,
    pub facing: Direction,
}

/// Flat, fixed-length policy input.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }
}

/// Everything the assembler saw in one tick, kept for logging and tests.
#[derive(Debug, Clone)]
pub struct Observation {
    pub legal_moves: [bool; 4],
    pub targets: Vec<SearchResult>,
    pub threats: ThreatScan,
    pub features: FeatureVector,
}

/// Which relative moves lead onto a passable tile.
pub fn movement_legality<W: GridWorld + ?Sized>(
    world: &W,
    position: GridPosition,
    facing: Direction,
) -> [bool; 4] {
    RelativeDirection::ALL.map(|rel| world.is_passable(position.step(rel.to_absolute(facing))))
}

/// Pack the per-tick signals into the documented layout.
pub fn assemble(
    legal_moves: [bool; 4],
    targets: &[SearchResult],
    threats: &ThreatScan,
    facing: Direction,
) -> FeatureVector {
    let mut inputs = Vec::with_capacity(feature_len(targets.len()));
    inputs.extend(legal_moves.map(as_input));
    for result in targets {
        inputs.extend(result.bits().map(as_input));
    }
    for reading in threats.relative(facing) {
        inputs.push(as_input(reading.path_clear));
        inputs.push(as_input(reading.passive_threat_ahead));
    }
    FeatureVector(inputs)
}

fn as_input(flag: bool) -> f32 {
    if flag { 1.0 } else { 0.0 }
}

/// Runs every search and the threat scan for a fixed set of categories.
#[derive(Resource, Debug)]
pub struct FeatureAssembler {
    categories: Vec<TargetCategory>,
}

impl FeatureAssembler {
    pub fn new(categories: Vec<TargetCategory>) -> Result<Self, ConfigError> {
        if categories.is_empty() {
            return Err(ConfigError::NoTargetCategories);
        }
        Ok(Self { categories })
    }

    pub fn standard() -> Self {
        Self {
            categories: TargetCategory::standard(),
        }
    }

    pub fn categories(&self) -> &[TargetCategory] {
        &self.categories
    }

    pub fn feature_len(&self) -> usize {
        feature_len(self.categories.len())
    }

    pub fn observe<W: GridWorld + ?Sized>(&self, world: &W, pose: AgentPose) -> Observation {
        span_scope!("observe");

        let legal_moves = movement_legality(world, pose.position, pose.facing);
        let search = DirectionalSearch::new(world);
        let targets: Vec<SearchResult> = self
            .categories
            .iter()
            .map(|category| {
                search.directions_to_nearest(pose.position, pose.facing, |cell| {
                    category.matches(cell)
                })
            })
            .collect();
        let threats = threat::scan(world, pose.position);
        let features = assemble(legal_moves, &targets, &threats, pose.facing);

        Observation {
            legal_moves,
            targets,
            threats,
            features,
        }
    }
}

impl Default for FeatureAssembler {
    fn default() -> Self {
        Self::standard()
    }
}

/// Arg-max over the four policy outputs, first index winning ties, mapped to
/// an absolute direction.
pub fn select_direction(outputs: &[f32], facing: Direction) -> Result<Direction, PolicyOutputError> {
    if outputs.len() != POLICY_OUTPUTS {
        return Err(PolicyOutputError::WrongLength {
            expected: POLICY_OUTPUTS,
            actual: outputs.len(),
        });
    }
    if let Some((index, value)) = outputs.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(PolicyOutputError::NonFinite {
            index,
            value: *value,
        });
    }

    let mut best = 0;
    for (index, value) in outputs.iter().enumerate().skip(1) {
        if *value > outputs[best] {
            best = index;
        }
    }
    Ok(RelativeDirection::ALL[best].to_absolute(facing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autopilot::threat::ThreatReading;
    use crate::maze::MazeMap;
    use crate::world::{ThreatMood, WorldView};

    const MAZE: &str = "\
#######
#. o  #
# #P# #
#     #
#######";

    #[test]
    fn feature_length_matches_category_count() {
        assert_eq!(feature_len(3), 24);
        assert_eq!(feature_len(1), 16);
        let maze = MazeMap::parse(MAZE).unwrap();
        let world = WorldView::from_layout(&maze);
        let pose = AgentPose {
            position: maze.player_spawn,
            facing: Direction::Up,
        };
        let assembler = FeatureAssembler::standard();
        let observation = assembler.observe(&world, pose);
        assert_eq!(observation.features.len(), 24);
        assert_eq!(assembler.feature_len(), 24);
        assert!(observation
            .features
            .as_slice()
            .iter()
            .all(|v| *v == 0.0 || *v == 1.0));
    }

    #[test]
    fn empty_category_list_is_rejected() {
        assert!(matches!(
            FeatureAssembler::new(Vec::new()),
            Err(ConfigError::NoTargetCategories)
        ));
    }

    #[test]
    fn observation_layout() {
        let maze = MazeMap::parse(MAZE).unwrap();
        let world = WorldView::from_layout(&maze).with(
            GridPosition::new(3, 3),
            Occupant::Hostile(ThreatMood::Active),
        );
        let pose = AgentPose {
            position: maze.player_spawn,
            facing: Direction::Up,
        };
        let features = FeatureAssembler::standard().observe(&world, pose).features;
        let f = features.as_slice();

        // Only up and down are open around (3,2).
        assert_eq!(&f[0..4], &[1.0, 0.0, 0.0, 1.0]);
        // Power pellet at (3,1) is one step ahead and is also the nearest pellet.
        assert_eq!(&f[4..8], &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(&f[8..12], &[1.0, 0.0, 0.0, 0.0]);
        // No bonus item anywhere.
        assert_eq!(&f[12..16], &[0.0, 0.0, 0.0, 0.0]);
        // Forward clear, left and right walls count as clear, enemy behind.
        assert_eq!(&f[16..24], &[1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn assemble_writes_threat_pairs_in_agent_frame() {
        let maze = MazeMap::parse("#####\n# P #\n#####").unwrap();
        let world = WorldView::new(&maze).with(
            GridPosition::new(3, 1),
            Occupant::Hostile(ThreatMood::Frightened),
        );
        let scan = threat::scan(&world, maze.player_spawn);
        assert_eq!(scan.get(Direction::Right), ThreatReading::PASSIVE);

        let features = assemble([false; 4], &[SearchResult::default()], &scan, Direction::Down);
        // Facing down, east is the agent's left.
        let threat_block = &features.as_slice()[8..16];
        assert_eq!(threat_block, &[1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn argmax_picks_highest() {
        let dir = select_direction(&[0.1, 0.9, 0.2, 0.0], Direction::Up).unwrap();
        assert_eq!(dir.relative_to(Direction::Up), RelativeDirection::Left);
        assert_eq!(dir, Direction::Left);
    }

    #[test]
    fn argmax_first_index_wins_ties() {
        let dir = select_direction(&[0.5, 0.5, 0.0, 0.0], Direction::Right).unwrap();
        assert_eq!(dir, Direction::Right);
        let dir = select_direction(&[0.0, 0.0, 0.7, 0.7], Direction::Right).unwrap();
        assert_eq!(dir, Direction::Down);
    }

    #[test]
    fn malformed_outputs_are_rejected() {
        assert_eq!(
            select_direction(&[1.0, 0.0, 0.0], Direction::Up),
            Err(PolicyOutputError::WrongLength {
                expected: 4,
                actual: 3
            })
        );
        assert!(matches!(
            select_direction(&[0.0, f32::NAN, 1.0, 0.0], Direction::Up),
            Err(PolicyOutputError::NonFinite { index: 1, .. })
        ));
        assert!(select_direction(&[f32::INFINITY, 0.0, 0.0, 0.0], Direction::Up).is_err());
    }

    #[test]
    fn legality_is_relative_to_facing() {
        let maze = MazeMap::parse(MAZE).unwrap();
        let world = WorldView::new(&maze);
        assert_eq!(
            movement_legality(&world, maze.player_spawn, Direction::Left),
            [false, true, true, false]
        );
    }
}
