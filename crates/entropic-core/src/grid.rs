//! Grid geometry: positions, faces, and facing-relative side configuration.
//!
//! Devices occupy integer grid cells and interact with their six neighbors.
//! Per-face I/O rules are stored relative to the device's facing (front,
//! back, left, right, top, bottom) so rotating a device rotates its
//! configuration with it.

use serde::{Serialize, Deserialize};

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// A cell position in the grid world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The neighboring cell through the given face.
    pub fn offset(self, face: Face) -> Self {
        let (dx, dy, dz) = face.delta();
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Chebyshev distance (cube radius) to another position.
    pub fn chebyshev(self, other: Self) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        let dz = (self.z - other.z).unsigned_abs();
        dx.max(dy).max(dz)
    }
}

// ---------------------------------------------------------------------------
// Faces
// ---------------------------------------------------------------------------

/// One of the six absolute grid directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Face {
    /// All faces in the fixed deterministic iteration order.
    pub const ALL: [Face; 6] = [
        Face::North,
        Face::South,
        Face::East,
        Face::West,
        Face::Up,
        Face::Down,
    ];

    /// Unit offset of this face.
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::North => (0, 0, -1),
            Face::South => (0, 0, 1),
            Face::East => (1, 0, 0),
            Face::West => (-1, 0, 0),
            Face::Up => (0, 1, 0),
            Face::Down => (0, -1, 0),
        }
    }

    pub fn opposite(self) -> Face {
        match self {
            Face::North => Face::South,
            Face::South => Face::North,
            Face::East => Face::West,
            Face::West => Face::East,
            Face::Up => Face::Down,
            Face::Down => Face::Up,
        }
    }

    /// Horizontal clockwise rotation (viewed from above). Vertical faces
    /// rotate to themselves.
    pub fn clockwise(self) -> Face {
        match self {
            Face::North => Face::East,
            Face::East => Face::South,
            Face::South => Face::West,
            Face::West => Face::North,
            other => other,
        }
    }

    pub fn counter_clockwise(self) -> Face {
        match self {
            Face::North => Face::West,
            Face::West => Face::South,
            Face::South => Face::East,
            Face::East => Face::North,
            other => other,
        }
    }

    /// Stable ordinal for persistence.
    pub fn ordinal(self) -> u8 {
        match self {
            Face::North => 0,
            Face::South => 1,
            Face::East => 2,
            Face::West => 3,
            Face::Up => 4,
            Face::Down => 5,
        }
    }

    /// Decode a persisted ordinal. Out-of-range values fall back to North.
    pub fn from_ordinal(ordinal: u8) -> Face {
        match ordinal {
            0 => Face::North,
            1 => Face::South,
            2 => Face::East,
            3 => Face::West,
            4 => Face::Up,
            5 => Face::Down,
            _ => Face::North,
        }
    }
}

// ---------------------------------------------------------------------------
// Relative sides
// ---------------------------------------------------------------------------

/// A side relative to the device's facing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelativeSide {
    Front,
    Back,
    Left,
    Right,
    Top,
    Bottom,
}

impl RelativeSide {
    pub const ALL: [RelativeSide; 6] = [
        RelativeSide::Front,
        RelativeSide::Back,
        RelativeSide::Left,
        RelativeSide::Right,
        RelativeSide::Top,
        RelativeSide::Bottom,
    ];

    fn index(self) -> usize {
        match self {
            RelativeSide::Front => 0,
            RelativeSide::Back => 1,
            RelativeSide::Left => 2,
            RelativeSide::Right => 3,
            RelativeSide::Top => 4,
            RelativeSide::Bottom => 5,
        }
    }
}

/// Map an absolute face to a side relative to the device's facing.
///
/// Vertical faces map to Top/Bottom regardless of facing. For horizontal
/// faces the facing is the front. Unresolvable combinations (a vertical
/// facing) fall back to Front.
pub fn relative_side(absolute: Face, facing: Face) -> RelativeSide {
    match absolute {
        Face::Up => return RelativeSide::Top,
        Face::Down => return RelativeSide::Bottom,
        _ => {}
    }
    if absolute == facing {
        RelativeSide::Front
    } else if absolute == facing.opposite() {
        RelativeSide::Back
    } else if absolute == facing.clockwise() {
        RelativeSide::Right
    } else if absolute == facing.counter_clockwise() {
        RelativeSide::Left
    } else {
        RelativeSide::Front
    }
}

/// Map a relative side back to an absolute face for the given facing.
pub fn absolute_face(side: RelativeSide, facing: Face) -> Face {
    match side {
        RelativeSide::Top => Face::Up,
        RelativeSide::Bottom => Face::Down,
        RelativeSide::Front => facing,
        RelativeSide::Back => facing.opposite(),
        RelativeSide::Right => facing.clockwise(),
        RelativeSide::Left => facing.counter_clockwise(),
    }
}

// ---------------------------------------------------------------------------
// Side modes
// ---------------------------------------------------------------------------

/// The I/O mode of one configurable side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideMode {
    /// No I/O allowed on this side.
    #[default]
    None,
    /// Accepts resources/items from external neighbors.
    Input,
    /// Pushes resources/items to external neighbors.
    Output,
    /// Both input and output allowed.
    Both,
}

impl SideMode {
    pub fn allows_input(self) -> bool {
        matches!(self, SideMode::Input | SideMode::Both)
    }

    pub fn allows_output(self) -> bool {
        matches!(self, SideMode::Output | SideMode::Both)
    }

    /// Cycle order: None -> Input -> Output -> Both -> None.
    pub fn next(self) -> SideMode {
        match self {
            SideMode::None => SideMode::Input,
            SideMode::Input => SideMode::Output,
            SideMode::Output => SideMode::Both,
            SideMode::Both => SideMode::None,
        }
    }

    pub fn previous(self) -> SideMode {
        match self {
            SideMode::None => SideMode::Both,
            SideMode::Input => SideMode::None,
            SideMode::Output => SideMode::Input,
            SideMode::Both => SideMode::Output,
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            SideMode::None => 0,
            SideMode::Input => 1,
            SideMode::Output => 2,
            SideMode::Both => 3,
        }
    }

    /// Decode a persisted ordinal. Out-of-range values fall back to None.
    pub fn from_ordinal(ordinal: u8) -> SideMode {
        match ordinal {
            0 => SideMode::None,
            1 => SideMode::Input,
            2 => SideMode::Output,
            3 => SideMode::Both,
            _ => SideMode::None,
        }
    }
}

// ---------------------------------------------------------------------------
// Side configuration
// ---------------------------------------------------------------------------

/// Per-device I/O configuration for all six relative sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideConfig {
    modes: [SideMode; 6],
}

impl SideConfig {
    /// All sides set to the given mode.
    pub fn uniform(mode: SideMode) -> Self {
        Self { modes: [mode; 6] }
    }

    pub fn mode(&self, side: RelativeSide) -> SideMode {
        self.modes[side.index()]
    }

    pub fn set_mode(&mut self, side: RelativeSide, mode: SideMode) {
        self.modes[side.index()] = mode;
    }

    pub fn cycle(&mut self, side: RelativeSide) {
        self.set_mode(side, self.mode(side).next());
    }

    pub fn cycle_reverse(&mut self, side: RelativeSide) {
        self.set_mode(side, self.mode(side).previous());
    }

    /// Mode for an absolute face, given the device's facing.
    pub fn mode_for(&self, face: Face, facing: Face) -> SideMode {
        self.mode(relative_side(face, facing))
    }

    pub fn allows_input_from(&self, face: Face, facing: Face) -> bool {
        self.mode_for(face, facing).allows_input()
    }

    pub fn allows_output_to(&self, face: Face, facing: Face) -> bool {
        self.mode_for(face, facing).allows_output()
    }

    /// Stable ordinals for persistence, indexed Front..Bottom.
    pub fn to_ordinals(&self) -> [u8; 6] {
        let mut out = [0u8; 6];
        for (i, m) in self.modes.iter().enumerate() {
            out[i] = m.ordinal();
        }
        out
    }

    /// Rebuild from persisted ordinals; invalid entries fall back to None.
    pub fn from_ordinals(ordinals: [u8; 6]) -> Self {
        let mut modes = [SideMode::None; 6];
        for (i, &o) in ordinals.iter().enumerate() {
            modes[i] = SideMode::from_ordinal(o);
        }
        Self { modes }
    }
}

impl Default for SideConfig {
    fn default() -> Self {
        Self::uniform(SideMode::None)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
