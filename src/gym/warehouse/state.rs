use serde::{Deserialize, Serialize};
use strum::{Display, FromRepr, VariantArray};

/// A grid coordinate; `y` grows downward
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn shift(self, (dx, dy): (i32, i32)) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four orthogonal neighbours, bounds not checked
    pub fn neighbours(self) -> [Cell; 4] {
        Action::MOVES.map(|a| self.shift(a.direction().unwrap_or_default()))
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Cell> for (i32, i32) {
    fn from(cell: Cell) -> Self {
        (cell.x, cell.y)
    }
}

/// The six warehouse actions, with their fixed action-space indices
#[derive(VariantArray, FromRepr, Display, Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    Right = 0,
    Down = 1,
    Left = 2,
    Up = 3,
    Pickup = 4,
    Dropoff = 5,
}

impl Action {
    /// Size of the action space
    pub const COUNT: usize = 6;

    pub const MOVES: [Action; 4] = [Action::Right, Action::Down, Action::Left, Action::Up];

    /// The action with action-space index `i`
    pub fn from_index(i: usize) -> Option<Self> {
        u8::try_from(i).ok().and_then(Self::from_repr)
    }

    /// The action-space index of this action
    pub fn index(self) -> usize {
        self as usize
    }

    /// Unit vector of a movement action, `None` for pickup and dropoff
    pub fn direction(self) -> Option<(i32, i32)> {
        match self {
            Action::Right => Some((1, 0)),
            Action::Down => Some((0, 1)),
            Action::Left => Some((-1, 0)),
            Action::Up => Some((0, -1)),
            Action::Pickup | Action::Dropoff => None,
        }
    }
}

/// The full state of the warehouse MDP
///
/// `target` is the drop-off cell assigned at pickup, and is `None` whenever `carrying` is false.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentState {
    pub location: Cell,
    pub carrying: bool,
    pub target: Option<Cell>,
}

impl AgentState {
    /// An agent at `location` carrying nothing
    pub fn idle(location: Cell) -> Self {
        Self {
            location,
            carrying: false,
            target: None,
        }
    }

    /// An agent at `location` carrying a rack bound for `target`
    pub fn loaded(location: Cell, target: Cell) -> Self {
        Self {
            location,
            carrying: true,
            target: Some(target),
        }
    }

    pub fn with_location(self, location: Cell) -> Self {
        Self { location, ..self }
    }

    /// Compact JSON word describing the state, usable as an automaton symbol
    ///
    /// `{"a":[x,y],"c":0|1,"r":[x,y]|null}` with `a` the location, `c` the carrying flag and `r` the target.
    pub fn word(&self) -> String {
        serde_json::json!({
            "a": [self.location.x, self.location.y],
            "c": u8::from(self.carrying),
            "r": self.target.map(|t| [t.x, t.y]),
        })
        .to_string()
    }
}
