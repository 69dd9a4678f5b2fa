use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{
    state::Cell,
    world::{bottom_row, place_racks, World},
};
use crate::{
    assert_interval,
    error::{Error, Result},
    render::RenderMode,
};

/// Immediate rewards of the warehouse MDP
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Rewards {
    /// A move that changes the agent's location
    pub step: f64,
    /// A move blocked by a boundary or a rack, or one that slipped
    pub bump: f64,
    /// Picking up a rack
    pub pickup: f64,
    /// Delivering a rack at its target
    pub delivery: f64,
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            step: -1.0,
            bump: -2.0,
            pickup: 1.0,
            delivery: 10.0,
        }
    }
}

/// Configuration for a [`Warehouse`](super::Warehouse)
///
/// Every field has a default, so a partial JSON object is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WarehouseConfig {
    /// Side length of the square floor
    pub size: usize,
    pub initial_location: Cell,
    /// Explicit rack cells, replacing the built-in placement
    pub racks: Option<Vec<Cell>>,
    /// Explicit drop-off cells, defaulting to the free cells of the bottom row
    pub dropoffs: Option<Vec<Cell>>,
    pub rewards: Rewards,
    /// Probability that a move leaves the agent where it is
    pub slip: f64,
    pub render_mode: RenderMode,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            size: 20,
            initial_location: Cell::new(0, 0),
            racks: None,
            dropoffs: None,
            rewards: Rewards::default(),
            slip: 0.0,
            render_mode: RenderMode::Off,
        }
    }
}

impl WarehouseConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the movement noise
    ///
    /// **Panics** if `slip` is not in the interval `[0,1]`
    pub fn with_slip(mut self, slip: f64) -> Self {
        assert_interval!(slip, 0.0, 1.0);
        self.slip = slip;
        self
    }

    /// Use an explicit rack layout; drop-offs stay at their default unless also given
    pub fn with_racks(mut self, racks: impl IntoIterator<Item = Cell>) -> Self {
        self.racks = Some(racks.into_iter().collect());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.slip) {
            return Err(Error::Config(format!(
                "slip must be in [0, 1], got {}",
                self.slip
            )));
        }
        let rewards = &self.rewards;
        for (name, value) in [
            ("step", rewards.step),
            ("bump", rewards.bump),
            ("pickup", rewards.pickup),
            ("delivery", rewards.delivery),
        ] {
            if !value.is_finite() {
                return Err(Error::Config(format!("reward `{name}` must be finite")));
            }
        }
        Ok(())
    }

    /// Build the floor described by this configuration
    pub fn world(&self) -> Result<World> {
        let world = match (&self.racks, &self.dropoffs) {
            (None, None) => World::new(self.size)?,
            (racks, dropoffs) => {
                let racks: HashSet<Cell> = match racks {
                    Some(racks) => racks.iter().copied().collect(),
                    None => place_racks(self.size),
                };
                let dropoffs = match dropoffs {
                    Some(dropoffs) => dropoffs.clone(),
                    None => bottom_row(self.size, &racks),
                };
                World::with_layout(self.size, racks, dropoffs)?
            }
        };
        world.check_start(self.initial_location)?;
        Ok(world)
    }
}
