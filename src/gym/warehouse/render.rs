use log::debug;

use super::{
    state::{AgentState, Cell},
    world::World,
};
use crate::render::{Render, RenderMode};

/// Draws the warehouse floor as text, one row per line
///
/// `#` rack, `D` drop-off, `.` corridor, `A` agent (`C` when carrying), `T` target.
pub struct TextRenderer {
    world: World,
    mode: RenderMode,
}

impl TextRenderer {
    pub fn new(world: World, mode: RenderMode) -> Self {
        debug!("Acquired {mode:?} text renderer");
        Self { world, mode }
    }

    /// The frame for `state`, regardless of mode
    pub fn frame(&self, state: &AgentState) -> String {
        let size = self.world.size() as i32;
        let mut out = String::with_capacity((size as usize + 1) * size as usize);
        for y in 0..size {
            for x in 0..size {
                let cell = Cell::new(x, y);
                let c = if cell == state.location {
                    if state.carrying {
                        'C'
                    } else {
                        'A'
                    }
                } else if state.target == Some(cell) {
                    'T'
                } else if self.world.is_rack(cell) {
                    '#'
                } else if self.world.is_dropoff(cell) {
                    'D'
                } else {
                    '.'
                };
                out.push(c);
            }
            out.push('\n');
        }
        out
    }
}

impl Render<AgentState> for TextRenderer {
    fn render(&mut self, state: &AgentState) -> Option<String> {
        match self.mode {
            RenderMode::Off => None,
            RenderMode::Onscreen => {
                println!("{}", self.frame(state));
                None
            }
            RenderMode::OffscreenBuffer => Some(self.frame(state)),
        }
    }
}

impl Drop for TextRenderer {
    fn drop(&mut self) {
        debug!("Released {:?} text renderer", self.mode);
    }
}
