use serde::{Deserialize, Serialize};

/// Where rendered frames go
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Nothing is drawn
    #[default]
    Off,
    /// Frames are written to the terminal as they are drawn
    Onscreen,
    /// Frames are returned to the caller
    OffscreenBuffer,
}

/// A drawing collaborator for the states of an environment
///
/// Renderers only read states; they never influence transitions. An environment owns its
/// renderer and drops it together with itself, which is where implementors release whatever
/// output resources they hold.
pub trait Render<S> {
    /// Draw `state`, returning the frame when the mode buffers it
    fn render(&mut self, state: &S) -> Option<String>;
}
