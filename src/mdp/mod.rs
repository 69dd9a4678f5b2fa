mod facade;
mod model;
mod product;
mod state_space;
mod transition;

pub use facade::MdpEnv;
pub use model::MdpModel;
pub use product::{product, ProductState};
pub use state_space::StateSpace;
pub use transition::{Transition, TransitionModel};
