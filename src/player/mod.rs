pub mod model;
pub mod registry;

pub use model::Player;
pub use registry::PlayerRegistry;
