pub mod artifact;
pub mod presentation;
pub mod schedule;
pub mod time;
pub mod window;

pub use artifact::*;
pub use presentation::*;
pub use schedule::*;
pub use time::*;
pub use window::*;
