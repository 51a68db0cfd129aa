pub mod docs;
pub mod solve;

pub use docs::*;
pub use solve::*;
