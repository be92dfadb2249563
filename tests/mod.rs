pub mod state;
pub mod transform;
pub mod validators;
