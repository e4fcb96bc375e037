pub mod node;
pub mod stage;
pub mod time;
