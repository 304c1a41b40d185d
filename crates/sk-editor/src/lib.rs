pub mod hit;
pub mod input;
pub mod interaction;
pub mod session;
