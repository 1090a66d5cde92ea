pub mod composer;
pub mod interpreter;
pub mod messaging;
