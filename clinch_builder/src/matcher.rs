mod at_file;
mod cluster;
mod core;
mod model;
mod suggest;

pub(crate) use self::core::Interpreter;
pub(crate) use model::MatchState;
