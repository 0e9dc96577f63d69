pub mod entities;
pub mod field;
pub mod local_view;
pub mod simulation;
pub mod spatial;
pub mod systems;
pub mod topology;
