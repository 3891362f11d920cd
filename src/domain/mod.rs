pub mod director;
pub mod entity;
pub mod geom;
pub mod grid;
pub mod jump;
pub mod movement;
pub mod tile;
