pub mod bitmap;
pub mod cli;
pub mod compositor;
pub mod device;
pub mod error;
pub mod fps;
pub mod game;
pub mod line;
pub mod surface;
