mod generate;
mod graph;
mod ports;
mod positions;

pub use generate::{GeneratorParams, generate};
pub use graph::{NetworkGraph, NetworkNode, Stage};
pub use ports::{PortSample, pie_slices};
pub use positions::PositionStore;
