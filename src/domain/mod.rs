// Domain layer: pet records and the ports the renderer talks through.

pub mod model;
pub mod ports;
