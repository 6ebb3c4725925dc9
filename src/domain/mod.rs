pub mod mapper;
pub mod model;
pub mod ports;
