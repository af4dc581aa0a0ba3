pub mod crop_mapper;
pub mod dimensions;
