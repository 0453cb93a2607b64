pub mod enrollment;
pub mod staff;
