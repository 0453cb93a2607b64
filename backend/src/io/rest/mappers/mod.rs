pub mod enrollment_mapper;
