pub mod import;
pub mod mapping;

pub use import::ImportService;
pub use mapping::map_patient_record;
