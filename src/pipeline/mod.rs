pub mod batch;
pub mod builder;
pub mod defaults;
pub mod emission_file;
pub mod runtime;
pub mod traits;
pub mod workspace;
