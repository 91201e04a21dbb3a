pub mod memory;
pub mod mongo;
pub mod resources;
pub mod trips;
