pub mod populated;
pub mod requests;
pub mod resource;
pub mod trip;
