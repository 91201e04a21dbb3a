pub mod pricing_service;
pub mod trip_service;
