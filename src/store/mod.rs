pub mod delivery_points;
pub mod lookups;
pub mod orders;
pub mod products;
pub mod users;
