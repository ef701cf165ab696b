//! Read-only database operations for the `store_locations` table and its
//! roadshow extension.

mod read;
mod types;

pub use read::{
    list_active_locations, list_active_physical_locations, list_online_locations,
    list_roadshow_localities, list_roadshow_locations, list_roadshow_windows,
};
pub use types::{LocalityRow, RoadshowWindowRow, StoreLocationRow};
