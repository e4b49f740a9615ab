mod connected_drive;
mod traits;

pub use connected_drive::{ConnectedDriveClient, DEFAULT_BASE_URL};
pub use traits::{VehicleApi, VehicleStatus};
