//! Ports implemented by the infrastructure crates

mod delivery;
mod repositories;

pub use delivery::LiveDelivery;
pub use repositories::{
    MessageRepository, NotificationFactory, NotificationQuery, NotificationRepository,
    RatingSummary, RepoResult, ReservationRepository, ReviewRepository, RideCancellation,
    RideRepository, RideSearch, RideUpdate, UserRepository, VehicleRepository,
};
