//! Workflows that touch rooms and residents together. Each public function runs in
//! a single database transaction.

pub mod residents;
pub mod rooms;

use residencia_config::Config;
use residencia_occupancy::Policy;

#[must_use]
pub const fn policy(config: &Config) -> Policy {
    Policy {
        enforce_capacity: config.occupancy.enforce_room_capacity,
    }
}
