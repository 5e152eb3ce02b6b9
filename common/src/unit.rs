//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity availability.
#[derive(Clone, Copy, Debug)]
pub struct Availability;

/// Marker type describing a deadline of an entity.
#[derive(Clone, Copy, Debug)]
pub struct Deadline;

/// Marker type describing an entity expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
