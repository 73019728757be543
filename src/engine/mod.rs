//! Tracked-file identity, add/remove, and deploy.
pub mod deploy;
pub mod identity;
pub mod track;

pub use deploy::{DeployEngine, DeployReport, Deployed};
pub use identity::TrackedKey;
pub use track::{Added, Removed, TrackEngine};
