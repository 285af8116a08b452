//! Point awards through the action log, shared by the disposal workflow and
//! the energy and donation activities.

pub mod activity;
pub mod award;

pub use activity::{ActivityLogger, AwardReceipt, DonationSiteType, MeterReading};
pub use award::{award_points, AwardOutcome};
