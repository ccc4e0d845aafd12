pub mod premium;
pub mod threshold;
pub mod transfers;

pub use premium::{compute_premiums, is_stablecoin, FeeSchedule};
pub use threshold::{detect_spikes, is_suppressed, select_abs, select_two_sided, PremiumMetric};
pub use transfers::{classify_transfers, WhaleThresholds};
