pub mod alert;
pub mod history;
pub mod premium;
pub mod whale;

pub use alert::{AlertKind, AlertOutcome, KimpAlert, PremiumSpike};
pub use history::{KimpCoinHistory, KimpHistory};
pub use premium::{PremiumRecord, PremiumSnapshot};
pub use whale::{WhaleAlert, WhaleCheckReport, WhaleTransfer, WhaleWallet};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Direction: transfer direction relative to a tracked wallet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
