//! Orientation classification from stream geometry.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// 16:9 truncated to hundredths (1.77).
const WIDE_RATIO_HUNDREDTHS: u64 = 16 * 100 / 9;
/// 9:16 truncated to hundredths (0.56).
const TALL_RATIO_HUNDREDTHS: u64 = 9 * 100 / 16;

/// Coarse orientation of a video, used as the object key prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectCategory {
    Wide,
    Tall,
    Other,
}

impl AspectCategory {
    /// Classify by the width/height ratio truncated to two decimals.
    ///
    /// Truncation is done in integer arithmetic, so 1920x1080 (1.777...) and
    /// 177x100 (1.77) are both wide while 178x100 is not. A zero dimension is
    /// `Other`.
    pub fn classify(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return AspectCategory::Other;
        }
        match u64::from(width) * 100 / u64::from(height) {
            WIDE_RATIO_HUNDREDTHS => AspectCategory::Wide,
            TALL_RATIO_HUNDREDTHS => AspectCategory::Tall,
            _ => AspectCategory::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectCategory::Wide => "wide",
            AspectCategory::Tall => "tall",
            AspectCategory::Other => "other",
        }
    }
}

impl Display for AspectCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
