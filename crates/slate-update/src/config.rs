use serde::{Deserialize, Serialize};

/// What happens when a 64-bit integer increment leaves the `i64` range.
///
/// 32-bit overflow always promotes to 64-bit; there is no wider integer to
/// promote a 64-bit result to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Fail at prepare time with `NumericOverflow`; the document is untouched.
    #[default]
    Reject,
    /// Two's-complement wraparound.
    Wrap,
}

impl std::str::FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reject" => Ok(OverflowPolicy::Reject),
            "wrap" => Ok(OverflowPolicy::Wrap),
            other => Err(format!("unknown overflow policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    pub int64_overflow: OverflowPolicy,
}

impl UpdateConfig {
    /// Read `SLATE_INT64_OVERFLOW` (`reject` | `wrap`). Unset or unknown
    /// values fall back to the default.
    pub fn from_env() -> Self {
        let int64_overflow = std::env::var("SLATE_INT64_OVERFLOW")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        Self { int64_overflow }
    }
}
