use std::fmt;

/// The five named jobs, used only to label a [`crate::Report`] — the cursor,
/// filter, and operation for each are resolved by the job surface, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Daily,
    Monthly,
    Track,
    Refresh,
    Recovery,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
            Self::Track => "track",
            Self::Refresh => "refresh",
            Self::Recovery => "recovery",
        };
        write!(f, "{s}")
    }
}
