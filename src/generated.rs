//! Outcome of a content generator: either the nominal record or a degraded
//! fallback record together with the reason it was produced.

/// A record produced by one of the generators.
///
/// Generators never fail. When something goes wrong they still hand back a
/// complete record, wrapped in [`Generated::Fallback`] so callers and tests
/// can tell degraded output apart from nominal output.
#[derive(Debug, Clone, PartialEq)]
pub enum Generated<T> {
    /// The record was produced as intended.
    Nominal(T),
    /// The record is a fixed fallback; `reason` explains the fault.
    Fallback { record: T, reason: String },
}

impl<T> Generated<T> {
    /// Returns the wrapped record, nominal or not.
    pub fn into_record(self) -> T {
        match self {
            Self::Nominal(record) | Self::Fallback { record, .. } => record,
        }
    }

    /// Borrows the wrapped record.
    pub fn record(&self) -> &T {
        match self {
            Self::Nominal(record) | Self::Fallback { record, .. } => record,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// The fault that caused a fallback, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Nominal(_) => None,
            Self::Fallback { reason, .. } => Some(reason),
        }
    }
}
