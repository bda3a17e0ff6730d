use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

const DEFAULT_SELECT_LIMIT: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct SelectLimit(i64);

impl SelectLimit {
    /// Negative limits are clamped to zero.
    pub fn new(value: impl Into<i64>) -> Self {
        SelectLimit(value.into().max(0))
    }
}

impl Default for SelectLimit {
    fn default() -> Self {
        Self::new(DEFAULT_SELECT_LIMIT)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct SelectOffset(i64);

impl SelectOffset {
    /// Negative offsets are clamped to zero.
    pub fn new(value: impl Into<i64>) -> Self {
        SelectOffset(value.into().max(0))
    }
}

/// Applies a limit/offset window to an already ordered sequence.
pub fn select_window<T>(
    items: impl IntoIterator<Item = T>,
    limit: &SelectLimit,
    offset: &SelectOffset,
) -> Vec<T> {
    let skip = usize::try_from(offset.0).unwrap_or(usize::MAX);
    let take = usize::try_from(limit.0).unwrap_or(usize::MAX);
    items.into_iter().skip(skip).take(take).collect()
}
