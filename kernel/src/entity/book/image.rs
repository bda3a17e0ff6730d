use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

/// Cover picture, stored as the raw bytes the client uploaded.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookImage(Vec<u8>);

impl BookImage {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }
}
