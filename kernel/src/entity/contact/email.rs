use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct ContactEmail(String);

impl ContactEmail {
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }
}
