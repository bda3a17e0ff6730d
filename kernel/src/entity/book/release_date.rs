use serde::{Deserialize, Serialize};
use time::Date;
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookReleaseDate(Date);

impl BookReleaseDate {
    pub fn new(date: impl Into<Date>) -> Self {
        Self(date.into())
    }
}
