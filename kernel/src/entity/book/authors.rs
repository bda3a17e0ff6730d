use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::entity::ContactId;

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookAuthors(Vec<ContactId>);

impl BookAuthors {
    /// Duplicate contacts collapse into one entry, keeping first-seen order.
    pub fn new(authors: impl IntoIterator<Item = ContactId>) -> Self {
        let mut unique: Vec<ContactId> = Vec::new();
        for author in authors {
            if !unique.contains(&author) {
                unique.push(author);
            }
        }
        Self(unique)
    }

    pub fn contains(&self, contact: &ContactId) -> bool {
        self.0.contains(contact)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContactId> {
        self.0.iter()
    }
}
