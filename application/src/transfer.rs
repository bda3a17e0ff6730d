mod book;
mod category;
mod contact;
mod loan;
mod member;

pub use self::{book::*, category::*, contact::*, loan::*, member::*};
