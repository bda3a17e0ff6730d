mod book;
mod category;
mod common;
mod contact;
mod loan;
mod member;

pub use self::{book::*, category::*, common::*, contact::*, loan::*, member::*};
