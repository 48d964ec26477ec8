pub mod author;
pub mod article;
pub mod comment;
pub mod interaction;

pub use self::{
  author::*,
  article::*,
  comment::*,
  interaction::*,
};
