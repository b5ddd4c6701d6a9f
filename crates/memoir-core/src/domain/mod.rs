//! Domain entities - the core business objects.

mod category;
mod post;
mod view;

pub use category::{Category, ParseCategoryError};
pub use post::{NewPost, Post, PostPatch};
pub use view::{DEFAULT_READ_TIME, PostView};
