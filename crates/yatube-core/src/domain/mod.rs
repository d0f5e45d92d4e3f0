//! Domain entities - the core business objects.

mod group;
mod page;
mod post;
mod user;

pub use group::Group;
pub use page::{Page, POSTS_PER_PAGE};
pub use post::Post;
pub use user::User;
