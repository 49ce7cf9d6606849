pub mod category;
pub mod todo;
pub mod user;

pub use category::{Category, CategoryInput, CategoryView, DEFAULT_CATEGORY};
pub use todo::{PageResult, Todo, TodoInput, TodoPageQuery, TodoUpdate};
pub use user::{User, UserStatus};
