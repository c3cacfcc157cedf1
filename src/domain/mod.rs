pub mod chapter;
pub mod item;
pub mod page;

pub use chapter::Chapter;
pub use item::{chapter_id, FeedItem};
pub use page::RawPage;
