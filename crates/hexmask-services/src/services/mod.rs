pub mod lifecycle;
pub mod media_link;
pub mod upload;
