pub mod documents;
pub mod health;
pub mod msds;
pub mod pages;
pub mod upload;

pub use documents::*;
pub use health::*;
pub use msds::*;
pub use pages::*;
