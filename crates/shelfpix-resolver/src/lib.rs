pub mod client;
pub mod error;
pub mod extract;
pub mod target;

pub use client::{PageClient, PageDocument};
pub use error::ResolverError;
pub use extract::extract_image_url;
pub use target::FetchTarget;
