mod client;
mod error;

pub use client::VeeqoClient;
pub use error::VeeqoError;
