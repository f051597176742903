pub mod client_error;
pub mod server_error;

pub use client_error::{ClientError, ProviderError};
pub use server_error::{ConvertError, ServerError};
