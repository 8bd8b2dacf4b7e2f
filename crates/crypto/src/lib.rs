pub mod encdec;
mod error;

pub use encdec::{decrypt_data, encrypt_data};
pub use error::Error;
