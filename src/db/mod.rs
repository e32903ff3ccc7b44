pub mod connection;
pub mod error_context;
pub mod transport;

pub use connection::{connect_with_retry, mask_url_password};
pub use transport::{PgTransport, TransactionHandle, Transport};
