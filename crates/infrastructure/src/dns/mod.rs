pub mod dispatcher;
pub mod forwarding;
pub mod transport;

pub use dispatcher::Dispatcher;
pub use forwarding::{DnsResponse, MessageBuilder, RecordTypeMapper, ResponseParser};
pub use transport::{create_transport, DnsTransport, Transport, TransportResponse};
