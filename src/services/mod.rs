// Service exports
pub mod recs_api;
pub mod sink;
pub mod transport;

pub use recs_api::{ApiOptions, CallError, RecsApi, AUTH_HEADER};
pub use sink::{CsvSink, RecordSink, SinkError, CSV_HEADERS};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportResponse};
