//! DNS Message Builder
//!
//! Encodes a [`DnsQuery`] into wire format using `hickory-proto`.

use super::record_type_map::RecordTypeMapper;
use ferrous_lookup_domain::{DnsQuery, DomainError};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

/// Largest message that fits behind a 2-byte length prefix.
pub const MAX_MESSAGE_SIZE: usize = u16::MAX as usize;

/// Builds DNS query messages in wire format
pub struct MessageBuilder;

impl MessageBuilder {
    /// Build a query message and return both its ID and wire bytes
    ///
    /// Creates a standard query with:
    /// - Random ID for request/response matching
    /// - RD (Recursion Desired) flag taken from the query
    /// - Single question section, class IN
    pub fn build(query: &DnsQuery) -> Result<(u16, Vec<u8>), DomainError> {
        if query.domain.is_empty() {
            return Err(DomainError::Encode("Domain name is empty".to_string()));
        }

        let name = Name::from_str(&query.domain).map_err(|e| {
            DomainError::Encode(format!("Invalid domain '{}': {}", query.domain, e))
        })?;

        let mut question = Query::new();
        question.set_name(name);
        question.set_query_type(RecordTypeMapper::to_hickory(&query.record_type));
        question.set_query_class(DNSClass::IN);

        let id = fastrand::u16(..);

        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(query.recursion_desired);
        message.add_query(question);

        let bytes = Self::serialize_message(&message)?;
        if bytes.len() > MAX_MESSAGE_SIZE {
            return Err(DomainError::Encode(format!(
                "Encoded query is {} bytes (max {})",
                bytes.len(),
                MAX_MESSAGE_SIZE
            )));
        }

        Ok((id, bytes))
    }

    /// Serialize a Message to wire format bytes
    fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message
            .emit(&mut encoder)
            .map_err(|e| DomainError::Encode(format!("Failed to serialize DNS message: {}", e)))?;

        Ok(buf)
    }
}
