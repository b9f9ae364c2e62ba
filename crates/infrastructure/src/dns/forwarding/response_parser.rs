use ferrous_lookup_domain::DomainError;
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::{RData, Record};
use std::net::IpAddr;
use tracing::debug;

/// A fully decoded response. Never constructed from a partial buffer.
#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub addresses: Vec<IpAddr>,

    pub rcode: ResponseCode,

    pub truncated: bool,

    pub message: Message,
}

impl DnsResponse {
    pub fn id(&self) -> u16 {
        self.message.id()
    }

    pub fn answers(&self) -> &[Record] {
        self.message.answers()
    }

    pub fn is_nodata(&self) -> bool {
        self.rcode == ResponseCode::NoError && self.message.answers().is_empty()
    }

    pub fn is_nxdomain(&self) -> bool {
        self.rcode == ResponseCode::NXDomain
    }
}

pub struct ResponseParser;

impl ResponseParser {
    pub fn parse(response_bytes: &[u8]) -> Result<DnsResponse, DomainError> {
        if response_bytes.is_empty() {
            return Err(DomainError::Decode("Response body is empty".to_string()));
        }

        let message = Message::from_vec(response_bytes)
            .map_err(|e| DomainError::Decode(format!("Failed to parse DNS response: {}", e)))?;

        let rcode = message.response_code();
        let truncated = message.truncated();

        let mut addresses = Vec::new();

        for record in message.answers() {
            match record.data() {
                RData::A(a) => {
                    addresses.push(IpAddr::V4(a.0));
                }
                RData::AAAA(aaaa) => {
                    addresses.push(IpAddr::V6(aaaa.0));
                }
                _ => {}
            }
        }

        debug!(
            rcode = ?rcode,
            answers = message.answers().len(),
            addresses = addresses.len(),
            truncated = truncated,
            "DNS response parsed"
        );

        Ok(DnsResponse {
            addresses,
            rcode,
            truncated,
            message,
        })
    }

    pub fn rcode_to_status(rcode: ResponseCode) -> &'static str {
        match rcode {
            ResponseCode::NoError => "NOERROR",
            ResponseCode::NXDomain => "NXDOMAIN",
            ResponseCode::ServFail => "SERVFAIL",
            ResponseCode::Refused => "REFUSED",
            ResponseCode::NotImp => "NOTIMP",
            ResponseCode::FormErr => "FORMERR",
            _ => "UNKNOWN",
        }
    }
}
