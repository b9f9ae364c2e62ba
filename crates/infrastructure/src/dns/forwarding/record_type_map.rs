//! Mapping from `ferrous_lookup_domain::RecordType` to `hickory_proto::rr::RecordType`

use ferrous_lookup_domain::RecordType;
use hickory_proto::rr::RecordType as HickoryRecordType;

/// Maps domain record types onto hickory's for query building
pub struct RecordTypeMapper;

impl RecordTypeMapper {
    /// Domain types carry their IANA code, so the mapping goes through it.
    pub fn to_hickory(record_type: &RecordType) -> HickoryRecordType {
        HickoryRecordType::from(record_type.to_u16())
    }
}
