//! Server-list and tablet-map snapshots.
//!
//! Both are immutable value objects decoded from the payload that follows a
//! response header. Once decoded they have no tie to the session that
//! produced them.

use bytes::BufMut;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::codec::MsgPackCodec;
use crate::error::{Error, Result};
use crate::protocol::ServerType;

/// One live server as recorded by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerListEntry {
    pub server_type: ServerType,
    pub server_id: u64,
    pub service_locator: String,
    /// Disk read bandwidth advertised by backups, if known.
    #[serde(default)]
    pub backup_read_mbytes_per_sec: Option<u32>,
}

/// Point-in-time list of enlisted servers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerList {
    #[serde(default)]
    pub server: Vec<ServerListEntry>,
}

impl ServerList {
    /// Servers of the given type, in list order.
    pub fn of_type(&self, server_type: ServerType) -> impl Iterator<Item = &ServerListEntry> {
        self.server
            .iter()
            .filter(move |entry| entry.server_type == server_type)
    }

    /// Find a server by id.
    pub fn find(&self, server_id: u64) -> Option<&ServerListEntry> {
        self.server.iter().find(|entry| entry.server_id == server_id)
    }
}

/// Whether a tablet is being served or rebuilt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabletState {
    #[default]
    Normal,
    Recovering,
}

/// A contiguous range of a table's object ids and the master serving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tablet {
    pub table_id: u32,
    pub start_object_id: u64,
    /// Inclusive upper bound.
    pub end_object_id: u64,
    #[serde(default)]
    pub state: TabletState,
    pub server_id: u64,
    pub service_locator: String,
}

impl Tablet {
    /// Whether this tablet covers `object_id` of `table_id`.
    pub fn covers(&self, table_id: u32, object_id: u64) -> bool {
        self.table_id == table_id
            && self.start_object_id <= object_id
            && object_id <= self.end_object_id
    }
}

/// Point-in-time tablet-to-master map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tablets {
    #[serde(default)]
    pub tablet: Vec<Tablet>,
}

impl Tablets {
    /// The tablet holding `object_id` in `table_id`, if any.
    pub fn locate(&self, table_id: u32, object_id: u64) -> Option<&Tablet> {
        self.tablet
            .iter()
            .find(|tablet| tablet.covers(table_id, object_id))
    }

    /// All tablets of one table.
    pub fn for_table(&self, table_id: u32) -> impl Iterator<Item = &Tablet> {
        self.tablet
            .iter()
            .filter(move |tablet| tablet.table_id == table_id)
    }
}

/// Decode `resp[offset..offset + length]` as a `T`.
///
/// # Errors
///
/// [`Error::Decode`] if the range runs past the end of `resp`, or if the
/// codec rejects the bytes.
pub fn parse_from_response<T: DeserializeOwned>(
    resp: &[u8],
    offset: usize,
    length: u32,
) -> Result<T> {
    let end = offset
        .checked_add(length as usize)
        .filter(|&end| end <= resp.len())
        .ok_or_else(|| {
            Error::Decode(format!(
                "payload of {} bytes at offset {} exceeds response of {} bytes",
                length,
                offset,
                resp.len()
            ))
        })?;
    MsgPackCodec::decode(&resp[offset..end])
}

/// Encode `value` at the end of `buf`, returning the encoded length.
///
/// This is the producing side of [`parse_from_response`], used by
/// coordinators and test doubles to fill in payload length fields.
pub fn serialize_to_response<T: Serialize>(value: &T, buf: &mut impl BufMut) -> Result<u32> {
    let encoded = MsgPackCodec::encode(value)?;
    let length = u32::try_from(encoded.len())
        .map_err(|_| Error::Encode(format!("payload of {} bytes too large", encoded.len())))?;
    buf.put_slice(&encoded);
    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tablets() -> Tablets {
        Tablets {
            tablet: vec![
                Tablet {
                    table_id: 1,
                    start_object_id: 0,
                    end_object_id: 99,
                    state: TabletState::Normal,
                    server_id: 10,
                    service_locator: "tcp: host=m1, port=1".to_string(),
                },
                Tablet {
                    table_id: 1,
                    start_object_id: 100,
                    end_object_id: u64::MAX,
                    state: TabletState::Recovering,
                    server_id: 11,
                    service_locator: "tcp: host=m2, port=1".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_locate_by_range() {
        let map = tablets();
        assert_eq!(map.locate(1, 0).unwrap().server_id, 10);
        assert_eq!(map.locate(1, 99).unwrap().server_id, 10);
        assert_eq!(map.locate(1, 100).unwrap().server_id, 11);
        assert!(map.locate(2, 0).is_none());
        assert_eq!(map.for_table(1).count(), 2);
    }

    #[test]
    fn test_parse_at_offset() {
        let mut buf = vec![0xEE; 8];
        let length = serialize_to_response(&tablets(), &mut buf).unwrap();
        let parsed: Tablets = parse_from_response(&buf, 8, length).unwrap();
        assert_eq!(parsed, tablets());
    }

    #[test]
    fn test_parse_rejects_length_past_end() {
        let mut buf = Vec::new();
        let length = serialize_to_response(&ServerList::default(), &mut buf).unwrap();
        let result: Result<ServerList> = parse_from_response(&buf, 0, length + 1);
        assert!(matches!(result, Err(Error::Decode(m)) if m.contains("exceeds")));

        let result: Result<ServerList> = parse_from_response(&buf, usize::MAX, 1);
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let buf = [0xC1u8; 4]; // 0xC1 is never used in MsgPack
        let result: Result<Tablets> = parse_from_response(&buf, 0, 4);
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_server_list_queries() {
        let list = ServerList {
            server: vec![
                ServerListEntry {
                    server_type: ServerType::Master,
                    server_id: 1,
                    service_locator: "tcp: host=m, port=1".to_string(),
                    backup_read_mbytes_per_sec: None,
                },
                ServerListEntry {
                    server_type: ServerType::Backup,
                    server_id: 2,
                    service_locator: "tcp: host=b, port=1".to_string(),
                    backup_read_mbytes_per_sec: Some(100),
                },
            ],
        };
        assert_eq!(list.of_type(ServerType::Backup).count(), 1);
        assert_eq!(list.find(2).unwrap().backup_read_mbytes_per_sec, Some(100));
        assert!(list.find(3).is_none());
    }

    #[test]
    fn test_empty_payload_is_empty_snapshot() {
        let mut buf = Vec::new();
        let length = serialize_to_response(&ServerList::default(), &mut buf).unwrap();
        let parsed: ServerList = parse_from_response(&buf, 0, length).unwrap();
        assert!(parsed.server.is_empty());
    }
}
