//! Minimal Source RCON client.
//!
//! Packet layout (all integers little-endian i32):
//! `size | id | type | body bytes | 0 | 0`, where `size` counts everything
//! after itself.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::{CommandTransport, TransportError};

const SERVERDATA_AUTH: i32 = 3;
const SERVERDATA_AUTH_RESPONSE: i32 = 2;
const SERVERDATA_EXECCOMMAND: i32 = 2;
const SERVERDATA_RESPONSE_VALUE: i32 = 0;

/// id + type + two terminating nulls
const HEADER_LEN: i32 = 10;
/// Upper bound on a single reply; larger sizes mean a desynced stream.
const MAX_PACKET_LEN: i32 = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: i32,
    pub kind: i32,
    pub body: String,
}

pub fn encode_packet(id: i32, kind: i32, body: &str) -> Vec<u8> {
    let size = HEADER_LEN + body.len() as i32;
    let mut buf = Vec::with_capacity(size as usize + 4);
    buf.extend_from_slice(&size.to_le_bytes());
    buf.extend_from_slice(&id.to_le_bytes());
    buf.extend_from_slice(&kind.to_le_bytes());
    buf.extend_from_slice(body.as_bytes());
    buf.extend_from_slice(&[0, 0]);
    buf
}

fn read_i32(reader: &mut impl Read) -> std::io::Result<i32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(i32::from_le_bytes(bytes))
}

pub fn read_packet(reader: &mut impl Read) -> Result<Packet, TransportError> {
    let size = read_i32(reader)?;
    if !(HEADER_LEN..=MAX_PACKET_LEN).contains(&size) {
        return Err(TransportError::Protocol(format!(
            "invalid packet size {}",
            size
        )));
    }
    let id = read_i32(reader)?;
    let kind = read_i32(reader)?;
    let mut rest = vec![0u8; (size - 8) as usize];
    reader.read_exact(&mut rest)?;
    // Drop the two trailing nulls.
    rest.truncate(rest.len() - 2);
    let body = String::from_utf8_lossy(&rest).into_owned();
    Ok(Packet { id, kind, body })
}

pub struct RconClient {
    stream: TcpStream,
    next_id: i32,
}

impl RconClient {
    /// Connect and authenticate.
    pub fn connect(
        addr: impl ToSocketAddrs,
        password: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| TransportError::Protocol("address resolved to nothing".to_string()))?;
        let stream = TcpStream::connect_timeout(&addr, timeout)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;

        let mut client = Self { stream, next_id: 1 };
        client.authenticate(password)?;
        tracing::debug!(%addr, "RCON session authenticated");
        Ok(client)
    }

    fn allocate_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id = self.next_id.checked_add(1).unwrap_or(1);
        id
    }

    fn authenticate(&mut self, password: &str) -> Result<(), TransportError> {
        let id = self.allocate_id();
        self.stream
            .write_all(&encode_packet(id, SERVERDATA_AUTH, password))?;
        loop {
            let packet = read_packet(&mut self.stream)?;
            // Some servers send an empty RESPONSE_VALUE before the verdict.
            if packet.kind != SERVERDATA_AUTH_RESPONSE {
                continue;
            }
            if packet.id == -1 {
                return Err(TransportError::AuthRejected);
            }
            if packet.id != id {
                return Err(TransportError::Protocol(format!(
                    "auth reply for id {} while waiting for {}",
                    packet.id, id
                )));
            }
            return Ok(());
        }
    }
}

impl CommandTransport for RconClient {
    fn send(&mut self, command: &str) -> Result<String, TransportError> {
        let id = self.allocate_id();
        self.stream
            .write_all(&encode_packet(id, SERVERDATA_EXECCOMMAND, command))?;
        loop {
            let packet = read_packet(&mut self.stream)?;
            if packet.id == id && packet.kind == SERVERDATA_RESPONSE_VALUE {
                tracing::debug!(id, bytes = packet.body.len(), "RCON reply");
                return Ok(packet.body);
            }
            tracing::debug!(id = packet.id, kind = packet.kind, "skipping stray RCON packet");
        }
    }
}
