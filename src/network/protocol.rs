use crate::core::{Block, BLOCK_HEADER_LEN, PAYLOAD_LEN_PREFIX};
use crate::error::{NodeError, Result};
use std::io::{Read, Write};

/// Tag byte announcing a block message
pub const MSG_BLOCK: u8 = 0x01;
/// Tag byte announcing a chain-sync request
pub const MSG_CHAIN_SYNC: u8 = 0x02;

/// A decoded inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Block(Block),
    ChainSyncRequest,
}

/// Write a block message: the tag byte, then the serialized block, as one buffer.
pub fn send_block<W: Write + ?Sized>(writer: &mut W, block: &Block) -> Result<()> {
    let mut buf =
        Vec::with_capacity(1 + BLOCK_HEADER_LEN + PAYLOAD_LEN_PREFIX + block.get_payload().len());
    buf.push(MSG_BLOCK);
    buf.extend_from_slice(&block.serialize());

    writer
        .write_all(&buf)
        .and_then(|_| writer.flush())
        .map_err(|e| NodeError::Network(format!("Failed to send block: {e}")))
}

/// Write a chain-sync request: the tag byte alone.
pub fn send_chain_sync_request<W: Write + ?Sized>(writer: &mut W) -> Result<()> {
    writer
        .write_all(&[MSG_CHAIN_SYNC])
        .and_then(|_| writer.flush())
        .map_err(|e| NodeError::Network(format!("Failed to send chain sync request: {e}")))
}

/// Read one message. Unknown tags are consumed and reported as `Ok(None)`.
/// Any read failure, including the peer closing the stream, is an error.
pub fn read_message<R: Read + ?Sized>(reader: &mut R) -> Result<Option<Message>> {
    let mut tag = [0u8; 1];
    reader.read_exact(&mut tag)?;

    match tag[0] {
        MSG_BLOCK => read_block(reader).map(|block| Some(Message::Block(block))),
        MSG_CHAIN_SYNC => Ok(Some(Message::ChainSyncRequest)),
        _ => Ok(None),
    }
}

fn read_block<R: Read + ?Sized>(reader: &mut R) -> Result<Block> {
    let mut header = [0u8; BLOCK_HEADER_LEN];
    reader.read_exact(&mut header)?;

    let mut len = [0u8; PAYLOAD_LEN_PREFIX];
    reader.read_exact(&mut len)?;

    let mut payload = vec![0u8; usize::from(u16::from_be_bytes(len))];
    reader.read_exact(&mut payload)?;

    Block::deserialize(&header, payload)
}
