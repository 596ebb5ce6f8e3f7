use crate::error::{NodeError, Result};
use crate::utils::{current_timestamp, sha256_digest, Hash, HASH_LEN};

const TIMESTAMP_LEN: usize = 8;
const PREV_HASH_LEN: usize = HASH_LEN;
const DATA_HASH_LEN: usize = HASH_LEN;
const BIT_SHIFT_LEN: usize = 1;
const NONCE_LEN: usize = 8;

/// Encoded size of a header on the wire: 8 + 32 + 32 + 1 + 8
pub const BLOCK_HEADER_LEN: usize =
    TIMESTAMP_LEN + PREV_HASH_LEN + DATA_HASH_LEN + BIT_SHIFT_LEN + NONCE_LEN;

/// Size of the big-endian payload length prefix
pub const PAYLOAD_LEN_PREFIX: usize = 2;

/// Largest payload the 16-bit length prefix can describe
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

/// Fixed-width block metadata. This is what gets hashed for proof-of-work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    timestamp: i64,
    previous_hash: Hash,
    data_hash: Hash,
    bit_shift: u8,
    nonce: u64,
}

impl BlockHeader {
    pub fn new(
        timestamp: i64,
        previous_hash: Hash,
        data_hash: Hash,
        bit_shift: u8,
        nonce: u64,
    ) -> BlockHeader {
        BlockHeader {
            timestamp,
            previous_hash,
            data_hash,
            bit_shift,
            nonce,
        }
    }

    /// Encode as timestamp | previous hash | data hash | bit shift | nonce,
    /// multi-byte integers big-endian.
    pub fn serialize(&self) -> [u8; BLOCK_HEADER_LEN] {
        let mut buf = [0u8; BLOCK_HEADER_LEN];
        let mut pos = 0;

        buf[pos..pos + TIMESTAMP_LEN].copy_from_slice(&self.timestamp.to_be_bytes());
        pos += TIMESTAMP_LEN;

        buf[pos..pos + PREV_HASH_LEN].copy_from_slice(&self.previous_hash);
        pos += PREV_HASH_LEN;

        buf[pos..pos + DATA_HASH_LEN].copy_from_slice(&self.data_hash);
        pos += DATA_HASH_LEN;

        buf[pos] = self.bit_shift;
        pos += BIT_SHIFT_LEN;

        buf[pos..pos + NONCE_LEN].copy_from_slice(&self.nonce.to_be_bytes());

        buf
    }

    /// Inverse of [`BlockHeader::serialize`].
    pub fn deserialize(buf: &[u8; BLOCK_HEADER_LEN]) -> BlockHeader {
        let mut pos = 0;

        let mut timestamp = [0u8; TIMESTAMP_LEN];
        timestamp.copy_from_slice(&buf[pos..pos + TIMESTAMP_LEN]);
        pos += TIMESTAMP_LEN;

        let mut previous_hash = [0u8; PREV_HASH_LEN];
        previous_hash.copy_from_slice(&buf[pos..pos + PREV_HASH_LEN]);
        pos += PREV_HASH_LEN;

        let mut data_hash = [0u8; DATA_HASH_LEN];
        data_hash.copy_from_slice(&buf[pos..pos + DATA_HASH_LEN]);
        pos += DATA_HASH_LEN;

        let bit_shift = buf[pos];
        pos += BIT_SHIFT_LEN;

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&buf[pos..pos + NONCE_LEN]);

        BlockHeader {
            timestamp: i64::from_be_bytes(timestamp),
            previous_hash,
            data_hash,
            bit_shift,
            nonce: u64::from_be_bytes(nonce),
        }
    }

    /// SHA-256 of the serialized header
    pub fn hash(&self) -> Hash {
        sha256_digest(&self.serialize())
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_previous_hash(&self) -> &Hash {
        &self.previous_hash
    }

    pub fn get_data_hash(&self) -> &Hash {
        &self.data_hash
    }

    pub fn get_bit_shift(&self) -> u8 {
        self.bit_shift
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }
}

/// A header plus its opaque payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    header: BlockHeader,
    payload: Vec<u8>,
}

impl Block {
    /// Build a block stamped with the current time. The data hash is derived
    /// from `payload`.
    pub fn new(previous_hash: Hash, payload: Vec<u8>, bit_shift: u8, nonce: u64) -> Result<Block> {
        check_payload_len(payload.len())?;
        let header = BlockHeader::new(
            current_timestamp()?,
            previous_hash,
            sha256_digest(&payload),
            bit_shift,
            nonce,
        );
        Ok(Block { header, payload })
    }

    /// Pair an existing header with a payload without checking that the
    /// header's data hash matches; that is the validator's job.
    pub fn from_parts(header: BlockHeader, payload: Vec<u8>) -> Result<Block> {
        check_payload_len(payload.len())?;
        Ok(Block { header, payload })
    }

    /// Rebuild a block from a header buffer and an already extracted payload.
    /// The length prefix is consumed by the transport before this is called.
    pub fn deserialize(header: &[u8; BLOCK_HEADER_LEN], payload: Vec<u8>) -> Result<Block> {
        Block::from_parts(BlockHeader::deserialize(header), payload)
    }

    /// Header, then the 2-byte big-endian payload length, then the payload.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf =
            Vec::with_capacity(BLOCK_HEADER_LEN + PAYLOAD_LEN_PREFIX + self.payload.len());
        buf.extend_from_slice(&self.header.serialize());
        // Construction guarantees the length fits in 16 bits.
        buf.extend_from_slice(&(self.payload.len() as u16).to_be_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }

    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    pub fn get_header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn get_payload(&self) -> &[u8] {
        &self.payload
    }
}

fn check_payload_len(len: usize) -> Result<()> {
    if len > MAX_PAYLOAD_LEN {
        return Err(NodeError::PayloadTooLarge { len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> BlockHeader {
        BlockHeader::new(
            1_700_000_000,
            [0x11; 32],
            sha256_digest(b"test data"),
            5,
            0x0102_0304_0506_0708,
        )
    }

    #[test]
    fn test_header_len_is_81() {
        assert_eq!(BLOCK_HEADER_LEN, 81);
        assert_eq!(sample_header().serialize().len(), 81);
    }

    #[test]
    fn test_header_field_layout() {
        let header = sample_header();
        let buf = header.serialize();

        assert_eq!(&buf[0..8], &1_700_000_000i64.to_be_bytes());
        assert_eq!(&buf[8..40], &[0x11; 32]);
        assert_eq!(&buf[40..72], header.get_data_hash());
        assert_eq!(buf[72], 5);
        assert_eq!(&buf[73..81], &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_negative_timestamp_survives_encoding() {
        let header = BlockHeader::new(-42, [0; 32], [0; 32], 0, 0);
        let decoded = BlockHeader::deserialize(&header.serialize());
        assert_eq!(decoded.get_timestamp(), -42);
    }

    #[test]
    fn test_block_deserialize_is_inverse() {
        let block = Block::new([7; 32], b"test data".to_vec(), 5, 99).unwrap();
        let header_buf = block.get_header().serialize();

        let decoded = Block::deserialize(&header_buf, block.get_payload().to_vec()).unwrap();
        assert_eq!(decoded, block);
    }

    #[test]
    fn test_block_serialize_has_length_prefix() {
        let block = Block::new([0; 32], vec![0xAB; 300], 3, 0).unwrap();
        let buf = block.serialize();

        assert_eq!(buf.len(), BLOCK_HEADER_LEN + PAYLOAD_LEN_PREFIX + 300);
        assert_eq!(&buf[81..83], &300u16.to_be_bytes());
        assert_eq!(&buf[83..], block.get_payload());
    }

    #[test]
    fn test_new_block_hashes_payload() {
        let block = Block::new([0; 32], b"payload".to_vec(), 0, 0).unwrap();
        assert_eq!(
            block.get_header().get_data_hash(),
            &sha256_digest(b"payload")
        );
    }

    #[test]
    fn test_hash_is_deterministic() {
        let header = sample_header();
        assert_eq!(header.hash(), header.hash());
        assert_eq!(header.hash(), sha256_digest(&header.serialize()));
    }

    #[test]
    fn test_single_bit_flip_changes_hash() {
        let header = sample_header();
        let original = header.hash();
        let buf = header.serialize();

        for byte in [0usize, 8, 39, 40, 71, 72, 73, 80] {
            let mut flipped = buf;
            flipped[byte] ^= 0x01;
            let other = BlockHeader::deserialize(&flipped);
            assert_ne!(other.hash(), original, "flip at byte {byte}");
        }
    }

    #[test]
    fn test_max_payload_accepted() {
        let block = Block::new([0; 32], vec![0x5A; MAX_PAYLOAD_LEN], 0, 0).unwrap();
        let buf = block.serialize();
        assert_eq!(&buf[81..83], &[0xFF, 0xFF]);
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let result = Block::new([0; 32], vec![0; MAX_PAYLOAD_LEN + 1], 0, 0);
        assert!(matches!(
            result,
            Err(NodeError::PayloadTooLarge { len: 65536 })
        ));

        let result = Block::from_parts(sample_header(), vec![0; MAX_PAYLOAD_LEN + 1]);
        assert!(result.is_err());
    }
}
