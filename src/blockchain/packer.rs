//! Transaction wire formats.
//!
//! # Layout
//! ```text
//! expiration          u32  seconds since epoch
//! ref_block_num       u16  low 16 bits of the reference block number
//! ref_block_prefix    u32  little-endian bytes 8..12 of the reference block id
//! max_net_usage_words varuint32
//! max_cpu_usage_ms    u8
//! delay_sec           varuint32
//! context_free_actions vec<action>
//! actions             vec<action>
//! transaction_extensions vec<(u16, bytes)>
//! ```
//! All integers are little-endian.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::blockchain::expiration::to_epoch_seconds;
use crate::blockchain::name::encode_name;
use crate::blockchain::transaction::{SignedTransaction, UnsignedTransaction};
use crate::blockchain::types::{ChainError, ChainResult, EncodedAction, PermissionLevel};

const CHAIN_ID_LEN: usize = 32;
const REF_BLOCK_MIN_LEN: usize = 12;

/// `ref_block_num` and `ref_block_prefix` derived from a block id.
pub fn reference_block(block_id: &str) -> ChainResult<(u16, u32)> {
    let bytes =
        hex::decode(block_id).map_err(|_| ChainError::InvalidReferenceBlock(block_id.to_string()))?;
    if bytes.len() < REF_BLOCK_MIN_LEN {
        return Err(ChainError::InvalidReferenceBlock(block_id.to_string()));
    }

    let block_num = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let prefix = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    Ok(((block_num & 0xffff) as u16, prefix))
}

#[derive(Default)]
struct ByteWriter(Vec<u8>);

impl ByteWriter {
    fn put_u8(&mut self, v: u8) {
        self.0.push(v);
    }

    fn put_u16(&mut self, v: u16) {
        self.0.extend_from_slice(&v.to_le_bytes());
    }

    fn put_u32(&mut self, v: u32) {
        self.0.extend_from_slice(&v.to_le_bytes());
    }

    fn put_u64(&mut self, v: u64) {
        self.0.extend_from_slice(&v.to_le_bytes());
    }

    fn put_varuint32(&mut self, mut v: u32) {
        loop {
            let mut byte = (v & 0x7f) as u8;
            v >>= 7;
            if v != 0 {
                byte |= 0x80;
            }
            self.0.push(byte);
            if v == 0 {
                break;
            }
        }
    }

    fn put_len(&mut self, len: usize) -> ChainResult<()> {
        let len = u32::try_from(len)
            .map_err(|_| ChainError::InvalidActionData(format!("length {} too large", len)))?;
        self.put_varuint32(len);
        Ok(())
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> ChainResult<()> {
        self.put_len(bytes.len())?;
        self.0.extend_from_slice(bytes);
        Ok(())
    }

    fn put_name(&mut self, name: &str) -> ChainResult<()> {
        self.put_u64(encode_name(name)?);
        Ok(())
    }

    fn put_permission(&mut self, level: &PermissionLevel) -> ChainResult<()> {
        self.put_name(&level.actor)?;
        self.put_name(&level.permission)
    }

    fn put_action(&mut self, action: &EncodedAction) -> ChainResult<()> {
        self.put_name(&action.contract_account)?;
        self.put_name(&action.action_name)?;
        self.put_len(action.authorization.len())?;
        for level in &action.authorization {
            self.put_permission(level)?;
        }
        let data = hex::decode(&action.binary_data)
            .map_err(|e| ChainError::InvalidActionData(e.to_string()))?;
        self.put_bytes(&data)
    }

    fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

/// Binary serialization of the transaction body (no signatures).
///
/// An expiration that cannot be read is encoded as the epoch, which every
/// node rejects as expired.
pub fn serialize_transaction(tx: &UnsignedTransaction) -> ChainResult<Vec<u8>> {
    let expiration = to_epoch_seconds(&tx.expiration).unwrap_or_else(|| {
        tracing::warn!(expiration = %tx.expiration, "Unreadable expiration, encoding as epoch");
        0
    });
    let (ref_block_num, ref_block_prefix) = reference_block(&tx.reference_block_id)?;

    let mut w = ByteWriter::default();
    w.put_u32(expiration);
    w.put_u16(ref_block_num);
    w.put_u32(ref_block_prefix);
    w.put_varuint32(0); // max_net_usage_words
    w.put_u8(0); // max_cpu_usage_ms
    w.put_varuint32(0); // delay_sec
    w.put_len(0)?; // context_free_actions
    w.put_len(tx.actions.len())?;
    for action in &tx.actions {
        w.put_action(action)?;
    }
    w.put_len(0)?; // transaction_extensions
    Ok(w.into_inner())
}

/// `sha256(chain_id ‖ packed_trx ‖ sha256-of-nothing placeholder)`.
///
/// With no context-free data the trailing part is 32 zero bytes.
pub fn signing_digest(chain_id: &str, packed_trx: &[u8]) -> ChainResult<[u8; 32]> {
    let chain_id_bytes =
        hex::decode(chain_id).map_err(|_| ChainError::InvalidChainId(chain_id.to_string()))?;
    if chain_id_bytes.len() != CHAIN_ID_LEN {
        return Err(ChainError::InvalidChainId(chain_id.to_string()));
    }

    let mut hasher = Sha256::new();
    hasher.update(&chain_id_bytes);
    hasher.update(packed_trx);
    hasher.update([0u8; 32]);
    Ok(hasher.finalize().into())
}

/// JSON shape of a transaction as nodes expect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTransaction {
    pub expiration: String,
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
    pub max_net_usage_words: u32,
    pub max_cpu_usage_ms: u8,
    pub delay_sec: u32,
    pub context_free_actions: Vec<EncodedAction>,
    pub actions: Vec<EncodedAction>,
    pub transaction_extensions: Vec<serde_json::Value>,
    pub signatures: Vec<String>,
    pub context_free_data: Vec<String>,
}

impl WireTransaction {
    /// Wire view of an unsigned transaction; the signature list is empty.
    pub fn from_unsigned(tx: &UnsignedTransaction) -> ChainResult<Self> {
        let (ref_block_num, ref_block_prefix) = reference_block(&tx.reference_block_id)?;
        Ok(Self {
            expiration: tx.expiration.clone(),
            ref_block_num,
            ref_block_prefix,
            max_net_usage_words: 0,
            max_cpu_usage_ms: 0,
            delay_sec: 0,
            context_free_actions: Vec::new(),
            actions: tx.actions.clone(),
            transaction_extensions: Vec::new(),
            signatures: Vec::new(),
            context_free_data: Vec::new(),
        })
    }
}

/// Broadcast-ready form of a signed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedTransaction {
    pub signatures: Vec<String>,
    pub compression: String,
    pub packed_context_free_data: String,
    pub packed_trx: String,
}

/// Pack a signed transaction for `push_transaction`.
pub fn pack(signed: &SignedTransaction) -> ChainResult<PackedTransaction> {
    let packed_trx = serialize_transaction(signed.transaction())?;
    Ok(PackedTransaction {
        signatures: signed.signatures().iter().map(ToString::to_string).collect(),
        compression: "none".to_string(),
        packed_context_free_data: String::new(),
        packed_trx: hex::encode(packed_trx),
    })
}
