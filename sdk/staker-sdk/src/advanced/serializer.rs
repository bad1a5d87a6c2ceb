use crate::error::{Result, StakerSdkError};
use crate::types::{AccountName, Asset};

/// Little-endian binary writer for the ledger's wire format.
#[derive(Debug, Default)]
pub struct Serializer {
    buffer: Vec<u8>,
}

impl Serializer {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buffer.push(v);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buffer.push(v as u8);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buffer.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buffer.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buffer.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i64(&mut self, v: i64) {
        self.buffer.extend_from_slice(&v.to_le_bytes());
    }

    /// LEB128 encoding, 7 bits per byte
    pub fn write_varuint32(&mut self, mut v: u32) {
        loop {
            let byte = (v & 0x7f) as u8;
            v >>= 7;
            if v == 0 {
                self.buffer.push(byte);
                return;
            }
            self.buffer.push(byte | 0x80);
        }
    }

    /// Collection or byte-string length prefix
    pub fn write_len(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len)
            .map_err(|_| StakerSdkError::Encoding(format!("length {} exceeds u32", len)))?;
        self.write_varuint32(len);
        Ok(())
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.write_len(data.len())?;
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    pub fn write_name(&mut self, name: &AccountName) {
        self.write_u64(name.value());
    }

    pub fn write_asset(&mut self, asset: &Asset) {
        self.write_i64(asset.amount);
        self.write_u64(asset.symbol.value());
    }

    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }
}

/// Types with a binary wire representation
pub trait Pack {
    fn pack(&self, s: &mut Serializer) -> Result<()>;

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut s = Serializer::new();
        self.pack(&mut s)?;
        Ok(s.finish())
    }
}

impl<T: Pack> Pack for [T] {
    fn pack(&self, s: &mut Serializer) -> Result<()> {
        s.write_len(self.len())?;
        for item in self {
            item.pack(s)?;
        }
        Ok(())
    }
}
