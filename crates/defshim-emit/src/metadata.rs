// src/metadata.rs
//! Reflection metadata for emitted shims.

use serde::Serialize;

use crate::request::ShimKind;

pub const ACC_PUBLIC: u32 = 0x0001;
pub const ACC_STATIC: u32 = 0x0008;
pub const ACC_ABSTRACT: u32 = 0x0400;

/// Internal marker for methods backed by an interface default. Lies outside
/// the 16-bit access-flag range and must never reach the metadata.
pub const DEFAULT_METHOD_MARKER: u32 = 0x1_0000;

const ACCESS_FLAG_MASK: u32 = 0xFFFF;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodMetadata {
    pub selector: String,
    pub flags: u32,
}

impl MethodMetadata {
    pub fn for_shim(selector: String, kind: &ShimKind) -> Self {
        let raw = match kind {
            ShimKind::Forward { .. } => ACC_PUBLIC | DEFAULT_METHOD_MARKER,
            ShimKind::UndefinedOperation => ACC_PUBLIC | ACC_ABSTRACT,
        };
        Self { selector, flags: access_flags(raw) }
    }
}

/// Strips internal marker bits, keeping only JVM-style access flags.
pub fn access_flags(raw: u32) -> u32 {
    raw & ACCESS_FLAG_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_marker_is_masked() {
        let forward = ShimKind::Forward { function: "A_f".to_string(), args: Vec::new() };
        let meta = MethodMetadata::for_shim("f".to_string(), &forward);
        assert_eq!(meta.flags, ACC_PUBLIC);
        assert_ne!(meta.flags, 0x10001);

        let stub = MethodMetadata::for_shim("g".to_string(), &ShimKind::UndefinedOperation);
        assert_eq!(stub.flags, ACC_PUBLIC | ACC_ABSTRACT);
        assert_eq!(access_flags(ACC_STATIC | DEFAULT_METHOD_MARKER), ACC_STATIC);
    }
}
