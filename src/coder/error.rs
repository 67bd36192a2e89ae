/// Error taxonomy for the ABI codec.
///
/// `UnsupportedType` is a programmer error (a value with no wire
/// projection) and is never retried. `Mismatch` means the wire bytes
/// disagree with the expected shape; callers processing batches skip the
/// offending record and continue. `SchemaMissing` means a decode was
/// attempted without type descriptors, which the wire format cannot
/// support.
#[derive(Debug, thiserror::Error)]
pub enum CoderError {
    #[error("unsupported type for ABI coder: {0}")]
    UnsupportedType(String),

    #[error("ABI mismatch: {0}")]
    Mismatch(String),

    #[error("cannot decode without type descriptors")]
    SchemaMissing,
}
