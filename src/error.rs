//! # Storage Error Kinds
//!
//! Typed error values raised by the device and blob layers. All fallible
//! operations return `eyre::Result`; the kinds below are attached via
//! `bail!`/`ensure!` so callers can recover specific conditions with
//! `Report::downcast_ref::<StoreError>()` while still getting full context
//! chains for diagnostics.
//!
//! Plain I/O failures are not a kind of their own: they surface as the
//! underlying `std::io::Error` wrapped with the file path and operation.

/// A recoverable storage error condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// A truncate or allocation would exceed the configured file size limit.
    LimitsReached,
    /// The blob header at the requested id does not identify itself with
    /// that id; the id is stale or the region was reused.
    BlobNotFound,
    /// A partial read offset lies past the end of the blob, or a caller
    /// buffer is too small for the requested payload.
    InvalidParameter,
    /// A checksum mismatch or freelist overlap was detected.
    IntegrityViolated,
    /// Establishing the mmap window failed after the device was opened.
    /// At open time a map failure only disables the zero-copy path.
    MapFailed,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            StoreError::LimitsReached => "configured file size limit reached",
            StoreError::BlobNotFound => "blob not found",
            StoreError::InvalidParameter => "invalid parameter",
            StoreError::IntegrityViolated => "integrity violated",
            StoreError::MapFailed => "memory mapping failed",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for StoreError {}

/// Returns the `StoreError` kind attached to a report, if any.
pub fn store_error(report: &eyre::Report) -> Option<StoreError> {
    report.downcast_ref::<StoreError>().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::bail;

    fn failing() -> eyre::Result<()> {
        bail!(StoreError::LimitsReached);
    }

    #[test]
    fn store_error_kind_is_recoverable_from_report() {
        let err = failing().unwrap_err();

        assert_eq!(store_error(&err), Some(StoreError::LimitsReached));
    }

    #[test]
    fn store_error_display_messages_are_stable() {
        assert_eq!(StoreError::BlobNotFound.to_string(), "blob not found");
        assert_eq!(
            StoreError::IntegrityViolated.to_string(),
            "integrity violated"
        );
    }

    #[test]
    fn wrapped_store_error_still_downcasts() {
        use eyre::WrapErr;

        let err = failing()
            .wrap_err("while truncating the device")
            .unwrap_err();

        assert_eq!(store_error(&err), Some(StoreError::LimitsReached));
    }
}
