//! Read-resolve-validate-write-commit cycles against single usages.

use tracing::{debug, warn};

use crate::backend::HidBackend;
use crate::error::{Error, Result};
use crate::resolver::Resolver;
use crate::usage::{UsageKey, page_name};

/// What to do after a pure read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadPolicy {
    /// Return the value, touch nothing else.
    #[default]
    ReadOnly,
    /// Re-submit the owning report after reading (best effort).
    CommitAfterRead,
}

/// Performs usage transactions against a device handle.
///
/// Stateless apart from the handle: every call re-resolves its usage, so two
/// threads may transact on different usages concurrently. Callers serialize
/// writes to the same logical state through the call-state lock.
pub struct Transactor<D> {
    device: D,
    read_policy: ReadPolicy,
}

impl<D: HidBackend> Transactor<D> {
    #[must_use]
    pub fn new(device: D) -> Self {
        Self { device, read_policy: ReadPolicy::default() }
    }

    #[must_use]
    pub fn with_read_policy(mut self, read_policy: ReadPolicy) -> Self {
        self.read_policy = read_policy;
        self
    }

    /// The underlying device handle.
    #[must_use]
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Write `value` to the usage `key` and commit its report.
    ///
    /// # Errors
    /// - [`Error::Resolution`] if the usage or its field cannot be looked up
    /// - [`Error::Range`] if `value` is outside the field's logical range;
    ///   nothing is sent to the device in that case
    /// - [`Error::Device`] if staging or committing is rejected
    pub fn write_usage(&self, key: UsageKey, value: i32) -> Result<()> {
        let resolved = Resolver::new(&self.device).resolve(key)?;
        let range = resolved.field.logical_range;

        if !range.contains(value) {
            let page = page_name(key.usage.code());
            warn!(page, %key, value, %range, "Value outside of allowed range");
            return Err(Error::Range { page, key, value, range });
        }

        let location = resolved.usage.location;
        self.device.set_usage(key.report_type, &location, key.usage.code(), value)?;
        self.device.commit_report(key.report_type, location.report_id)?;

        debug!(%key, value, report_id = location.report_id, "Usage written");
        Ok(())
    }

    /// Read the current value of the usage `key` from the device.
    ///
    /// No range check applies: a read reports what the device holds.
    ///
    /// # Errors
    /// - [`Error::Resolution`] if the usage or its field cannot be looked up
    /// - [`Error::Device`] if the value query is rejected
    pub fn read_usage(&self, key: UsageKey) -> Result<i32> {
        let resolved = Resolver::new(&self.device).resolve(key)?;
        let location = resolved.usage.location;
        let value = self.device.usage_value(key.report_type, &location)?;

        if self.read_policy == ReadPolicy::CommitAfterRead
            && let Err(e) = self.device.commit_report(key.report_type, location.report_id)
        {
            warn!(%key, error = %e, "Commit after read failed");
        }

        debug!(%key, value, "Usage read");
        Ok(value)
    }
}
