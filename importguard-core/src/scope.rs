use crate::settings::{SettingKey, SettingValue, SettingsError, SettingsHost};
use crate::snapshot::ConfigurationSnapshot;
use std::sync::{Arc, Mutex};

/// Exclusive write access to a host for the duration of one fix.
///
/// Holding the scope means holding the only mutable borrow of the host, so
/// writes through it are serialized. Dropping it without `commit` leaves the
/// writes staged but unflushed.
pub struct WriteScope<'a> {
    host: &'a mut dyn SettingsHost,
    writes: usize,
}

impl<'a> WriteScope<'a> {
    pub fn begin(host: &'a mut dyn SettingsHost) -> Self {
        Self { host, writes: 0 }
    }

    /// Read access to the host inside the scope
    pub fn host(&self) -> &dyn SettingsHost {
        &*self.host
    }

    /// Write `value` under the first name of `key` the host exposes
    pub fn write(&mut self, key: SettingKey, value: SettingValue) -> Result<&'static str, SettingsError> {
        let name = key
            .resolve(&*self.host)
            .ok_or_else(|| SettingsError::Unsupported(key.name().to_string()))?;

        self.host.set_setting(name, value)?;
        self.writes += 1;
        tracing::debug!("Wrote {} via '{}'", key, name);
        Ok(name)
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn commit(self) -> Result<usize, SettingsError> {
        self.host.commit()?;
        Ok(self.writes)
    }
}

/// A host shared between threads. Each write scope holds the lock until it
/// has committed.
pub struct SharedHost<H> {
    inner: Arc<Mutex<H>>,
}

impl<H: SettingsHost> SharedHost<H> {
    pub fn new(host: H) -> Self {
        Self {
            inner: Arc::new(Mutex::new(host)),
        }
    }

    pub fn snapshot(&self) -> Result<ConfigurationSnapshot, SettingsError> {
        let guard = self.inner.lock().map_err(|_| SettingsError::Poisoned)?;
        Ok(ConfigurationSnapshot::capture(&*guard))
    }

    /// Run `f` inside a write scope and commit it before releasing the lock
    pub fn write<R>(&self, f: impl FnOnce(&mut WriteScope<'_>) -> R) -> Result<R, SettingsError> {
        let mut guard = self.inner.lock().map_err(|_| SettingsError::Poisoned)?;
        let mut scope = WriteScope::begin(&mut *guard);
        let result = f(&mut scope);
        scope.commit()?;
        Ok(result)
    }

    /// Run `f` with the host locked, for callers that manage their own scope
    pub fn with_host<R>(&self, f: impl FnOnce(&mut H) -> R) -> Result<R, SettingsError> {
        let mut guard = self.inner.lock().map_err(|_| SettingsError::Poisoned)?;
        Ok(f(&mut *guard))
    }
}

impl<H> Clone for SharedHost<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
