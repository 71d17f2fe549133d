use crate::core::error::Result;

/// Durable keyed blob storage for user-local state
pub trait StorageBackend: Send {
    fn read(&self, key: &str) -> Result<Option<String>>;

    fn write(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;

    fn name(&self) -> &str;
}

impl<S: StorageBackend + ?Sized> StorageBackend for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
