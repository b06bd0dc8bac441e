//! Directory query trait definition.

use async_trait::async_trait;
use dircache_core::{IndexKind, RecordType, Result};

use crate::cache::RecordCaches;

/// The authoritative identity source behind the cache.
///
/// A query resolves one key against the backend and, for every record it
/// finds, calls `add_record` or `replace_record` on the cache of that
/// record's type before returning. The caching service reads the result back
/// from the caches; the query itself returns nothing.
///
/// Queries run without any cache lock held and may block on I/O. Timeouts
/// are the implementation's business.
///
/// # Example
///
/// ```ignore
/// use dircache_directory::{DirectoryQuery, RecordCaches};
///
/// struct LdapDirectory { /* ... */ }
///
/// #[async_trait]
/// impl DirectoryQuery for LdapDirectory {
///     async fn query_directory(
///         &self,
///         caches: &RecordCaches,
///         record_types: &[RecordType],
///         index: IndexKind,
///         key: &str,
///     ) -> Result<()> {
///         for record in self.search(record_types, index, key).await? {
///             caches.add_record(Arc::new(record))?;
///         }
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "ldap"
///     }
/// }
/// ```
#[async_trait]
pub trait DirectoryQuery: Send + Sync {
    /// Looks up `key` in the given index across `record_types` and populates
    /// `caches` with whatever matches.
    ///
    /// # Errors
    ///
    /// Any error is returned unchanged to the caller of the lookup that
    /// triggered the query.
    async fn query_directory(
        &self,
        caches: &RecordCaches,
        record_types: &[RecordType],
        index: IndexKind,
        key: &str,
    ) -> Result<()>;

    /// Returns the name of this backend.
    ///
    /// This is used for logging and identification purposes.
    fn name(&self) -> &str;
}
