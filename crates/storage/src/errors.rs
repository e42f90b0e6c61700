pub(crate) use primeadview_domain::storage::StorageError;
