pub mod mugshot_cache;
pub mod records;
pub mod storage_traits;
pub mod token_store;
