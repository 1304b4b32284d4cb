pub mod memory;
pub mod null;
pub mod redis;

pub use memory::MemoryObjectCache;
pub use null::NullObjectCache;
pub use redis::RedisObjectCache;
