//! Queue source implementations

mod redis;

pub use self::redis::{RedisSource, REDIS_SOURCE_TYPE};
