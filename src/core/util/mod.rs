pub mod encoder;
pub mod string_utils;
pub mod thread_pool;
