pub mod data;
pub mod desc;
pub mod dfa;
pub mod gen;
pub mod render;
pub mod util;
