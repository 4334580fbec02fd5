pub mod procfs;

mod cursor;

pub use cursor::{nul_terminated, ByteCursor, CursorError};
