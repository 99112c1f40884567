use thiserror::Error;

use crate::Key;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("key {0} is already present")]
    DuplicateKey(Key),
    #[error("key {0} is not present")]
    NotFound(Key),
    #[error("out of memory allocating a node of height {height}")]
    OutOfMemory { height: usize },
}
