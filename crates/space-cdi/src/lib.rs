//! Filesystem stores of the node agent: CDI spec files and claim artifact directories.
mod error;
pub use error::CdiError;

mod fsutil;

mod spec_dir;
pub use spec_dir::SpecDir;

mod artifacts;
pub use artifacts::ClaimArtifactDir;
