mod kv;
pub use kv::KeyValue;

mod env;
pub use env::Env;

mod labels;
pub use labels::Labels;

mod uid;
pub use uid::ClaimUid;

mod constants;
pub use constants::*;

/// Node name as reported by the scheduler.
pub type NodeName = String;
