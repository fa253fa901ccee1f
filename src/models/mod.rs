pub mod entry;
pub mod policy;
pub mod verdict;
pub mod violation;

pub use entry::*;
pub use policy::*;
pub use verdict::*;
pub use violation::*;
