pub mod insurance;
pub mod ledger;
pub mod order;
pub mod package;
pub mod partner;
pub mod queue;

pub use insurance::*;
pub use ledger::*;
pub use order::*;
pub use package::*;
pub use partner::*;
pub use queue::*;
