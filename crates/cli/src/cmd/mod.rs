mod get;
mod info;
mod put;
mod rm;
mod size;
mod split;

pub use get::cmd_get;
pub use info::cmd_info;
pub use put::cmd_put;
pub use rm::cmd_rm;
pub use size::cmd_size;
pub use split::{SplitMode, cmd_split};
