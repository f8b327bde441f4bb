mod info;
mod launch;
mod plan;
mod render;
mod route;
mod target;

pub use info::cmd_info;
pub use launch::{cmd_check_env, cmd_launch};
pub use plan::cmd_plan;
pub use render::{cmd_render_dockerfile, cmd_render_nginx};
pub use route::cmd_route;
pub use target::cmd_target;
