pub mod package_ctx;
pub mod package_flow;

pub use package_ctx::PackageCtx;
pub use package_flow::{PackageFlow, PackageOutcome, CONFIRM_PROMPT};
