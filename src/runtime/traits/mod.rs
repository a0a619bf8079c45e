// ABOUTME: Composable capability traits for the container runtime.
// ABOUTME: Defines ImageOps, ContainerOps, ExecOps, and LogOps.

mod container;
mod exec;
mod image;
mod logs;
mod shared_types;

pub use container::{ContainerError, ContainerOps};
pub use exec::{ExecError, ExecOps};
pub use image::{ImageError, ImageOps};
pub use logs::{LogError, LogOps};
pub use shared_types::*;

/// Full capability set needed to drive an application stack.
pub trait Runtime: ImageOps + ContainerOps + ExecOps + LogOps {}

impl<T: ImageOps + ContainerOps + ExecOps + LogOps> Runtime for T {}
