// ABOUTME: Container runtime abstraction and its Docker implementation.
// ABOUTME: Components depend on the capability traits, never on bollard.

mod docker;
mod error;
mod traits;

pub use docker::{DOCKER_SOCKET, DockerRuntime};
pub use error::{RuntimeError, RuntimeErrorKind};
pub use traits::*;
