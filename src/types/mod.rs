// ABOUTME: Validated domain types for app, service, and image naming.
// ABOUTME: Parsing happens once at the boundary; components see typed values.

mod app_name;
mod image_ref;
mod service_name;

pub use app_name::{AppName, AppNameError};
pub use image_ref::{ImageRef, ParseImageRefError};
pub use service_name::{ServiceName, ServiceNameError};
