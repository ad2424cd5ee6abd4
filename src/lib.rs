pub mod config;
pub mod content_type;
pub mod dispatcher;
pub mod exception;
pub mod fileinfo;
pub mod header;
pub mod param;
pub mod request;
pub mod response;
pub mod util;

pub use config::{Config, ContentTypeMode};
pub use content_type::{ContentTypePolicy, ExtensionContentType, PlaceholderContentType};
pub use dispatcher::{Dispatcher, Outcome};
pub use exception::Exception;
pub use fileinfo::{resolve, resolve_with, FileInfo, PathPolicy};
pub use header::{HeaderField, HeaderFields};
pub use param::{HttpRequestMethod, HttpStatus};
pub use request::Request;
pub use response::Response;
pub use util::HtmlBuilder;
