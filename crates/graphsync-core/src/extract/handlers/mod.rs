//! Built-in document handlers

mod css;
mod html;
mod javascript;
mod json;
mod markup;
mod project;
mod razor;
mod source;
mod xaml;
mod xml;

use regex::Regex;

pub use css::CssHandler;
pub use html::HtmlHandler;
pub use javascript::JavaScriptHandler;
pub use json::JsonHandler;
pub use markup::{MarkupError, XmlNode, parse_document};
pub use project::{ProjectFileHandler, package_references};
pub use razor::RazorHandler;
pub use source::SourceHandler;
pub use xaml::XamlHandler;
pub use xml::XmlHandler;

/// Compile a built-in pattern. A pattern that fails to compile disables
/// its handler.
fn pattern(re: &str) -> Option<Regex> {
    Regex::new(re).ok()
}
