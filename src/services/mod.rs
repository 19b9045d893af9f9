pub mod archive;
pub mod cleanup;
pub mod confirmation;
pub mod converter;
pub mod field_extractor;
pub mod live_date;

pub use confirmation::{AutoConfirm, Confirmation, TerminalConfirmation};
pub use converter::{DocumentConverter, PandocConverter};
pub use field_extractor::{FieldExtractor, HtmlFieldExtractor};
