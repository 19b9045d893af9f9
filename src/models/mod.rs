pub mod record;

pub use record::PackageRecord;
