mod bin_record;

pub use bin_record::BinRecord;
