pub mod ledger;
pub mod snapshot;

pub use ledger::AlertLedger;
pub use snapshot::ReportStore;
