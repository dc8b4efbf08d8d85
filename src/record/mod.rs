mod store;

pub use store::{RecordEntry, RecordStore, SubmitOutcome, chart_key};
