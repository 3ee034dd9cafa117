mod client;
mod lead;

pub use client::ClientRecord;
pub use lead::{LeadRecord, LeadStatus};
