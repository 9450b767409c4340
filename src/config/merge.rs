//! Combining records from independently loaded sources.

mod merge_policy;
