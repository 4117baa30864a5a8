//! HTTP-level integration tests driving the full router.

mod helpers;

mod convert_test;
mod storage_test;
mod topic_test;
mod track_test;
