pub mod engine_harness;
