// Library surface for headless/integration tests and reuse.
// The binary only adds argument parsing and the terminal loop.
pub mod app;
pub mod app_dirs;
pub mod benchmark;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod error;
pub mod games;
pub mod generator;
pub mod report;
pub mod result;
pub mod round;
pub mod runtime;
pub mod score_log;
pub mod scoring;
pub mod session;
pub mod stats;
pub mod stimulus;
pub mod time_series;
pub mod timer;
pub mod ui;
pub mod util;
