//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises the device service
//! against mock adapters.  All tests run on the host (x86_64) with no
//! real hardware required.

mod headless_tests;
mod lifecycle_tests;
mod mock_board;
mod ui_tests;
