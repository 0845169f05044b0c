//! Equilibrium Test Runner
//!
//! Solves small hand-built worlds end to end through the period loop.
//!
//! ```bash
//! cargo test --test equilibrium_tests
//! ```

mod equilibrium;
