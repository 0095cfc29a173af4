pub mod run;

pub use run::{RunOptions, execute, run};
