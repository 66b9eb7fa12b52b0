//! CLI command implementations

pub mod devices;
pub mod kernels;
pub mod run;

pub use devices::DevicesCommand;
pub use kernels::KernelsCommand;
pub use run::RunCommand;
