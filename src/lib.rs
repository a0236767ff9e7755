pub mod audit;
pub mod checker;
pub mod config;
pub mod hasher;
pub mod model;
pub mod output;
pub mod platform;
pub mod registry;
pub mod scanner;

pub use audit::Auditor;
pub use config::Config;
pub use model::{Digest, PackageRecord, ScanRecord, ScanReport, TamperVerdict, Vulnerability};
pub use scanner::Scanner;
