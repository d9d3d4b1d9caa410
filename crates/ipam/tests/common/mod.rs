pub mod fixtures;
pub mod mocks;

#[allow(unused_imports)]
pub use fixtures::{block, scenario_properties};
#[allow(unused_imports)]
pub use mocks::{FailingIpam, ScriptedIpam};
