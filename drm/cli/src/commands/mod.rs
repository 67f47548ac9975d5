mod batch;
mod extract;
mod inspect;
mod self_test;

pub use self::batch::BatchCommand;
pub use self::extract::ExtractCommand;
pub use self::inspect::InspectCommand;
pub use self::self_test::SelfTestCommand;
