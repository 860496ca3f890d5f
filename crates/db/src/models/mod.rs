pub mod agreement;
pub mod contract;
pub mod fixed_asset;
pub mod pick;
pub mod player;
pub mod roster;
pub mod schedule;
pub mod swap;
pub mod transaction;

pub use agreement::{AssetLockDb, TradeAgreementDb};
pub use contract::ContractDb;
pub use fixed_asset::FixedAssetDb;
pub use pick::DraftPickDb;
pub use player::PlayerDb;
pub use roster::RosterDb;
pub use schedule::ScheduledGameDb;
pub use swap::SwapRightDb;
pub use transaction::TransactionDb;
