pub mod agreements;
pub mod apply;
pub mod service;
pub mod validate;

pub use agreements::{
    create_committed_deal, gc_expired_agreements, mark_executed, verify_committed_deal,
};
pub use apply::apply_deal;
pub use service::execute_committed_deal;
pub use validate::validate_deal;
