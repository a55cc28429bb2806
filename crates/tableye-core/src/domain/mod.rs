//! 도메인 모델.

mod role;
mod user;

pub use role::Role;
pub use user::{
    normalize_email, CasinoSummary, DealerProfile, DealerSummary, NewUser, User, LOCAL_PROVIDER,
};
