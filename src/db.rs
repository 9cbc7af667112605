pub mod user_repo;
pub use user_repo::UserRepository;
pub mod referral_repo;
pub use referral_repo::ReferralRepository;
pub mod storefront_repo;
pub use storefront_repo::StorefrontRepository;
pub mod size_repo;
pub use size_repo::SizeRepository;
