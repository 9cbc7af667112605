pub mod auth;
pub mod referrals;
pub mod sizes;
pub mod storefront;
