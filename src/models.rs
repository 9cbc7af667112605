pub mod auth;
pub mod cart;
pub mod referral;
pub mod size;
pub mod storefront;
