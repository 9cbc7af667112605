pub mod auth;
pub mod cart_service;
pub mod cart_store;
pub mod i18n;
pub mod pix;
pub mod referral_service;
pub mod size_service;
