pub mod checkout;
pub mod word_loader;
