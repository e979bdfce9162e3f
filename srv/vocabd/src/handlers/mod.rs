pub mod checkout;
pub mod cloud;
pub mod words;
