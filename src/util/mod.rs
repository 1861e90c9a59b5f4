pub mod cancel;
pub mod seq;
