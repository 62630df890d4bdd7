pub mod eddsa;
pub mod es256;
pub mod provider;
