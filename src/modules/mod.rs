pub mod crawler;
pub mod dalfox;
pub mod enumerator;
pub mod nuclei;
pub mod passive;
