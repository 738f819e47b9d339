pub mod handles;
pub mod layers;
pub mod tools;
