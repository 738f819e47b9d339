pub mod composite;
pub mod generate;
