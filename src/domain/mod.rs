pub mod settings;
pub mod track;
