pub mod catalog;
pub mod extras;
pub mod profile;
pub mod progression;
pub mod questionnaire;
pub mod resource;
pub mod results;
