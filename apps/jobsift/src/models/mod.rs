pub mod lenient;
pub mod posting;
pub mod profile;
