pub mod case;
pub mod diagnosis;
pub mod note;
pub mod template;
