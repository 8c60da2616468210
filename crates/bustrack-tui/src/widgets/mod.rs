//! Small rendering helpers shared by the screens.

pub mod form;
pub mod load;
