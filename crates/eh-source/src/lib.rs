/// Image file I/O and folder scanning for evenhist.

pub mod folder;
pub mod image;
