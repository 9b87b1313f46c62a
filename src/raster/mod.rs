//! Four-channel float images and border-aware sampling over them.

pub(crate) mod border;
pub(crate) mod surface;
