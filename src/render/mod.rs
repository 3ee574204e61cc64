//! Drawing surfaces and the frame loop that drives them.

pub(crate) mod cpu;
pub(crate) mod frame_loop;
pub(crate) mod surface;
