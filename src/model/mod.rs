mod fixture;
mod video;

pub use fixture::*;
pub use video::*;
