mod codec;
mod io;
mod types;


pub use codec::Frame;
pub(crate) use io::{PrimaryLink, SecondaryLink};
pub use types::*;
